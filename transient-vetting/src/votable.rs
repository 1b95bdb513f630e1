//! Minimal VOTable reader for VizieR cone-search responses.
//!
//! Only the `TABLEDATA` serialization is supported, which is what VizieR
//! returns from `viz-bin/votable` unless asked otherwise. Each `TABLE` is
//! read into a [`VoTable`] of raw cell strings; [`VoTable::to_result_set`]
//! then types the cells and projects them onto a catalog's output columns.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use transient_core::constants::{ARCSEC_PER_ARCMIN, ARCSEC_PER_DEGREE};
use transient_core::{SkyPosition, VettingError, VettingResult};

use crate::catalog::{CatalogRow, CatalogSpec, CatalogValue, ResultSet, SEPARATION_COLUMN};

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub datatype: String,
    pub unit: Option<String>,
}

impl Field {
    fn is_numeric(&self) -> bool {
        matches!(
            self.datatype.as_str(),
            "double" | "float" | "int" | "short" | "long" | "unsignedByte"
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoTable {
    pub name: String,
    pub fields: Vec<Field>,
    /// Raw cell text per row; `None` for empty cells.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Parses every table of a VOTable document.
///
/// # Errors
/// `CatalogUnavailable` for malformed XML, a non-`TABLEDATA` serialization,
/// or a `QUERY_STATUS` of `ERROR`.
pub fn parse_votable(catalog: &str, xml: &str) -> VettingResult<Vec<VoTable>> {
    let mut reader = Reader::from_str(xml);
    let mut tables = Vec::new();

    let mut current: Option<VoTable> = None;
    let mut row: Option<Vec<Option<String>>> = None;
    let mut cell: Option<String> = None;
    let mut in_query_status_error = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"TABLE" => {
                    current = Some(VoTable {
                        name: attribute(catalog, &e, b"name")?.unwrap_or_default(),
                        ..VoTable::default()
                    })
                }
                b"FIELD" => push_field(catalog, &mut current, &e)?,
                b"TR" if current.is_some() => row = Some(Vec::new()),
                b"TD" if row.is_some() => cell = Some(String::new()),
                b"BINARY" | b"BINARY2" | b"FITS" => {
                    return Err(VettingError::catalog_unavailable(
                        catalog,
                        "unsupported VOTable serialization",
                    ))
                }
                b"INFO" => in_query_status_error = is_query_error(catalog, &e)?,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"FIELD" => push_field(catalog, &mut current, &e)?,
                b"TD" => {
                    if let Some(r) = row.as_mut() {
                        r.push(None);
                    }
                }
                b"INFO" => {
                    if is_query_error(catalog, &e)? {
                        return Err(VettingError::catalog_unavailable(
                            catalog,
                            "service reported QUERY_STATUS=ERROR",
                        ));
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| VettingError::catalog_unavailable(catalog, &err.to_string()))?;
                if let Some(buf) = cell.as_mut() {
                    buf.push_str(&text);
                } else if in_query_status_error {
                    return Err(VettingError::catalog_unavailable(
                        catalog,
                        &format!("service error: {}", text.trim()),
                    ));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(buf) = cell.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"TD" => {
                    if let (Some(buf), Some(r)) = (cell.take(), row.as_mut()) {
                        let trimmed = buf.trim();
                        r.push((!trimmed.is_empty()).then(|| trimmed.to_string()));
                    }
                }
                b"TR" => {
                    if let (Some(r), Some(table)) = (row.take(), current.as_mut()) {
                        table.rows.push(r);
                    }
                }
                b"TABLE" => {
                    if let Some(table) = current.take() {
                        tables.push(table);
                    }
                }
                b"INFO" => in_query_status_error = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VettingError::catalog_unavailable(
                    catalog,
                    &format!("XML parse error: {}", e),
                ))
            }
            _ => {}
        }
    }

    Ok(tables)
}

fn attribute(catalog: &str, e: &BytesStart<'_>, key: &[u8]) -> VettingResult<Option<String>> {
    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| VettingError::catalog_unavailable(catalog, &err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| VettingError::catalog_unavailable(catalog, &err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn push_field(
    catalog: &str,
    current: &mut Option<VoTable>,
    e: &BytesStart<'_>,
) -> VettingResult<()> {
    let Some(table) = current.as_mut() else {
        return Ok(());
    };
    let name = attribute(catalog, e, b"name")?.ok_or_else(|| {
        VettingError::catalog_unavailable(catalog, "FIELD without a name attribute")
    })?;
    table.fields.push(Field {
        name,
        datatype: attribute(catalog, e, b"datatype")?.unwrap_or_else(|| "char".to_string()),
        unit: attribute(catalog, e, b"unit")?,
    });
    Ok(())
}

fn is_query_error(catalog: &str, e: &BytesStart<'_>) -> VettingResult<bool> {
    Ok(attribute(catalog, e, b"name")?.as_deref() == Some("QUERY_STATUS")
        && attribute(catalog, e, b"value")?.as_deref() == Some("ERROR"))
}

impl VoTable {
    /// Types each cell and keeps only the catalog's output columns.
    ///
    /// `_r` is normalised to arcseconds from the field's unit. If the service
    /// did not return `_r`, it is recomputed from the first RA/Dec column pair
    /// relative to `center`.
    ///
    /// # Errors
    /// `CatalogUnavailable` when an output column is absent from the table.
    pub fn to_result_set(
        &self,
        spec: &CatalogSpec,
        center: &SkyPosition,
    ) -> VettingResult<ResultSet> {
        let has_separation = self.fields.iter().any(|f| f.name == SEPARATION_COLUMN);
        let missing: Vec<&str> = spec
            .output_columns
            .iter()
            .map(String::as_str)
            .filter(|col| {
                !(self.fields.iter().any(|f| f.name == *col)
                    || (*col == SEPARATION_COLUMN && self.position_columns().is_some()))
            })
            .collect();
        if !missing.is_empty() {
            return Err(VettingError::catalog_unavailable(
                &spec.catalog_identifier,
                &format!("table {} lacks columns {}", self.name, missing.join(", ")),
            ));
        }

        let mut rows = ResultSet::with_capacity(self.rows.len());
        for raw in &self.rows {
            let mut row = CatalogRow::new();
            for (field, cell) in self.fields.iter().zip(raw) {
                if !spec.output_columns.iter().any(|c| *c == field.name) {
                    continue;
                }
                let mut value = typed_value(field, cell.as_deref());
                if field.name == SEPARATION_COLUMN {
                    value = normalise_separation(value, field.unit.as_deref());
                }
                row.insert(&field.name, value);
            }
            for col in &spec.output_columns {
                if row.get(col).is_none() && *col != SEPARATION_COLUMN {
                    row.insert(col, CatalogValue::Null);
                }
            }
            if !has_separation {
                row.insert(SEPARATION_COLUMN, self.recompute_separation(raw, center));
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn position_columns(&self) -> Option<(usize, usize)> {
        let ra = self.fields.iter().position(|f| f.name.starts_with("RA") && f.is_numeric())?;
        let dec = self.fields.iter().position(|f| f.name.starts_with("DE") && f.is_numeric())?;
        Some((ra, dec))
    }

    fn recompute_separation(&self, raw: &[Option<String>], center: &SkyPosition) -> CatalogValue {
        let Some((ra_idx, dec_idx)) = self.position_columns() else {
            return CatalogValue::Null;
        };
        let ra = typed_value(&self.fields[ra_idx], raw.get(ra_idx).and_then(|c| c.as_deref()));
        let dec = typed_value(&self.fields[dec_idx], raw.get(dec_idx).and_then(|c| c.as_deref()));
        match (ra.as_f64(), dec.as_f64()) {
            (Some(ra), Some(dec)) => match SkyPosition::new(ra, dec) {
                Ok(pos) => CatalogValue::Float(center.separation_arcsec(&pos)),
                Err(_) => CatalogValue::Null,
            },
            _ => CatalogValue::Null,
        }
    }
}

fn typed_value(field: &Field, cell: Option<&str>) -> CatalogValue {
    let Some(text) = cell else {
        return CatalogValue::Null;
    };
    if !field.is_numeric() {
        return CatalogValue::Text(text.to_string());
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_nan() => CatalogValue::Null,
        Ok(v) => CatalogValue::Float(v),
        Err(_) => CatalogValue::Null,
    }
}

fn normalise_separation(value: CatalogValue, unit: Option<&str>) -> CatalogValue {
    let factor = match unit {
        Some("deg") => ARCSEC_PER_DEGREE,
        Some("arcmin") => ARCSEC_PER_ARCMIN,
        _ => 1.0,
    };
    match value {
        CatalogValue::Float(v) => CatalogValue::Float(v * factor),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Two SDSS rows, `_r` in arcmin, the nearer one secondary.
    pub const SDSS_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="1.3" xmlns="http://www.ivoa.net/xml/VOTable/v1.3">
<RESOURCE ID="yCat_5147" name="V/147">
  <INFO name="QUERY_STATUS" value="OK"/>
  <TABLE ID="V_147_sdss12" name="V/147/sdss12">
    <FIELD name="_r" ucd="pos.angDistance" datatype="double" width="6" precision="4" unit="arcmin">
      <DESCRIPTION>Distance from center</DESCRIPTION>
    </FIELD>
    <FIELD name="RA_ICRS" datatype="double" unit="deg"/>
    <FIELD name="DE_ICRS" datatype="double" unit="deg"/>
    <FIELD name="mode" datatype="unsignedByte"/>
    <FIELD name="q_mode" datatype="char" arraysize="1"/>
    <FIELD name="class" datatype="unsignedByte"/>
    <FIELD name="objID" datatype="long"/>
    <FIELD name="subCl" datatype="char" arraysize="*"/>
    <FIELD name="zsp" datatype="double"/>
    <FIELD name="zph" datatype="double"/>
    <FIELD name="e_zsp" datatype="float"/>
    <FIELD name="e_zph" datatype="double"/>
    <DATA><TABLEDATA>
      <TR><TD>0.0100</TD><TD>187.277915</TD><TD>2.052388</TD><TD>2</TD><TD>+</TD><TD>3</TD><TD>1237650762388783118</TD><TD>STARBURST</TD><TD>0.1582</TD><TD>0.160</TD><TD>0.00002</TD><TD>0.0210</TD></TR>
      <TR><TD>0.0200</TD><TD>187.277900</TD><TD>2.052400</TD><TD>1</TD><TD>+</TD><TD>3</TD><TD>1237650762388783119</TD><TD>STARFORMING</TD><TD>0.0753</TD><TD>0.081</TD><TD>0.00001</TD><TD/></TR>
    </TABLEDATA></DATA>
  </TABLE>
</RESOURCE>
</VOTABLE>"#;

    pub const EMPTY_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="1.3">
<RESOURCE>
  <INFO name="QUERY_STATUS" value="OK"/>
  <INFO name="Warning" value="No table found"/>
</RESOURCE>
</VOTABLE>"#;

    pub const ERROR_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<VOTABLE version="1.3">
<RESOURCE>
  <INFO name="QUERY_STATUS" value="ERROR">Unknown catalogue: V/999</INFO>
</RESOURCE>
</VOTABLE>"#;
}
