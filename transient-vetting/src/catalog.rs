//! Catalog definitions and the row model returned by catalog queries.
//!
//! Each reference catalog is described by a [`CatalogSpec`]: the columns to
//! request, the columns kept in the result, the VizieR catalog identifier,
//! and the key of the result table inside the response. The three specs live
//! in a [`CatalogRegistry`] built once at startup and shared read-only by
//! every worker.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use transient_core::{VettingError, VettingResult};

/// Angular separation column computed by the catalog service.
pub const SEPARATION_COLUMN: &str = "_r";

/// Columns the SDSS classifier reads.
pub const SDSS_REQUIRED_COLUMNS: &[&str] = &["mode", "subCl", "zsp", "e_zsp", "zph", "e_zph"];

/// Columns the Gaia classifier reads.
pub const GAIA_REQUIRED_COLUMNS: &[&str] =
    &["Gmag", "Plx", "e_Plx", "pmRA", "e_pmRA", "pmDE", "e_pmDE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Sdss,
    Gaia,
    Milliquas,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [
        CatalogKind::Sdss,
        CatalogKind::Gaia,
        CatalogKind::Milliquas,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::Sdss => "SDSS DR12",
            CatalogKind::Gaia => "Gaia DR2",
            CatalogKind::Milliquas => "Milliquas",
        }
    }

    fn required_columns(&self) -> &'static [&'static str] {
        match self {
            CatalogKind::Sdss => SDSS_REQUIRED_COLUMNS,
            CatalogKind::Gaia => GAIA_REQUIRED_COLUMNS,
            CatalogKind::Milliquas => &[],
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Query and schema description of one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSpec {
    /// Columns requested from the service. `*` keeps the default column set.
    pub input_columns: Vec<String>,
    /// Columns kept in each returned row, in order.
    pub output_columns: Vec<String>,
    /// VizieR catalog identifier, e.g. `V/147`.
    pub catalog_identifier: String,
    /// Name of the table holding the results, e.g. `V/147/sdss12`.
    pub result_table_key: String,
}

impl CatalogSpec {
    fn new(input: &[&str], output: &[&str], identifier: &str, table: &str) -> Self {
        Self {
            input_columns: input.iter().map(|c| c.to_string()).collect(),
            output_columns: output.iter().map(|c| c.to_string()).collect(),
            catalog_identifier: identifier.to_string(),
            result_table_key: format!("{}/{}", identifier, table),
        }
    }

    /// SDSS photometric catalog, release 12.
    pub fn sdss_dr12() -> Self {
        Self::new(
            &["*", "_r", "subCl", "e_zsp", "e_zph"],
            &[
                "_r", "RA_ICRS", "DE_ICRS", "mode", "q_mode", "class", "subCl", "zsp", "zph",
                "e_zsp", "e_zph",
            ],
            "V/147",
            "sdss12",
        )
    }

    /// Gaia data release 2.
    pub fn gaia_dr2() -> Self {
        Self::new(
            &["_r", "*"],
            &[
                "_r", "RA_ICRS", "DE_ICRS", "Gmag", "Plx", "e_Plx", "pmRA", "e_pmRA", "pmDE",
                "e_pmDE",
            ],
            "I/345",
            "gaia2",
        )
    }

    /// Million Quasars catalog.
    pub fn milliquas() -> Self {
        Self::new(
            &["*", "_r"],
            &["_r", "RAJ2000", "DEJ2000", "Name", "Cl", "Qpct", "z"],
            "VII/280",
            "catalog",
        )
    }

    fn validate(&self, kind: CatalogKind) -> VettingResult<()> {
        let context = format!("catalog {}", kind);
        if self.catalog_identifier.trim().is_empty() {
            return Err(VettingError::configuration(&context, "empty catalog identifier"));
        }
        if self.result_table_key.trim().is_empty() {
            return Err(VettingError::configuration(&context, "empty result table key"));
        }
        if self.input_columns.is_empty() {
            return Err(VettingError::configuration(&context, "no input columns"));
        }
        let missing: Vec<&str> = std::iter::once(SEPARATION_COLUMN)
            .chain(kind.required_columns().iter().copied())
            .filter(|col| !self.output_columns.iter().any(|c| c == col))
            .collect();
        if !missing.is_empty() {
            return Err(VettingError::configuration(
                &context,
                &format!("output columns lack {}", missing.join(", ")),
            ));
        }
        Ok(())
    }
}

/// Immutable lookup of the three catalog specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRegistry {
    pub sdss: CatalogSpec,
    pub gaia: CatalogSpec,
    pub milliquas: CatalogSpec,
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self {
            sdss: CatalogSpec::sdss_dr12(),
            gaia: CatalogSpec::gaia_dr2(),
            milliquas: CatalogSpec::milliquas(),
        }
    }
}

impl CatalogRegistry {
    pub fn spec(&self, kind: CatalogKind) -> &CatalogSpec {
        match kind {
            CatalogKind::Sdss => &self.sdss,
            CatalogKind::Gaia => &self.gaia,
            CatalogKind::Milliquas => &self.milliquas,
        }
    }

    /// Checks every catalog for the columns the classifiers depend on.
    ///
    /// # Errors
    /// Returns a `ConfigurationError` naming the first invalid catalog.
    pub fn validate(&self) -> VettingResult<()> {
        for kind in CatalogKind::ALL {
            self.spec(kind).validate(kind)?;
        }
        Ok(())
    }
}

/// A single cell of a catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogValue {
    Float(f64),
    Text(String),
    Null,
}

impl CatalogValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CatalogValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CatalogValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CatalogValue::Null)
    }
}

impl fmt::Display for CatalogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogValue::Float(v) => write!(f, "{}", v),
            CatalogValue::Text(s) => f.write_str(s),
            CatalogValue::Null => f.write_str("--"),
        }
    }
}

/// One row of a catalog result, keyed by column name.
///
/// Columns are kept sorted by name so serialized rows are deterministic.
/// Typed accessors return `None` for absent, null and wrongly-typed cells alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRow {
    values: BTreeMap<String, CatalogValue>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: CatalogValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: CatalogValue) {
        self.values.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CatalogValue> {
        self.values.get(column)
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CatalogValue::as_f64)
    }

    /// Like [`float`](Self::float), but names the column when it is absent,
    /// null or non-numeric.
    pub fn measurement(&self, column: &str) -> VettingResult<f64> {
        self.float(column)
            .ok_or_else(|| VettingError::missing_measurement(column))
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(CatalogValue::as_str)
    }

    /// Angular separation from the query center, in arcseconds.
    pub fn separation(&self) -> Option<f64> {
        self.float(SEPARATION_COLUMN)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &CatalogValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rows returned by one catalog for one candidate.
pub type ResultSet = Vec<CatalogRow>;
