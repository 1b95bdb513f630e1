//! SDSS classifier: QSO flag and redshift estimates from the nearest
//! primary SDSS detection.

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::catalog::CatalogRow;
use crate::config::SdssCriteria;

/// A redshift with its 1σ uncertainty. Both are NaN when unmeasured.
#[derive(Debug, Clone, Copy)]
pub struct RedshiftEstimate {
    pub value: f64,
    pub uncertainty: f64,
}

impl RedshiftEstimate {
    pub const UNAVAILABLE: RedshiftEstimate = RedshiftEstimate {
        value: f64::NAN,
        uncertainty: f64::NAN,
    };

    /// Reads `value_col`/`error_col` from `row`. A missing or non-positive
    /// redshift means "no measurement", not zero.
    pub fn from_row(row: &CatalogRow, value_col: &str, error_col: &str) -> Self {
        match row.measurement(value_col) {
            Ok(value) if value > 0.0 => Self {
                value,
                uncertainty: row.measurement(error_col).unwrap_or(f64::NAN),
            },
            Ok(_) => Self::UNAVAILABLE,
            Err(err) => {
                debug!(%err, "redshift unavailable");
                Self::UNAVAILABLE
            }
        }
    }

    pub fn is_available(&self) -> bool {
        !self.value.is_nan()
    }
}

impl PartialEq for RedshiftEstimate {
    /// NaN compares equal to NaN so unavailable estimates are equal.
    fn eq(&self, other: &Self) -> bool {
        fn same(a: f64, b: f64) -> bool {
            (a.is_nan() && b.is_nan()) || a == b
        }
        same(self.value, other.value) && same(self.uncertainty, other.uncertainty)
    }
}

impl Serialize for RedshiftEstimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let finite = |v: f64| if v.is_nan() { None } else { Some(v) };
        (finite(self.value), finite(self.uncertainty)).serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SdssVerdict {
    pub qso: bool,
    /// Sub-class of the selected row, when there was one.
    pub subclass: Option<String>,
    pub spec_z: RedshiftEstimate,
    pub photo_z: RedshiftEstimate,
}

impl SdssVerdict {
    fn unmatched() -> Self {
        Self {
            qso: false,
            subclass: None,
            spec_z: RedshiftEstimate::UNAVAILABLE,
            photo_z: RedshiftEstimate::UNAVAILABLE,
        }
    }
}

/// Classifies the selected SDSS row.
///
/// Redshifts of QSO-flagged objects are never reported: they describe the
/// AGN, not a transient host.
pub fn classify_sdss(selected: Option<&CatalogRow>, criteria: &SdssCriteria) -> SdssVerdict {
    let Some(row) = selected else {
        return SdssVerdict::unmatched();
    };

    let subclass = row.text("subCl").map(str::to_string);
    let qso = subclass.as_deref().is_some_and(|s| {
        criteria
            .qso_markers
            .iter()
            .any(|marker| s.contains(marker.as_str()))
    });

    if qso {
        return SdssVerdict {
            qso,
            subclass,
            spec_z: RedshiftEstimate::UNAVAILABLE,
            photo_z: RedshiftEstimate::UNAVAILABLE,
        };
    }

    SdssVerdict {
        qso,
        subclass,
        spec_z: RedshiftEstimate::from_row(row, "zsp", "e_zsp"),
        photo_z: RedshiftEstimate::from_row(row, "zph", "e_zph"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogValue;

    fn row(subclass: &str, zsp: f64, zph: f64) -> CatalogRow {
        CatalogRow::new()
            .with("_r", CatalogValue::Float(0.3))
            .with("mode", CatalogValue::Float(1.0))
            .with("subCl", CatalogValue::Text(subclass.into()))
            .with("zsp", CatalogValue::Float(zsp))
            .with("e_zsp", CatalogValue::Float(0.0001))
            .with("zph", CatalogValue::Float(zph))
            .with("e_zph", CatalogValue::Float(0.02))
    }

    #[test]
    fn test_no_row() {
        let verdict = classify_sdss(None, &SdssCriteria::default());
        assert!(!verdict.qso);
        assert!(!verdict.spec_z.is_available());
        assert!(!verdict.photo_z.is_available());
        assert!(verdict.spec_z.uncertainty.is_nan());
        assert!(verdict.photo_z.uncertainty.is_nan());
    }

    #[test]
    fn test_agn_flags_qso_and_suppresses_redshift() {
        let verdict = classify_sdss(Some(&row("AGN", 0.3, 0.28)), &SdssCriteria::default());
        assert!(verdict.qso);
        assert_eq!(verdict.spec_z, RedshiftEstimate::UNAVAILABLE);
        assert_eq!(verdict.photo_z, RedshiftEstimate::UNAVAILABLE);
    }

    #[test]
    fn test_broadline_substring_flags_qso() {
        let verdict = classify_sdss(
            Some(&row("STARBURST BROADLINE", 0.3, 0.28)),
            &SdssCriteria::default(),
        );
        assert!(verdict.qso);
        assert_eq!(verdict.subclass.as_deref(), Some("STARBURST BROADLINE"));
    }

    #[test]
    fn test_marker_match_is_case_sensitive() {
        let verdict = classify_sdss(Some(&row("agn", 0.3, 0.28)), &SdssCriteria::default());
        assert!(!verdict.qso);
    }

    #[test]
    fn test_galaxy_reports_redshifts() {
        let verdict = classify_sdss(
            Some(&row("STARFORMING", 0.0753, 0.081)),
            &SdssCriteria::default(),
        );
        assert!(!verdict.qso);
        assert_eq!(verdict.spec_z.value, 0.0753);
        assert_eq!(verdict.spec_z.uncertainty, 0.0001);
        assert_eq!(verdict.photo_z.value, 0.081);
        assert_eq!(verdict.photo_z.uncertainty, 0.02);
    }

    #[test]
    fn test_non_positive_redshift_is_unavailable() {
        let verdict = classify_sdss(Some(&row("", 0.0, -0.5)), &SdssCriteria::default());
        assert!(!verdict.qso);
        assert!(!verdict.spec_z.is_available());
        assert!(verdict.spec_z.uncertainty.is_nan());
        assert!(!verdict.photo_z.is_available());
    }

    #[test]
    fn test_missing_fields() {
        let bare = CatalogRow::new().with("_r", CatalogValue::Float(0.3));
        let verdict = classify_sdss(Some(&bare), &SdssCriteria::default());
        assert!(!verdict.qso);
        assert!(verdict.subclass.is_none());
        assert!(!verdict.spec_z.is_available());

        let no_error = CatalogRow::new().with("zph", CatalogValue::Float(0.2));
        let estimate = RedshiftEstimate::from_row(&no_error, "zph", "e_zph");
        assert_eq!(estimate.value, 0.2);
        assert!(estimate.uncertainty.is_nan());
    }

    #[test]
    fn test_serialize_nan_as_null() {
        let json = serde_json::to_string(&RedshiftEstimate::UNAVAILABLE).unwrap();
        assert_eq!(json, "[null,null]");
        let json = serde_json::to_string(&RedshiftEstimate {
            value: 0.1,
            uncertainty: 0.01,
        })
        .unwrap();
        assert_eq!(json, "[0.1,0.01]");
    }
}
