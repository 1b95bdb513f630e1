//! Classifier thresholds, search radii and service settings.
//!
//! [`VettingConfig`] carries every tunable the pipeline reads. Each field has
//! a default matching the calibrated values, so an empty TOML file (or no
//! file at all) reproduces the standard behavior. The configuration is built
//! and validated once at startup, then shared read-only.
//!
//! ```toml
//! [gaia]
//! search_radius_arcsec = 40.0
//! significance_mode = "both-axes"
//!
//! [vizier]
//! base_url = "https://vizier.cfa.harvard.edu"
//! timeout_secs = 60
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use transient_core::{VettingError, VettingResult};

use crate::catalog::CatalogRegistry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VettingConfig {
    pub sdss: SdssCriteria,
    pub gaia: GaiaCriteria,
    pub milliquas: MilliquasCriteria,
    pub vizier: VizierSettings,
    pub catalogs: CatalogRegistry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdssCriteria {
    pub search_radius_arcsec: f64,
    /// `mode` value of a primary detection.
    pub primary_mode: i64,
    /// Sub-class substrings marking an AGN/QSO (case-sensitive).
    pub qso_markers: Vec<String>,
}

impl Default for SdssCriteria {
    fn default() -> Self {
        Self {
            search_radius_arcsec: 2.0,
            primary_mode: 1,
            qso_markers: vec!["AGN".to_string(), "BROADLINE".to_string()],
        }
    }
}

/// Which axes the Gaia significance cut inspects.
///
/// `Literal` tests parallax and RA proper motion only (the RA test appears
/// twice in the calibrated pipeline and the Dec test never runs).
/// `BothAxes` tests parallax, RA and Dec proper motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignificanceMode {
    #[default]
    Literal,
    BothAxes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaiaCriteria {
    pub search_radius_arcsec: f64,
    pub parallax_significance: f64,
    pub pmra_significance: f64,
    pub pmdec_significance: f64,
    pub significance_mode: SignificanceMode,
    /// Brightest G magnitude for which the exclusion radius applies.
    pub min_mag: f64,
    /// Faintest G magnitude for which the exclusion radius applies.
    pub max_mag: f64,
    pub exclusion_radius: ExclusionRadiusModel,
}

impl Default for GaiaCriteria {
    fn default() -> Self {
        Self {
            search_radius_arcsec: 40.0,
            parallax_significance: 3.0,
            pmra_significance: 3.0,
            pmdec_significance: 3.0,
            significance_mode: SignificanceMode::Literal,
            min_mag: 11.0,
            max_mag: 19.0,
            exclusion_radius: ExclusionRadiusModel::default(),
        }
    }
}

impl GaiaCriteria {
    pub fn in_magnitude_band(&self, gmag: f64) -> bool {
        (self.min_mag..=self.max_mag).contains(&gmag)
    }
}

/// Brightness-dependent exclusion radius around a star:
/// `floor + scale * exp((pivot_mag - G) / mag_scale)` arcseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExclusionRadiusModel {
    pub floor_arcsec: f64,
    pub scale_arcsec: f64,
    pub pivot_mag: f64,
    pub mag_scale: f64,
}

impl Default for ExclusionRadiusModel {
    fn default() -> Self {
        Self {
            floor_arcsec: 1.8,
            scale_arcsec: 0.6,
            pivot_mag: 20.0,
            mag_scale: 2.05,
        }
    }
}

impl ExclusionRadiusModel {
    /// Exclusion radius in arcseconds for a star of G magnitude `gmag`.
    pub fn radius_arcsec(&self, gmag: f64) -> f64 {
        self.floor_arcsec + self.scale_arcsec * ((self.pivot_mag - gmag) / self.mag_scale).exp()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MilliquasCriteria {
    pub search_radius_arcsec: f64,
}

impl Default for MilliquasCriteria {
    fn default() -> Self {
        Self {
            search_radius_arcsec: 2.0,
        }
    }
}

pub const DEFAULT_VIZIER_URL: &str = "https://vizier.cds.unistra.fr";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VizierSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Maximum rows per query; `None` requests every match.
    pub row_limit: Option<usize>,
    pub user_agent: String,
}

impl Default for VizierSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VIZIER_URL.to_string(),
            timeout_secs: 30,
            row_limit: None,
            user_agent: format!("transient-vetting/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl VettingConfig {
    pub fn from_toml_str(source: &str) -> VettingResult<Self> {
        toml::from_str(source).map_err(|e| VettingError::configuration("TOML", &e.to_string()))
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> VettingResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            VettingError::configuration(&path.display().to_string(), &e.to_string())
        })?;
        let config = Self::from_toml_str(&source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the classifiers meaningless.
    ///
    /// # Errors
    /// Returns a `ConfigurationError` naming the offending field.
    pub fn validate(&self) -> VettingResult<()> {
        require_positive("sdss.search_radius_arcsec", self.sdss.search_radius_arcsec)?;
        if self.sdss.qso_markers.iter().any(|m| m.is_empty()) {
            return Err(VettingError::configuration(
                "sdss.qso_markers",
                "empty marker would match every sub-class",
            ));
        }

        let gaia = &self.gaia;
        require_positive("gaia.search_radius_arcsec", gaia.search_radius_arcsec)?;
        require_positive("gaia.parallax_significance", gaia.parallax_significance)?;
        require_positive("gaia.pmra_significance", gaia.pmra_significance)?;
        require_positive("gaia.pmdec_significance", gaia.pmdec_significance)?;
        require_finite("gaia.min_mag", gaia.min_mag)?;
        require_finite("gaia.max_mag", gaia.max_mag)?;
        if gaia.min_mag > gaia.max_mag {
            return Err(VettingError::configuration(
                "gaia magnitude band",
                &format!("min_mag {} exceeds max_mag {}", gaia.min_mag, gaia.max_mag),
            ));
        }
        let model = &gaia.exclusion_radius;
        require_finite("gaia.exclusion_radius.floor_arcsec", model.floor_arcsec)?;
        require_finite("gaia.exclusion_radius.scale_arcsec", model.scale_arcsec)?;
        require_finite("gaia.exclusion_radius.pivot_mag", model.pivot_mag)?;
        require_positive("gaia.exclusion_radius.mag_scale", model.mag_scale)?;

        require_positive(
            "milliquas.search_radius_arcsec",
            self.milliquas.search_radius_arcsec,
        )?;

        if !(self.vizier.base_url.starts_with("http://")
            || self.vizier.base_url.starts_with("https://"))
        {
            return Err(VettingError::configuration(
                "vizier.base_url",
                &format!("not an http(s) URL: {}", self.vizier.base_url),
            ));
        }
        if self.vizier.timeout_secs == 0 {
            return Err(VettingError::configuration(
                "vizier.timeout_secs",
                "timeout must be at least one second",
            ));
        }

        self.catalogs.validate()
    }
}

fn require_finite(field: &str, value: f64) -> VettingResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(VettingError::configuration(field, "value is not finite"))
    }
}

fn require_positive(field: &str, value: f64) -> VettingResult<()> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(VettingError::configuration(
            field,
            &format!("expected a positive value, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = VettingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sdss.search_radius_arcsec, 2.0);
        assert_eq!(config.gaia.search_radius_arcsec, 40.0);
        assert_eq!(config.milliquas.search_radius_arcsec, 2.0);
        assert_eq!(config.gaia.significance_mode, SignificanceMode::Literal);
    }

    #[test]
    fn test_exclusion_radius_at_g15() {
        let model = ExclusionRadiusModel::default();
        let expected = 1.8 + 0.6 * (5.0_f64 / 2.05).exp();
        assert!((model.radius_arcsec(15.0) - expected).abs() < 1e-12);
        assert!((model.radius_arcsec(15.0) - 8.66).abs() < 0.01);
    }

    #[test]
    fn test_exclusion_radius_at_pivot() {
        let model = ExclusionRadiusModel::default();
        assert!((model.radius_arcsec(20.0) - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_magnitude_band_is_inclusive() {
        let gaia = GaiaCriteria::default();
        assert!(gaia.in_magnitude_band(11.0));
        assert!(gaia.in_magnitude_band(19.0));
        assert!(!gaia.in_magnitude_band(10.99));
        assert!(!gaia.in_magnitude_band(20.0));
        assert!(!gaia.in_magnitude_band(f64::NAN));
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = VettingConfig::from_toml_str("").unwrap();
        assert_eq!(config, VettingConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = VettingConfig::from_toml_str(
            r#"
            [gaia]
            significance_mode = "both-axes"
            max_mag = 18.5

            [vizier]
            timeout_secs = 5
            row_limit = 200
            "#,
        )
        .unwrap();
        assert_eq!(config.gaia.significance_mode, SignificanceMode::BothAxes);
        assert_eq!(config.gaia.max_mag, 18.5);
        assert_eq!(config.gaia.min_mag, 11.0);
        assert_eq!(config.vizier.timeout_secs, 5);
        assert_eq!(config.vizier.row_limit, Some(200));
        assert_eq!(config.vizier.base_url, DEFAULT_VIZIER_URL);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = VettingConfig::from_toml_str("[gaia]\nsigma = 5\n").unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let mut config = VettingConfig::default();
        config.gaia.min_mag = 19.5;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("magnitude band"), "unexpected error: {}", msg);
    }

    #[test]
    fn test_non_positive_radius_is_rejected() {
        let mut config = VettingConfig::default();
        config.sdss.search_radius_arcsec = 0.0;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("sdss.search_radius_arcsec"));
    }

    #[test]
    fn test_empty_qso_marker_is_rejected() {
        let mut config = VettingConfig::default();
        config.sdss.qso_markers.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut config = VettingConfig::default();
        config.vizier.base_url = "vizier.cds.unistra.fr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[milliquas]\nsearch_radius_arcsec = 3.0").unwrap();
        file.flush().unwrap();

        let config = VettingConfig::load(file.path()).unwrap();
        assert_eq!(config.milliquas.search_radius_arcsec, 3.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = VettingConfig::load("/nonexistent/vetting.toml").unwrap_err();
        assert!(!err.is_recoverable());
    }
}
