//! Gaia stellarity classifier.
//!
//! A transient found close to a bright star is more likely a saturation
//! artefact or a blend than a real event. Each surviving Gaia source gets an
//! exclusion radius that grows with brightness; the candidate is stellar if it
//! sits inside the radius of any source in the calibrated magnitude band.

use serde::Serialize;

use crate::catalog::CatalogRow;
use crate::config::GaiaCriteria;

/// The Gaia source that triggered the stellar flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximateStar {
    pub separation_arcsec: f64,
    pub gmag: f64,
    pub exclusion_radius_arcsec: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaiaVerdict {
    pub stellar: bool,
    /// Nearest proximate source, when `stellar` is set.
    pub nearest: Option<ProximateStar>,
}

/// Returns the proximity details for `row`, or `None` if it is not proximate.
pub fn proximate_star(row: &CatalogRow, criteria: &GaiaCriteria) -> Option<ProximateStar> {
    let gmag = row.float("Gmag")?;
    let separation = row.separation()?;
    let radius = criteria.exclusion_radius.radius_arcsec(gmag);

    (radius > separation && criteria.in_magnitude_band(gmag)).then_some(ProximateStar {
        separation_arcsec: separation,
        gmag,
        exclusion_radius_arcsec: radius,
    })
}

/// Classifies the selected Gaia rows, which must be sorted nearest first.
pub fn classify_gaia(selected: &[CatalogRow], criteria: &GaiaCriteria) -> GaiaVerdict {
    let nearest = selected.iter().find_map(|row| proximate_star(row, criteria));
    GaiaVerdict {
        stellar: nearest.is_some(),
        nearest,
    }
}
