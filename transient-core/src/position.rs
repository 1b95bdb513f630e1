//! Sky positions and angular separation.
//!
//! Positions are ICRS right ascension and declination in degrees. Separations
//! are computed with the Vincenty formula, which stays accurate from
//! sub-arcsecond offsets (the regime of catalog cross-matching) out to
//! antipodal points.

use serde::{Deserialize, Serialize};

use crate::constants::{ARCSEC_PER_DEGREE, DEG_TO_RAD, RAD_TO_DEG};
use crate::{VettingError, VettingResult};

/// An ICRS position on the sky, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPosition {
    /// Builds a validated position.
    ///
    /// RA must be finite and is wrapped into [0°, 360°); Dec must lie in
    /// [-90°, +90°].
    pub fn new(ra: f64, dec: f64) -> VettingResult<Self> {
        if !ra.is_finite() || !dec.is_finite() || !(-90.0..=90.0).contains(&dec) {
            return Err(VettingError::InvalidPosition { ra, dec });
        }
        Ok(Self {
            ra: ra.rem_euclid(360.0),
            dec,
        })
    }

    /// Angular distance to `other`, in degrees.
    pub fn separation_deg(&self, other: &SkyPosition) -> f64 {
        angular_separation_deg(self.ra, self.dec, other.ra, other.dec)
    }

    /// Angular distance to `other`, in arcseconds.
    pub fn separation_arcsec(&self, other: &SkyPosition) -> f64 {
        self.separation_deg(other) * ARCSEC_PER_DEGREE
    }
}

/// Vincenty angular separation between two points given in degrees.
///
/// # Returns
/// Angular distance in degrees, always in [0°, 180°].
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let (sin_lat1, cos_lat1) = libm::sincos(dec1_deg * DEG_TO_RAD);
    let (sin_lat2, cos_lat2) = libm::sincos(dec2_deg * DEG_TO_RAD);
    let delta_lon = (ra2_deg - ra1_deg) * DEG_TO_RAD;

    vincenty_angular_separation(sin_lat1, cos_lat1, sin_lat2, cos_lat2, delta_lon) * RAD_TO_DEG
}

/// Vincenty formula on precomputed latitude sines and cosines. Result in radians.
pub fn vincenty_angular_separation(
    sin_lat1: f64,
    cos_lat1: f64,
    sin_lat2: f64,
    cos_lat2: f64,
    delta_lon: f64,
) -> f64 {
    let (sin_delta_lon, cos_delta_lon) = libm::sincos(delta_lon);

    let num = libm::sqrt(
        (cos_lat2 * sin_delta_lon).powi(2)
            + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta_lon).powi(2),
    );
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta_lon;

    libm::atan2(num, den)
}
