//! Per-candidate classification.
//!
//! [`Classifier::classify`] runs the three catalog queries concurrently,
//! applies the SDSS and Gaia classifiers, attaches Milliquas rows, and
//! returns an [`Outcome`]. It holds no per-candidate state, so one
//! classifier serves every worker.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use transient_core::{SkyPosition, VettingResult};

use crate::catalog::{CatalogKind, CatalogRegistry, CatalogRow, ResultSet};
use crate::client::CatalogClient;
use crate::config::VettingConfig;
use crate::gaia::{classify_gaia, ProximateStar};
use crate::milliquas;
use crate::sdss::{classify_sdss, RedshiftEstimate};
use crate::select::{select_gaia, select_sdss};

/// A transient candidate to vet. Positions are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub ra: f64,
    pub dec: f64,
}

impl Candidate {
    pub fn new(name: &str, ra: f64, dec: f64) -> Self {
        Self {
            name: name.to_string(),
            ra,
            dec,
        }
    }

    pub fn position(&self) -> VettingResult<SkyPosition> {
        SkyPosition::new(self.ra, self.dec)
    }
}

/// Output for an accepted candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRecord {
    pub name: String,
    pub spec_z: RedshiftEstimate,
    pub photo_z: RedshiftEstimate,
    pub milliquas_rows: Vec<CatalogRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    Star,
    Qso,
    StarAndQso,
}

impl RejectionReason {
    fn from_flags(stellar: bool, qso: bool) -> Option<Self> {
        match (stellar, qso) {
            (true, true) => Some(Self::StarAndQso),
            (true, false) => Some(Self::Star),
            (false, true) => Some(Self::Qso),
            (false, false) => None,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Star => "foreground star",
            Self::Qso => "known AGN/QSO",
            Self::StarAndQso => "foreground star and known AGN/QSO",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectionReason,
    /// SDSS sub-class that set the QSO flag.
    pub qso_subclass: Option<String>,
    /// Nearest Gaia source that set the stellar flag.
    pub star: Option<ProximateStar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    Accepted(ClassificationRecord),
    Rejected(Rejection),
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Outcome::Accepted(record) => &record.name,
            Outcome::Rejected(rejection) => &rejection.name,
        }
    }

    pub fn accepted(&self) -> Option<&ClassificationRecord> {
        match self {
            Outcome::Accepted(record) => Some(record),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(rejection) => Some(rejection),
        }
    }
}

pub struct Classifier<C> {
    client: C,
    config: VettingConfig,
}

impl<C: CatalogClient> Classifier<C> {
    /// Validates `config` up front; workers borrow the classifier as-is.
    ///
    /// # Errors
    /// `ConfigurationError` if the config or its catalog registry is invalid.
    pub fn new(client: C, config: VettingConfig) -> VettingResult<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &VettingConfig {
        &self.config
    }

    fn registry(&self) -> &CatalogRegistry {
        &self.config.catalogs
    }

    fn query(&self, position: &SkyPosition, kind: CatalogKind) -> ResultSet {
        let radius = match kind {
            CatalogKind::Sdss => self.config.sdss.search_radius_arcsec,
            CatalogKind::Gaia => self.config.gaia.search_radius_arcsec,
            CatalogKind::Milliquas => self.config.milliquas.search_radius_arcsec,
        };
        let rows = self.client.query(position, self.registry().spec(kind), radius);
        debug!(catalog = %kind, rows = rows.len(), "unfiltered {} output: {:?}", kind, rows);
        rows
    }

    /// Classifies one candidate.
    ///
    /// # Errors
    /// `InvalidPosition` if the candidate's coordinates are out of range.
    /// Catalog failures are not errors: they degrade to "no match".
    pub fn classify(&self, candidate: &Candidate) -> VettingResult<Outcome> {
        let position = candidate.position()?;
        debug!(
            name = %candidate.name,
            "classifying RA, DEC = {:.6}, {:.6}",
            position.ra,
            position.dec
        );

        let (sdss_rows, (gaia_rows, milliquas_rows)) = rayon::join(
            || self.query(&position, CatalogKind::Sdss),
            || {
                rayon::join(
                    || self.query(&position, CatalogKind::Gaia),
                    || self.query(&position, CatalogKind::Milliquas),
                )
            },
        );

        let sdss_selected = select_sdss(&sdss_rows, &self.config.sdss);
        let sdss = classify_sdss(sdss_selected.as_ref(), &self.config.sdss);
        debug!(
            name = %candidate.name,
            selected = ?sdss_selected,
            qso = sdss.qso,
            "SDSS after rejecting bad data"
        );

        let gaia_selected = select_gaia(&gaia_rows, &self.config.gaia);
        let gaia = classify_gaia(&gaia_selected, &self.config.gaia);
        debug!(
            name = %candidate.name,
            survivors = gaia_selected.len(),
            stellar = gaia.stellar,
            "Gaia after removing insignificant parallax and proper motion"
        );

        let outcome = match RejectionReason::from_flags(gaia.stellar, sdss.qso) {
            Some(reason) => Outcome::Rejected(Rejection {
                name: candidate.name.clone(),
                reason,
                qso_subclass: sdss.qso.then_some(sdss.subclass).flatten(),
                star: gaia.nearest,
            }),
            None => Outcome::Accepted(ClassificationRecord {
                name: candidate.name.clone(),
                spec_z: sdss.spec_z,
                photo_z: sdss.photo_z,
                milliquas_rows: milliquas::enrich(milliquas_rows),
            }),
        };

        match &outcome {
            Outcome::Accepted(_) => debug!(name = %candidate.name, "accepted"),
            Outcome::Rejected(r) => debug!(name = %candidate.name, "rejected: {}", r.reason),
        }
        Ok(outcome)
    }
}
