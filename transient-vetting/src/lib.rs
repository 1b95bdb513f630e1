//! Catalog cross-match vetting of transient candidates.
//!
//! Each candidate position is matched against three VizieR catalogs and put
//! through two independent rejection tests:
//!
//! - **SDSS DR12** (2″): the nearest primary detection flags a known AGN/QSO
//!   when its sub-class contains `AGN` or `BROADLINE`; otherwise it supplies
//!   spectroscopic and photometric redshifts.
//! - **Gaia DR2** (40″): sources with a significant parallax or proper motion
//!   flag the candidate as stellar when it lies inside their
//!   brightness-dependent exclusion radius.
//! - **Milliquas** (2″): rows are attached to accepted candidates for review.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | [`CatalogSpec`](catalog::CatalogSpec), [`CatalogRegistry`](catalog::CatalogRegistry), [`CatalogRow`](catalog::CatalogRow) |
//! | [`config`] | [`VettingConfig`](config::VettingConfig) thresholds, radii, service settings |
//! | [`client`] | [`CatalogClient`](client::CatalogClient) trait |
//! | [`vizier`] | [`VizierClient`](vizier::VizierClient) HTTP implementation |
//! | [`votable`] | VOTable response parsing |
//! | [`select`] | Nearest-neighbour row selection and quality cuts |
//! | [`sdss`], [`gaia`], [`milliquas`] | Per-catalog classifiers |
//! | [`classify`] | [`Classifier`](classify::Classifier) and [`Outcome`](classify::Outcome) |
//! | [`batch`] | Parallel [`BatchRunner`](batch::BatchRunner) |
//! | [`candidates`] | JSON candidate loading |
//! | [`report`] | Table, JSON and CSV output |
//!
//! # Quick Start
//!
//! ```ignore
//! use transient_vetting::{BatchRunner, Classifier, VettingConfig, VizierClient};
//!
//! let config = VettingConfig::default();
//! let client = VizierClient::new(&config.vizier)?;
//! let classifier = Classifier::new(client, config)?;
//!
//! let candidates = transient_vetting::candidates::load_candidates("candidates.json")?;
//! let report = BatchRunner::new()?.run(&classifier, &candidates)?;
//! println!("{} of {} accepted", report.summary.accepted, report.summary.total);
//! ```
//!
//! # Features
//!
//! - **`cli`** (default) — builds the `analyse-candidates` binary.

pub mod batch;
pub mod candidates;
pub mod catalog;
pub mod classify;
pub mod client;
pub mod config;
pub mod gaia;
pub mod milliquas;
pub mod report;
pub mod sdss;
pub mod select;
pub mod vizier;
pub mod votable;

pub use batch::{BatchReport, BatchRunner, BatchSummary};
pub use classify::{
    Candidate, ClassificationRecord, Classifier, Outcome, Rejection, RejectionReason,
};
pub use client::CatalogClient;
pub use config::VettingConfig;
pub use sdss::RedshiftEstimate;
pub use vizier::VizierClient;
