//! Core types shared by the transient vetting pipeline.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | [`VettingError`] taxonomy and [`VettingResult`] alias |
//! | [`position`] | [`SkyPosition`] and Vincenty angular separation |
//! | [`constants`] | Angle unit conversions |

pub mod constants;
pub mod errors;
pub mod position;

pub use errors::{VettingError, VettingResult};
pub use position::{angular_separation_deg, SkyPosition};
