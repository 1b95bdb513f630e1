//! Candidate list loading.
//!
//! The input is a JSON array of objects with at least `name`, `ra` and `dec`
//! (degrees). Any other fields, such as those exported alongside candidates
//! by a scanning page, are ignored.

use std::fs;
use std::path::Path;

use transient_core::{VettingError, VettingResult};

use crate::classify::Candidate;

pub fn parse_candidates(source_name: &str, json: &str) -> VettingResult<Vec<Candidate>> {
    let candidates: Vec<Candidate> = serde_json::from_str(json)
        .map_err(|e| VettingError::input(source_name, &e.to_string()))?;

    for candidate in &candidates {
        candidate.position().map_err(|_| {
            VettingError::input(
                source_name,
                &format!(
                    "candidate {} has an invalid position (RA={}, Dec={})",
                    candidate.name, candidate.ra, candidate.dec
                ),
            )
        })?;
    }
    Ok(candidates)
}

/// Reads and validates a candidate file.
///
/// # Errors
/// `InputError` if the file cannot be read, is not a JSON array of
/// candidates, or contains a candidate with an invalid position.
pub fn load_candidates(path: impl AsRef<Path>) -> VettingResult<Vec<Candidate>> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let json =
        fs::read_to_string(path).map_err(|e| VettingError::input(&source_name, &e.to_string()))?;
    parse_candidates(&source_name, &json)
}
