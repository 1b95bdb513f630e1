//! Nearest-neighbour row selection with catalog-specific quality cuts.
//!
//! Rows are ordered by angular separation with a stable sort, so equal
//! separations keep the order the client returned them in and repeated runs
//! over the same rows select the same row. Rows without a separation sort
//! last. A missing or null numeric cell never passes a `> 0` or `>= threshold`
//! test.

use std::cmp::Ordering;

use crate::catalog::CatalogRow;
use crate::config::{GaiaCriteria, SdssCriteria, SignificanceMode};

/// Sorts rows ascending by `_r`.
pub fn sort_by_separation(rows: &mut [CatalogRow]) {
    rows.sort_by(compare_separation);
}

fn compare_separation(a: &CatalogRow, b: &CatalogRow) -> Ordering {
    match (a.separation(), b.separation()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The nearest primary SDSS detection, if any.
pub fn select_sdss(rows: &[CatalogRow], criteria: &SdssCriteria) -> Option<CatalogRow> {
    let primary = criteria.primary_mode as f64;
    let mut survivors: Vec<CatalogRow> = rows
        .iter()
        .filter(|row| row.float("mode") == Some(primary))
        .cloned()
        .collect();
    sort_by_separation(&mut survivors);
    survivors.into_iter().next()
}

/// Gaia rows with a significant parallax or proper motion, nearest first.
pub fn select_gaia(rows: &[CatalogRow], criteria: &GaiaCriteria) -> Vec<CatalogRow> {
    let mut survivors: Vec<CatalogRow> = rows
        .iter()
        .filter(|row| has_positive_astrometry(row))
        .filter(|row| is_significant(row, criteria))
        .cloned()
        .collect();
    sort_by_separation(&mut survivors);
    survivors
}

fn positive(row: &CatalogRow, column: &str) -> bool {
    row.float(column).is_some_and(|v| v > 0.0)
}

fn has_positive_astrometry(row: &CatalogRow) -> bool {
    positive(row, "Plx") || positive(row, "pmRA") || positive(row, "pmDE")
}

/// Measurement over its 1σ uncertainty; NaN when either is missing.
fn significance(row: &CatalogRow, value: &str, error: &str) -> f64 {
    match (row.float(value), row.float(error)) {
        (Some(v), Some(e)) => v / e,
        _ => f64::NAN,
    }
}

fn is_significant(row: &CatalogRow, criteria: &GaiaCriteria) -> bool {
    let plx = significance(row, "Plx", "e_Plx") >= criteria.parallax_significance;
    let pmra = significance(row, "pmRA", "e_pmRA") >= criteria.pmra_significance;
    let pmde = match criteria.significance_mode {
        SignificanceMode::Literal => pmra,
        SignificanceMode::BothAxes => {
            significance(row, "pmDE", "e_pmDE") >= criteria.pmdec_significance
        }
    };
    plx || pmra || pmde
}
