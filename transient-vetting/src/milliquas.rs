//! Milliquas enrichment. Rows are attached to accepted candidates for
//! review and never influence the decision.

use crate::catalog::{CatalogRow, ResultSet};
use crate::select::sort_by_separation;

/// Every Milliquas row, nearest first.
pub fn enrich(rows: ResultSet) -> Vec<CatalogRow> {
    let mut rows = rows;
    sort_by_separation(&mut rows);
    rows
}
