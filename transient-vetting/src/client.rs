//! The catalog query seam.
//!
//! [`CatalogClient`] is the only blocking collaborator of the classifier.
//! Implementations report failures from [`CatalogClient::try_query`]; the
//! provided [`CatalogClient::query`] turns any failure into an empty result
//! set so one unavailable catalog never stops a candidate from being
//! classified with the others.

use transient_core::{SkyPosition, VettingResult};

use crate::catalog::{CatalogSpec, ResultSet};

pub trait CatalogClient: Send + Sync {
    /// Rows of `spec` within `radius_arcsec` of `position`, in any order.
    ///
    /// # Errors
    /// `CatalogUnavailable` on transport failure or a response that does not
    /// match the catalog's output schema. No match is an empty `Ok`.
    fn try_query(
        &self,
        position: &SkyPosition,
        spec: &CatalogSpec,
        radius_arcsec: f64,
    ) -> VettingResult<ResultSet>;

    /// Like [`try_query`](Self::try_query), but degrades every failure to an
    /// empty result set.
    fn query(&self, position: &SkyPosition, spec: &CatalogSpec, radius_arcsec: f64) -> ResultSet {
        match self.try_query(position, spec, radius_arcsec) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    catalog = %spec.catalog_identifier,
                    ra = position.ra,
                    dec = position.dec,
                    "catalog query failed, treating as no match: {}",
                    e
                );
                ResultSet::new()
            }
        }
    }
}

impl<C: CatalogClient + ?Sized> CatalogClient for std::sync::Arc<C> {
    fn try_query(
        &self,
        position: &SkyPosition,
        spec: &CatalogSpec,
        radius_arcsec: f64,
    ) -> VettingResult<ResultSet> {
        (**self).try_query(position, spec, radius_arcsec)
    }
}
