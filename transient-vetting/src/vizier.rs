//! VizieR cone-search client.
//!
//! Queries `viz-bin/votable` on a VizieR mirror and turns the VOTable response
//! into catalog rows. One [`VizierClient`] is shared by every worker; the
//! underlying blocking `reqwest` client pools connections and is safe for
//! concurrent use. Throttling, if a mirror needs it, belongs here and not in
//! the orchestrator.

use std::time::Duration;

use transient_core::{SkyPosition, VettingError, VettingResult};

use crate::catalog::{CatalogSpec, ResultSet, SEPARATION_COLUMN};
use crate::client::CatalogClient;
use crate::config::VizierSettings;
use crate::votable::parse_votable;

const VOTABLE_PATH: &str = "/viz-bin/votable";

pub struct VizierClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    row_limit: Option<usize>,
}

impl VizierClient {
    /// Builds a client from validated settings.
    ///
    /// # Errors
    /// `ConfigurationError` if the HTTP client cannot be constructed.
    pub fn new(settings: &VizierSettings) -> VettingResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                VettingError::configuration(
                    "vizier",
                    &format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", settings.base_url.trim_end_matches('/'), VOTABLE_PATH),
            row_limit: settings.row_limit,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn query_params(
        &self,
        position: &SkyPosition,
        spec: &CatalogSpec,
        radius_arcsec: f64,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("-source", spec.catalog_identifier.clone()),
            ("-c", format!("{:.7} {:+.7}", position.ra, position.dec)),
            ("-c.rs", format!("{}", radius_arcsec)),
            (
                "-out.max",
                self.row_limit
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unlimited".to_string()),
            ),
            ("-sort", SEPARATION_COLUMN.to_string()),
        ];

        if spec.input_columns.iter().any(|c| c == "*") {
            params.extend(
                spec.input_columns
                    .iter()
                    .filter(|c| *c != "*")
                    .map(|c| ("-out.add", c.clone())),
            );
        } else {
            params.push(("-out", spec.input_columns.join(",")));
        }
        params
    }
}

impl CatalogClient for VizierClient {
    fn try_query(
        &self,
        position: &SkyPosition,
        spec: &CatalogSpec,
        radius_arcsec: f64,
    ) -> VettingResult<ResultSet> {
        let catalog = spec.catalog_identifier.as_str();
        let params = self.query_params(position, spec, radius_arcsec);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .map_err(|e| {
                VettingError::catalog_unavailable(
                    catalog,
                    &format!("Network request failed: {}", e),
                )
            })?;

        if !response.status().is_success() {
            return Err(VettingError::catalog_unavailable(
                catalog,
                &format!("HTTP request failed with status: {}", response.status()),
            ));
        }

        let body = response.text().map_err(|e| {
            VettingError::catalog_unavailable(catalog, &format!("Failed to read response: {}", e))
        })?;

        let tables = parse_votable(catalog, &body)?;
        match tables.iter().find(|t| t.name == spec.result_table_key) {
            Some(table) => table.to_result_set(spec, position),
            None => Ok(ResultSet::new()),
        }
    }
}
