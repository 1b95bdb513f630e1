use std::collections::HashMap;

use transient_core::{SkyPosition, VettingError, VettingResult};
use transient_vetting::catalog::{CatalogRow, CatalogSpec, CatalogValue, ResultSet};
use transient_vetting::{
    BatchRunner, Candidate, CatalogClient, Classifier, Outcome, RedshiftEstimate,
    RejectionReason, VettingConfig,
};

/// Serves fixed rows per (candidate position, catalog).
#[derive(Default)]
struct SnapshotClient {
    rows: HashMap<(String, String), ResultSet>,
    down: Vec<String>,
}

impl SnapshotClient {
    fn key(position: &SkyPosition, catalog: &str) -> (String, String) {
        (format!("{:.5},{:.5}", position.ra, position.dec), catalog.to_string())
    }

    fn add(&mut self, candidate: &Candidate, catalog: &str, rows: Vec<CatalogRow>) {
        let position = candidate.position().unwrap();
        self.rows.insert(Self::key(&position, catalog), rows);
    }
}

impl CatalogClient for SnapshotClient {
    fn try_query(
        &self,
        position: &SkyPosition,
        spec: &CatalogSpec,
        _radius_arcsec: f64,
    ) -> VettingResult<ResultSet> {
        if self.down.contains(&spec.catalog_identifier) {
            return Err(VettingError::catalog_unavailable(
                &spec.catalog_identifier,
                "connection reset",
            ));
        }
        Ok(self
            .rows
            .get(&Self::key(position, &spec.catalog_identifier))
            .cloned()
            .unwrap_or_default())
    }
}

fn f(v: f64) -> CatalogValue {
    CatalogValue::Float(v)
}

fn t(s: &str) -> CatalogValue {
    CatalogValue::Text(s.to_string())
}

fn sdss(sep: f64, mode: f64, subclass: &str, zsp: f64, zph: f64) -> CatalogRow {
    CatalogRow::new()
        .with("_r", f(sep))
        .with("mode", f(mode))
        .with("subCl", t(subclass))
        .with("zsp", f(zsp))
        .with("e_zsp", f(0.0001))
        .with("zph", f(zph))
        .with("e_zph", f(0.02))
}

fn gaia(sep: f64, gmag: f64, plx: f64, e_plx: f64) -> CatalogRow {
    CatalogRow::new()
        .with("_r", f(sep))
        .with("Gmag", f(gmag))
        .with("Plx", f(plx))
        .with("e_Plx", f(e_plx))
        .with("pmRA", f(0.0))
        .with("e_pmRA", f(1.0))
        .with("pmDE", f(0.0))
        .with("e_pmDE", f(1.0))
}

fn field() -> (Vec<Candidate>, SnapshotClient) {
    let candidates = vec![
        Candidate::new("empty-sky", 10.0, 10.0),
        Candidate::new("host-galaxy", 20.0, -5.0),
        Candidate::new("seyfert", 30.0, 15.0),
        Candidate::new("near-star", 40.0, 25.0),
        Candidate::new("faint-neighbour", 50.0, 35.0),
        Candidate::new("quasar-field", 60.0, -20.0),
    ];

    let mut client = SnapshotClient::default();
    client.add(
        &candidates[1],
        "V/147",
        vec![
            sdss(1.0, 1.0, "STARFORMING", 0.12, 0.11),
            sdss(0.5, 1.0, "STARBURST", 0.08, 0.09),
            sdss(0.1, 2.0, "AGN", 0.5, 0.5),
        ],
    );
    client.add(&candidates[2], "V/147", vec![sdss(0.3, 1.0, "AGN", 0.03, 0.04)]);
    client.add(
        &candidates[3],
        "I/345",
        vec![gaia(5.0, 15.0, 4.0, 0.2), gaia(25.0, 18.0, 1.0, 0.1)],
    );
    client.add(&candidates[4], "I/345", vec![gaia(1.5, 20.0, 5.0, 0.1)]);
    client.add(
        &candidates[5],
        "VII/280",
        vec![CatalogRow::new()
            .with("_r", f(1.2))
            .with("Name", t("2MASS J04000000-2000000"))
            .with("Cl", t("QR"))
            .with("z", f(2.1))],
    );
    (candidates, client)
}

#[test]
fn test_batch_over_mixed_field() {
    let (candidates, client) = field();
    let classifier = Classifier::new(client, VettingConfig::default()).unwrap();
    let report = BatchRunner::with_threads(3)
        .unwrap()
        .run(&classifier, &candidates)
        .unwrap();

    assert_eq!(report.summary.total, 6);
    assert_eq!(report.summary.accepted, 4);
    assert_eq!(report.summary.rejected_qso, 1);
    assert_eq!(report.summary.rejected_star, 1);

    let by_name: HashMap<&str, &Outcome> =
        report.outcomes.iter().map(|o| (o.name(), o)).collect();

    let empty = by_name["empty-sky"].accepted().unwrap();
    assert_eq!(empty.spec_z, RedshiftEstimate::UNAVAILABLE);
    assert_eq!(empty.photo_z, RedshiftEstimate::UNAVAILABLE);

    // secondary AGN at 0.1" ignored, primary at 0.5" wins
    let host = by_name["host-galaxy"].accepted().unwrap();
    assert_eq!(host.spec_z.value, 0.08);
    assert_eq!(host.photo_z.value, 0.09);

    assert_eq!(
        by_name["seyfert"].rejection().unwrap().reason,
        RejectionReason::Qso
    );
    assert_eq!(
        by_name["near-star"].rejection().unwrap().reason,
        RejectionReason::Star
    );
    assert!(by_name["faint-neighbour"].accepted().is_some());

    let quasar = by_name["quasar-field"].accepted().unwrap();
    assert_eq!(quasar.milliquas_rows.len(), 1);
    assert_eq!(quasar.milliquas_rows[0].text("Cl"), Some("QR"));
}

#[test]
fn test_batch_is_deterministic() {
    let (candidates, client) = field();
    let classifier = Classifier::new(client, VettingConfig::default()).unwrap();

    let first = serde_json::to_string(
        &BatchRunner::with_threads(4)
            .unwrap()
            .run(&classifier, &candidates)
            .unwrap(),
    )
    .unwrap();
    for threads in [1, 2, 8] {
        let again = serde_json::to_string(
            &BatchRunner::with_threads(threads)
                .unwrap()
                .run(&classifier, &candidates)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_outage_degrades_per_catalog() {
    let (candidates, mut client) = field();
    client.down.push("V/147".to_string());
    let classifier = Classifier::new(client, VettingConfig::default()).unwrap();
    let report = BatchRunner::with_threads(2)
        .unwrap()
        .run(&classifier, &candidates)
        .unwrap();

    // SDSS unavailable: the seyfert is no longer rejected, the star still is
    assert_eq!(report.summary.rejected_qso, 0);
    assert_eq!(report.summary.rejected_star, 1);
    assert_eq!(report.summary.accepted, 5);
}
