#![cfg(feature = "integration-tests")]

use transient_core::SkyPosition;
use transient_vetting::catalog::CatalogSpec;
use transient_vetting::{CatalogClient, VettingConfig, VizierClient};

// M31 nucleus: dense enough that every catalog has something within 40"
const M31_RA: f64 = 10.684708;
const M31_DEC: f64 = 41.268750;

fn client() -> VizierClient {
    VizierClient::new(&VettingConfig::default().vizier).expect("Failed to build client")
}

#[test]
fn test_gaia_cone_returns_rows_with_separation() {
    let center = SkyPosition::new(M31_RA, M31_DEC).unwrap();
    let rows = client()
        .try_query(&center, &CatalogSpec::gaia_dr2(), 40.0)
        .expect("Gaia query failed");

    assert!(!rows.is_empty(), "Expected Gaia sources near M31");
    for row in &rows {
        let sep = row.separation().expect("row without _r");
        assert!((0.0..=40.5).contains(&sep), "separation {} outside cone", sep);
    }
}

#[test]
fn test_sdss_schema_matches_spec() {
    let center = SkyPosition::new(187.2779, 2.0524).unwrap();
    let spec = CatalogSpec::sdss_dr12();
    let rows = client()
        .try_query(&center, &spec, 2.0)
        .expect("SDSS query failed");

    for row in &rows {
        for col in &spec.output_columns {
            assert!(row.get(col).is_some(), "missing column {}", col);
        }
    }
}
