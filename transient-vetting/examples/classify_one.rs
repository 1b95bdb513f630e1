use transient_vetting::{Candidate, Classifier, Outcome, VettingConfig, VizierClient};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (ra, dec) = match (args.next(), args.next()) {
        (Some(ra), Some(dec)) => (ra.parse()?, dec.parse()?),
        _ => anyhow::bail!("Usage: classify_one <ra_deg> <dec_deg>"),
    };

    let config = VettingConfig::default();
    let client = VizierClient::new(&config.vizier)?;
    let classifier = Classifier::new(client, config)?;

    let candidate = Candidate::new("candidate", ra, dec);
    match classifier.classify(&candidate)? {
        Outcome::Accepted(record) => {
            println!("accepted ({:.6}, {:+.6})", ra, dec);
            println!("  spec-z  {:?}", record.spec_z);
            println!("  photo-z {:?}", record.photo_z);
            println!("  {} Milliquas rows", record.milliquas_rows.len());
        }
        Outcome::Rejected(rejection) => {
            println!("rejected ({:.6}, {:+.6}): {}", ra, dec, rejection.reason);
        }
    }

    Ok(())
}
