use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use transient_vetting::candidates::load_candidates;
use transient_vetting::report::{render, ReportFormat, ReportOptions};
use transient_vetting::{BatchRunner, Classifier, VettingConfig, VizierClient};

#[derive(Parser)]
#[command(name = "analyse-candidates")]
#[command(about = "Vet transient candidates against SDSS, Gaia and Milliquas")]
#[command(version)]
struct Cli {
    /// JSON input file (array of objects with name, ra, dec)
    #[arg(long)]
    json: PathBuf,

    /// Number of worker threads (default: cores - 1)
    #[arg(long)]
    ncpu: Option<usize>,

    /// Log every pipeline stage
    #[arg(short, long)]
    verbose: bool,

    /// TOML file overriding thresholds, radii or catalog settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// VizieR mirror base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: ReportFormat,

    /// Also list rejected candidates and the reason
    #[arg(long)]
    show_rejected: bool,

    /// Print run timing
    #[arg(long)]
    timing: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<VettingConfig> {
    let mut config = match &cli.config {
        Some(path) => VettingConfig::load(path)?,
        None => VettingConfig::default(),
    };
    if let Some(url) = &cli.base_url {
        config.vizier.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli).context("Invalid configuration")?;
    let client = VizierClient::new(&config.vizier)?;
    let milliquas_columns = config.catalogs.milliquas.output_columns.clone();
    let classifier = Classifier::new(client, config)?;
    let runner = BatchRunner::with_threads(cli.ncpu.unwrap_or(0))?;

    let candidates = load_candidates(&cli.json)
        .with_context(|| format!("Failed to load candidates from {:?}", cli.json))?;

    let start = cli.timing.then(Instant::now);
    let report = runner.run(&classifier, &candidates)?;
    if let Some(start_time) = start {
        eprintln!(
            "Classified {} candidates in {:.2} s",
            candidates.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    let options = ReportOptions {
        format: cli.format,
        show_rejected: cli.show_rejected,
        milliquas_columns,
    };
    print!("{}", render(&report, &options)?);
    Ok(())
}
