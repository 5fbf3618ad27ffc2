use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use job_digest::{
    config::{defaults::DEFAULT_CONFIG_FILE, Config, Credentials},
    mailer::Mailer,
    runner::DigestRunner,
    utils::RunClock,
};

#[derive(Parser)]
#[command(name = "job-digest")]
#[command(version)]
#[command(about = "Collects fresh job postings from ATS boards and job search into an email digest")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Render the digest without sending it
    #[arg(long)]
    dry_run: bool,

    /// Write the rendered HTML to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("job_digest={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job digest v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Credentials are checked before any fetch so a misconfigured run fails fast
    let credentials = Credentials::from_env();
    let mailer = if cli.dry_run {
        info!("Dry run: digest will not be sent");
        None
    } else {
        Some(Mailer::new(&config.mail, credentials.mail_account()?))
    };

    let clock = RunClock::capture(config.canonical_offset()?);
    info!("Run reference instant: {}", clock.now().to_rfc3339());

    let runner = DigestRunner::new(config)?;
    let report = runner.run(&credentials, clock).await;
    if !report.failed_sources.is_empty() {
        warn!(
            "{} sources failed: {}",
            report.failed_sources.len(),
            report.failed_sources.join(", ")
        );
    }

    if let Some(path) = &cli.output {
        std::fs::write(path, &report.digest.html)?;
        info!("Digest written to {}", path.display());
    }

    match mailer {
        Some(mailer) => mailer.send(&report.digest).await?,
        None if cli.output.is_none() => println!("{}", report.digest.html),
        None => {}
    }

    info!(
        "Run complete: {} fetched, {} recent matches, {} in digest",
        report.fetched, report.recent_matching, report.digest.total
    );
    Ok(())
}
