//! country-gdp-etl: fetch the country GDP table and store it in SQLite.
//!
//! Running without arguments performs the whole fetch/transform/load
//! sequence against the default page and writes `gdp_data.db`.

use anyhow::Result;
use clap::Parser;
use country_gdp_etl::config::{
    EtlConfig, DEFAULT_DB_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_URL, TABLE_NAME,
};
use country_gdp_etl::{run_pipeline, RunSummary, TracingProgress};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "country-gdp-etl",
    version,
    about = "Fetch the country GDP table, clean it, and store it in SQLite"
)]
struct Cli {
    /// Page whose first table holds the GDP figures
    #[arg(long, env = "GDP_ETL_URL", default_value = DEFAULT_URL)]
    url: String,

    /// SQLite file to write
    #[arg(long = "db", env = "GDP_ETL_DB", default_value = DEFAULT_DB_PATH)]
    db_path: PathBuf,

    /// Network timeout in seconds (at least 1)
    #[arg(
        long,
        env = "GDP_ETL_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,
}

impl Cli {
    fn into_config(self) -> EtlConfig {
        EtlConfig {
            url: self.url,
            db_path: self.db_path,
            table: TABLE_NAME.to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn log_subscriber() -> Result<impl tracing::Subscriber + Send + Sync> {
    Ok(tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("country_gdp_etl=info".parse()?))
        .with_writer(std::io::stdout)
        .with_target(false)
        .finish())
}

async fn run(config: EtlConfig) -> Result<RunSummary> {
    info!("starting country-gdp-etl v{}", env!("CARGO_PKG_VERSION"));
    let summary = run_pipeline(&config, &TracingProgress).await?;
    info!(
        "{} rows extracted, {} rows written to {} ({} columns)",
        summary.rows_extracted,
        summary.rows_written,
        config.db_path.display(),
        summary.columns.len()
    );
    Ok(summary)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    let subscriber = match log_subscriber() {
        Ok(subscriber) => subscriber,
        Err(e) => {
            eprintln!("failed to set up logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    // Scoped to this thread; the current-thread runtime polls everything here.
    let _log_guard = tracing::subscriber::set_default(subscriber);

    match run(config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("ETL pipeline failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
