use anyhow::Context;
use clap::Parser;
use weather_etl::cli::{run, Cli};
use weather_etl::utils::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_file.as_deref()).context("setting up logging")?;
    tracing::debug!("weather-etl {}", env!("CARGO_PKG_VERSION"));

    run(cli).await.context("weather-etl failed")
}
