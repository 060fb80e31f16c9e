//! formcast: HTTP front end plus datagram listener.
//!
//! `formcast` runs both components; `formcast http` and `formcast listener`
//! run one each, so they can live in separate processes.

use clap::Parser;
use color_eyre::eyre::Result;

use formcast::config::Cli;
use formcast::{supervisor, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_format, cli.verbose);

    supervisor::run(cli.config, cli.component.unwrap_or_default()).await?;
    Ok(())
}
