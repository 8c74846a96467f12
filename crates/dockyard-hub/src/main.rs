//! dockerhub-clean entry point.

use clap::Parser;
use color_eyre::eyre::Result;
use dockyard_common::logging::{self, LogStream};

use dockyard_hub::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init("dockyard_hub", cli.debug, LogStream::Stderr)?;

    cli.execute().await
}
