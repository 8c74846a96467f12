//! test-bake-artifacts entry point.

use clap::Parser;
use color_eyre::eyre::Result;
use dockyard_common::logging::{self, LogStream};

use dockyard_bake::cli::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init("dockyard_bake", cli.debug, LogStream::Stdout)?;

    let code = cli.execute()?;
    std::process::exit(code);
}
