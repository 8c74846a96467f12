//! test-bake-artifacts CLI.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

use crate::executor::ShellExecutor;
use crate::runner::{RunnerConfig, TestRunner};

/// test-bake-artifacts - Run the bundled tests of every image in a bake group
#[derive(Parser)]
#[command(name = "test-bake-artifacts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Bake definition file, relative to the project directory
    #[arg(short, long, default_value = "docker-bake.hcl")]
    pub file: PathBuf,

    /// Group (or target) to test
    #[arg(short, long, default_value = "default")]
    pub target: String,

    /// Directory the bake file and target contexts are resolved against
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Additional target name pattern to skip (repeatable)
    #[arg(long = "skip", value_name = "REGEX")]
    pub skip: Vec<String>,

    /// Docker CLI binary
    #[arg(long, env = "DOCKER", default_value = "docker")]
    pub docker: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl Cli {
    /// Build the runner config from the parsed arguments.
    #[must_use]
    pub fn config(&self) -> RunnerConfig {
        RunnerConfig {
            bake_file: self.file.clone(),
            target: self.target.clone(),
            project_dir: self.project_dir.clone(),
            docker: self.docker.clone(),
            extra_skip: self.skip.clone(),
        }
    }

    /// Run the tests and return the process exit code.
    pub fn execute(self) -> Result<i32> {
        let runner = TestRunner::new(self.config())?;
        let report = runner.run(&mut ShellExecutor::new())?;

        tracing::info!(
            tested = report.tested.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Test run finished"
        );
        Ok(report.exit_code())
    }
}
