//! Log subscriber setup for the dockyard binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{DockyardError, DockyardResult};

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Install the global subscriber.
///
/// `RUST_LOG` is honored; `crate_name` is added at `info`, or at `debug`
/// when `debug` is set.
///
/// # Errors
///
/// Returns [`DockyardError::Config`] if the directive cannot be parsed or a
/// global subscriber is already installed.
pub fn init(crate_name: &str, debug: bool, stream: LogStream) -> DockyardResult<()> {
    let level = if debug { "debug" } else { "info" };
    let directive = directive(crate_name, level)
        .parse()
        .map_err(|e| DockyardError::Config {
            message: format!("Invalid log directive: {}", e),
        })?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match stream {
        LogStream::Stdout => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
            .try_init(),
        LogStream::Stderr => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| DockyardError::Config {
        message: format!("Failed to install log subscriber: {}", e),
    })
}

fn directive(crate_name: &str, level: &str) -> String {
    format!("{}={}", crate_name.replace('-', "_"), level)
}
