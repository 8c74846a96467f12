//! Common error types for the dockyard tools.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`DockyardError`].
pub type DockyardResult<T> = Result<T, DockyardError>;

/// Errors shared by the registry pruner and the bake test runner.
#[derive(Error, Diagnostic, Debug)]
pub enum DockyardError {
    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(dockyard::config))]
    Config {
        /// The error message.
        message: String,
    },

    /// Registry login was rejected or returned no token.
    #[error("Failed to get bearer token: {message}")]
    #[diagnostic(
        code(dockyard::auth),
        help("Check DOCKER_HUB_USERNAME and DOCKER_HUB_PASSWORD (a personal access token also works)")
    )]
    Auth {
        /// The error message.
        message: String,
    },

    /// Transport-level HTTP failure.
    #[error("Network error: {message}")]
    #[diagnostic(code(dockyard::network))]
    Network {
        /// The error message.
        message: String,
    },

    /// Registry answered with a non-success status.
    #[error("Registry returned {status}: {message}")]
    #[diagnostic(code(dockyard::registry))]
    Registry {
        /// HTTP status code.
        status: u16,
        /// The error message.
        message: String,
    },

    /// Build plan generation failed.
    #[error("Failed to get bake plan: {message}")]
    #[diagnostic(
        code(dockyard::plan),
        help("Run `docker buildx bake --print` by hand to see the full error")
    )]
    Plan {
        /// The error message, including generator stderr when available.
        message: String,
    },

    /// The requested group is not present in the build plan.
    #[error("Group or target not found in bake plan: {name}")]
    #[diagnostic(code(dockyard::plan::unknown_group))]
    UnknownGroup {
        /// The missing group name.
        name: String,
    },

    /// An exclusion pattern is not a valid regular expression.
    #[error("Invalid skip pattern {pattern:?}: {message}")]
    #[diagnostic(code(dockyard::filter::invalid_pattern))]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },

    /// A subprocess could not be launched.
    #[error("Failed to run {program}: {message}")]
    #[diagnostic(code(dockyard::process))]
    Process {
        /// The program that failed to start.
        program: String,
        /// The error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(dockyard::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(dockyard::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for DockyardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
