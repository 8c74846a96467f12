//! Pruner configuration.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use dockyard_common::{DockyardError, DockyardResult};

/// Docker Hub API base URL.
pub const DEFAULT_API_URL: &str = "https://hub.docker.com";

/// Namespace whose repositories are pruned.
pub const DEFAULT_NAMESPACE: &str = "rstudio";

/// Retention window, roughly 18 months.
pub const DEFAULT_DAYS_SINCE_LAST_ACTIVE: u32 = 548;

/// Repositories pruned when no override is given.
pub const DEFAULT_REPOSITORIES: &[&str] = &[
    "r-session-complete",
    "r-session-complete-preview",
    "rstudio-connect",
    "rstudio-connect-content-init",
    "rstudio-connect-content-init-preview",
    "rstudio-connect-preview",
    "rstudio-package-manager",
    "rstudio-package-manager-preview",
    "rstudio-workbench",
    "rstudio-workbench-for-microsoft-azure-ml",
    "rstudio-workbench-preview",
];

/// Settings for one pruning run.
#[derive(Clone)]
pub struct PrunerConfig {
    /// Docker Hub username.
    pub username: String,
    /// Password or personal access token.
    pub password: String,
    /// Images inactive for this many days are eligible.
    pub days_since_last_active: u32,
    /// Report only.
    pub dry_run: bool,
    /// Namespace owning the repositories.
    pub namespace: String,
    /// Repositories to prune, in order.
    pub repositories: Vec<String>,
    /// API base URL.
    pub api_url: String,
}

impl PrunerConfig {
    /// Create a config with defaults for everything but credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            days_since_last_active: DEFAULT_DAYS_SINCE_LAST_ACTIVE,
            dry_run: true,
            namespace: DEFAULT_NAMESPACE.to_string(),
            repositories: DEFAULT_REPOSITORIES.iter().map(ToString::to_string).collect(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Check that the config can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Config`] for empty credentials, namespace or
    /// repository list, or a retention window reaching past the calendar.
    pub fn validate(&self) -> DockyardResult<()> {
        if self.username.trim().is_empty() {
            return Err(DockyardError::Config {
                message: "DOCKER_HUB_USERNAME is not set".to_string(),
            });
        }
        if self.password.is_empty() {
            return Err(DockyardError::Config {
                message: "DOCKER_HUB_PASSWORD is not set".to_string(),
            });
        }
        if self.namespace.trim().is_empty() {
            return Err(DockyardError::Config {
                message: "Namespace must not be empty".to_string(),
            });
        }
        if self.repositories.is_empty() {
            return Err(DockyardError::Config {
                message: "No repositories to prune".to_string(),
            });
        }
        self.active_from(Utc::now())?;
        Ok(())
    }

    /// Activity cutoff relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Config`] if the cutoff is not representable.
    pub fn active_from(&self, now: DateTime<Utc>) -> DockyardResult<String> {
        active_from(now, self.days_since_last_active)
    }
}

impl fmt::Debug for PrunerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrunerConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("days_since_last_active", &self.days_since_last_active)
            .field("dry_run", &self.dry_run)
            .field("namespace", &self.namespace)
            .field("repositories", &self.repositories)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// `now - days`, as RFC 3339 with microseconds and a `+00:00` offset.
///
/// # Errors
///
/// Returns [`DockyardError::Config`] if the cutoff falls outside the
/// supported date range.
pub fn active_from(now: DateTime<Utc>, days: u32) -> DockyardResult<String> {
    Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .map(|cutoff| cutoff.to_rfc3339_opts(SecondsFormat::Micros, false))
        .ok_or_else(|| DockyardError::Config {
            message: format!("DAYS_SINCE_LAST_ACTIVE={} is out of range", days),
        })
}
