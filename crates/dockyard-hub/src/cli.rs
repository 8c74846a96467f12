//! dockerhub-clean CLI.

use clap::Parser;
use color_eyre::eyre::Result;

use crate::config::{
    DEFAULT_API_URL, DEFAULT_DAYS_SINCE_LAST_ACTIVE, DEFAULT_NAMESPACE, DEFAULT_REPOSITORIES,
    PrunerConfig,
};
use crate::prune::Pruner;

/// dockerhub-clean - Delete Docker Hub images inactive past the retention window
#[derive(Parser)]
#[command(name = "dockerhub-clean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 1 reports what would be deleted, 0 deletes
    #[arg(long, env = "DRY_RUN", default_value_t = 1)]
    pub dry_run: i64,

    /// Docker Hub username
    #[arg(long, env = "DOCKER_HUB_USERNAME")]
    pub username: String,

    /// Docker Hub password or personal access token
    #[arg(long, env = "DOCKER_HUB_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Delete images not active for this many days
    #[arg(long = "days", env = "DAYS_SINCE_LAST_ACTIVE", default_value_t = DEFAULT_DAYS_SINCE_LAST_ACTIVE)]
    pub days_since_last_active: u32,

    /// Namespace owning the repositories
    #[arg(long, env = "DOCKER_HUB_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Repositories to prune (comma-separated); defaults to the built-in list
    #[arg(long = "repository", env = "DOCKER_HUB_REPOSITORIES", value_delimiter = ',')]
    pub repositories: Vec<String>,

    /// Docker Hub API base URL
    #[arg(long, env = "DOCKER_HUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl Cli {
    /// Build the pruner config from the parsed arguments.
    #[must_use]
    pub fn config(&self) -> PrunerConfig {
        let repositories: Vec<String> = self
            .repositories
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        PrunerConfig {
            username: self.username.clone(),
            password: self.password.clone(),
            days_since_last_active: self.days_since_last_active,
            dry_run: self.dry_run != 0,
            namespace: self.namespace.clone(),
            repositories: if repositories.is_empty() {
                DEFAULT_REPOSITORIES.iter().map(ToString::to_string).collect()
            } else {
                repositories
            },
            api_url: self.api_url.clone(),
        }
    }

    /// Execute the cleanup.
    pub async fn execute(self) -> Result<()> {
        let summary = Pruner::new(self.config()).run().await?;

        tracing::info!(
            deleted = summary.deleted,
            failed_batches = summary.failed_batches,
            skipped_repositories = summary.skipped_repositories.len(),
            "Cleanup finished"
        );
        Ok(())
    }
}
