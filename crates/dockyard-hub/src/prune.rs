//! Deletion planning and the pruning driver.

use chrono::{DateTime, Utc};
use dockyard_common::DockyardResult;

use crate::client::HubClient;
use crate::config::PrunerConfig;
use crate::models::{DeleteRequest, IgnoreWarning, ImageRecord, ImageStatus, Manifest, WarningKind};

/// Docker Hub caps delete requests at 25 manifests.
pub const MAX_MANIFESTS_PER_REQUEST: usize = 25;

/// Floating tag that is never removed.
pub const LATEST_TAG: &str = "latest";

/// Why an image was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The registry reports the digest as active.
    Active,
    /// `latest` currently points at the digest.
    TaggedLatest,
    /// The registry reported a status this client does not understand.
    UnknownStatus,
}

/// Decide whether `image` must be kept.
#[must_use]
pub fn skip_reason(image: &ImageRecord) -> Option<SkipReason> {
    match image.status {
        ImageStatus::Active => return Some(SkipReason::Active),
        ImageStatus::Unknown => return Some(SkipReason::UnknownStatus),
        ImageStatus::Inactive => {}
    }
    if image.tags.iter().any(|t| t.is_current && t.tag == LATEST_TAG) {
        return Some(SkipReason::TaggedLatest);
    }
    None
}

/// Images submitted together in one delete call.
#[derive(Debug, Clone, Default)]
pub struct DeletionBatch<'a> {
    images: Vec<&'a ImageRecord>,
}

impl<'a> DeletionBatch<'a> {
    /// Images in this batch.
    #[must_use]
    pub fn images(&self) -> &[&'a ImageRecord] {
        &self.images
    }

    /// Number of manifests in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the batch holds no manifests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Build the request body for this batch.
    ///
    /// Current tags other than `latest` are acknowledged as `current_tag`
    /// warnings for the manifest they belong to.
    #[must_use]
    pub fn to_request(&self, active_from: &str, dry_run: bool) -> DeleteRequest {
        let manifests = self
            .images
            .iter()
            .map(|image| Manifest {
                repository: image.repository.clone(),
                digest: image.digest.clone(),
            })
            .collect();

        let ignore_warnings = self
            .images
            .iter()
            .filter_map(|image| {
                let tags: Vec<String> = image.current_tags().map(ToString::to_string).collect();
                (!tags.is_empty()).then(|| IgnoreWarning {
                    repository: image.repository.clone(),
                    digest: image.digest.clone(),
                    warning: WarningKind::CurrentTag,
                    tags,
                })
            })
            .collect();

        DeleteRequest {
            dry_run,
            active_from: active_from.to_string(),
            manifests,
            ignore_warnings,
        }
    }
}

/// Split the deletable images into batches of at most
/// [`MAX_MANIFESTS_PER_REQUEST`], logging every skipped image.
#[must_use]
pub fn plan_batches(images: &[ImageRecord]) -> Vec<DeletionBatch<'_>> {
    let eligible: Vec<&ImageRecord> = images
        .iter()
        .filter(|image| match skip_reason(image) {
            None => true,
            Some(SkipReason::Active) => {
                tracing::info!(image = %image.reference(), "Skipping active image");
                false
            }
            Some(SkipReason::TaggedLatest) => {
                tracing::info!(image = %image.reference(), "Skipping image tagged as latest");
                false
            }
            Some(SkipReason::UnknownStatus) => {
                tracing::warn!(image = %image.reference(), "Skipping image with unknown status");
                false
            }
        })
        .collect();

    eligible
        .chunks(MAX_MANIFESTS_PER_REQUEST)
        .map(|chunk| DeletionBatch {
            images: chunk.to_vec(),
        })
        .collect()
}

/// Outcome of deleting one repository's images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Images that passed the skip rules.
    pub eligible: usize,
    /// Images in batches the registry accepted.
    pub deleted: usize,
    /// Delete calls issued.
    pub batches: usize,
    /// Delete calls that failed.
    pub failed_batches: usize,
}

/// Delete the eligible `images` of `repository` in batches.
///
/// A failed batch is logged and the remaining batches are still submitted.
pub async fn delete_images(
    client: &HubClient,
    repository: &str,
    images: &[ImageRecord],
    active_from: &str,
    dry_run: bool,
) -> DeleteSummary {
    let batches = plan_batches(images);
    let mut summary = DeleteSummary {
        eligible: batches.iter().map(DeletionBatch::len).sum(),
        ..DeleteSummary::default()
    };
    let mut last_ok = false;

    for batch in &batches {
        tracing::info!(repository, count = batch.len(), dry_run, "Deleting the following images:");
        for image in batch.images() {
            tracing::info!(
                repository = %format!("{}/{}", image.namespace, image.repository),
                digest = %image.digest,
                tags = ?image.current_tags().collect::<Vec<_>>(),
                last_pulled = ?image.last_pulled,
                "  image"
            );
        }

        summary.batches += 1;
        match client.delete_batch(&batch.to_request(active_from, dry_run)).await {
            Ok(()) => {
                summary.deleted += batch.len();
                last_ok = true;
            }
            Err(e) => {
                summary.failed_batches += 1;
                last_ok = false;
                tracing::error!(
                    repository,
                    error = %e,
                    "Failed to delete batch of images for {}",
                    repository
                );
            }
        }
    }

    if last_ok {
        tracing::info!(
            repository,
            total = summary.deleted,
            dry_run,
            "Successfully deleted {} total images from {}",
            summary.deleted,
            repository
        );
    }

    summary
}

/// Totals across a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cutoff sent to every listing and delete call.
    pub active_from: String,
    /// Repositories with nothing to delete.
    pub skipped_repositories: Vec<String>,
    /// Images in accepted batches.
    pub deleted: usize,
    /// Failed delete calls.
    pub failed_batches: usize,
}

/// Walks the configured repositories and prunes each one.
pub struct Pruner {
    config: PrunerConfig,
    client: HubClient,
}

impl Pruner {
    /// Create a pruner talking to `config.api_url`.
    #[must_use]
    pub fn new(config: PrunerConfig) -> Self {
        let client = HubClient::new(&config.api_url, &config.namespace);
        Self { config, client }
    }

    /// Run the whole cleanup.
    ///
    /// # Errors
    ///
    /// Returns an error only when the config is invalid or login fails;
    /// listing and deletion failures are logged and skipped.
    pub async fn run(self) -> DockyardResult<RunSummary> {
        self.run_at(Utc::now()).await
    }

    /// Run the whole cleanup with the cutoff measured from `now`.
    ///
    /// # Errors
    ///
    /// Same as [`Pruner::run`].
    pub async fn run_at(mut self, now: DateTime<Utc>) -> DockyardResult<RunSummary> {
        self.config.validate()?;

        if self.config.dry_run {
            tracing::info!("The DRY_RUN flag is enabled. No images will be deleted.");
        }

        self.client
            .authenticate(&self.config.username, &self.config.password)
            .await?;

        let active_from = self.config.active_from(now)?;
        tracing::info!(
            active_from = %active_from,
            days = self.config.days_since_last_active,
            "Pruning images inactive since cutoff"
        );

        let mut summary = RunSummary {
            active_from: active_from.clone(),
            ..RunSummary::default()
        };

        for repository in &self.config.repositories {
            let images = self.client.list_inactive_images(repository, &active_from).await;
            if images.is_empty() {
                tracing::info!(
                    repository = %repository,
                    "Skipping {}, no images matched the deletion criteria.",
                    repository
                );
                summary.skipped_repositories.push(repository.clone());
                continue;
            }

            let result = delete_images(
                &self.client,
                repository,
                &images,
                &active_from,
                self.config.dry_run,
            )
            .await;
            summary.deleted += result.deleted;
            summary.failed_batches += result.failed_batches;
        }

        Ok(summary)
    }
}
