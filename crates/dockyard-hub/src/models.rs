//! Docker Hub API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity status the registry assigns to an image digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    /// Pulled or pushed within the activity window.
    Active,
    /// No activity within the window.
    Inactive,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Tag attached to an image digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag name.
    pub tag: String,
    /// Whether the tag currently points at this digest.
    #[serde(default)]
    pub is_current: bool,
}

impl TagRecord {
    /// Create a tag record.
    pub fn new(tag: impl Into<String>, is_current: bool) -> Self {
        Self {
            tag: tag.into(),
            is_current,
        }
    }
}

/// One image digest as returned by the image listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Namespace owning the repository.
    pub namespace: String,
    /// Repository name (without namespace).
    pub repository: String,
    /// Content digest.
    pub digest: String,
    /// Activity status.
    pub status: ImageStatus,
    /// Last pull time, if ever pulled.
    #[serde(default)]
    pub last_pulled: Option<DateTime<Utc>>,
    /// Last push time.
    #[serde(default)]
    pub last_pushed: Option<DateTime<Utc>>,
    /// Tags that point or pointed at this digest.
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

impl ImageRecord {
    /// Names of tags currently assigned to this digest.
    pub fn current_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(|t| t.is_current)
            .map(|t| t.tag.as_str())
    }

    /// `repository@digest`, as used in log lines.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}@{}", self.repository, self.digest)
    }
}

/// One page of the image listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagePage {
    /// Total number of matching images.
    #[serde(default)]
    pub count: Option<u64>,
    /// URL of the next page; `None` on the last page.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page.
    #[serde(default)]
    pub previous: Option<String>,
    /// Images on this page.
    #[serde(default)]
    pub results: Vec<ImageRecord>,
}

/// Manifest reference submitted for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Repository name.
    pub repository: String,
    /// Content digest.
    pub digest: String,
}

/// Warning categories the delete endpoint raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The digest still has current tags.
    CurrentTag,
}

/// Acknowledgement of a warning the delete endpoint would otherwise raise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoreWarning {
    /// Repository name.
    pub repository: String,
    /// Content digest.
    pub digest: String,
    /// Warning being acknowledged.
    pub warning: WarningKind,
    /// Current tags that triggered the warning.
    pub tags: Vec<String>,
}

/// Body of a delete-images call.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteRequest {
    /// Report only; the registry deletes nothing.
    pub dry_run: bool,
    /// Activity cutoff, identical to the one used for listing.
    pub active_from: String,
    /// Manifests to delete.
    pub manifests: Vec<Manifest>,
    /// Warnings acknowledged for manifests in this request.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_warnings: Vec<IgnoreWarning>,
}

/// Login response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) token: Option<String>,
    // Newer auth endpoints answer with access_token
    pub(crate) access_token: Option<String>,
}
