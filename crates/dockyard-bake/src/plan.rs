//! Bake plan loading.

use std::path::{Path, PathBuf};
use std::process::Command;

use dockyard_common::{DockyardError, DockyardResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resolved build plan printed by `docker buildx bake --print`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BakePlan {
    /// Groups, in definition order.
    #[serde(default)]
    pub group: IndexMap<String, GroupSpec>,

    /// Targets, in definition order.
    #[serde(default)]
    pub target: IndexMap<String, TargetSpec>,
}

/// Named collection of target prefixes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Member names; each selects every target it prefixes.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// One build target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Build context, relative to the project directory.
    #[serde(default = "default_context")]
    pub context: String,

    /// Dockerfile path.
    #[serde(default)]
    pub dockerfile: Option<String>,

    /// Build arguments, in definition order.
    #[serde(default)]
    pub args: IndexMap<String, String>,

    /// Image tags; the first one is the image under test.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Target platforms.
    #[serde(default)]
    pub platforms: Vec<String>,
}

fn default_context() -> String {
    ".".to_string()
}

impl TargetSpec {
    /// Image reference used to run the target's tests.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

impl BakePlan {
    /// Parse `--print` output.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Serialization`] if `json` is not a bake plan.
    pub fn from_json(json: &str) -> DockyardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ask `docker buildx bake` for the plan of `target` defined in
    /// `project_dir/bake_file`.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Plan`] if the generator cannot be started,
    /// exits non-zero, or prints something that is not a plan.
    pub fn generate(docker: &str, project_dir: &Path, bake_file: &Path, target: &str) -> DockyardResult<Self> {
        let definition: PathBuf = project_dir.join(bake_file);
        tracing::debug!(file = %definition.display(), target, "Generating bake plan");

        let output = Command::new(docker)
            .args(["buildx", "bake", "-f"])
            .arg(&definition)
            .args(["--print", target])
            .output()
            .map_err(|e| DockyardError::Plan {
                message: format!("could not run {}: {}", docker, e),
            })?;

        if !output.status.success() {
            return Err(DockyardError::Plan {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::from_json(&stdout).map_err(|e| DockyardError::Plan {
            message: format!("unreadable plan for {}: {}", definition.display(), e),
        })
    }
}
