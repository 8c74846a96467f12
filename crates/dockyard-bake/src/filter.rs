//! Exclusion of targets that have no tests.

use dockyard_common::{DockyardError, DockyardResult};
use indexmap::IndexMap;
use regex::Regex;

use crate::plan::TargetSpec;

/// Patterns skipped on every run.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    // Content images don't have tests
    "^content.*",
    // Intermediary Azure ML layers are neither exported nor tested
    "(build|scan)-workbench-for-microsoft.*",
];

/// Ordered exclusion patterns, matched anywhere in a target name.
#[derive(Debug, Clone)]
pub struct SkipRules {
    patterns: Vec<Regex>,
}

impl SkipRules {
    /// Compile `patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn new<I, S>(patterns: I) -> DockyardResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| DockyardError::InvalidPattern {
                    pattern: p.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<DockyardResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The default patterns followed by `extra`.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::InvalidPattern`] if an extra pattern does not
    /// compile.
    pub fn with_defaults<S: AsRef<str>>(extra: &[S]) -> DockyardResult<Self> {
        Self::new(
            DEFAULT_SKIP_PATTERNS
                .iter()
                .copied()
                .chain(extra.iter().map(|s| s.as_ref())),
        )
    }

    /// Whether `target_name` is excluded.
    #[must_use]
    pub fn is_skipped(&self, target_name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(target_name))
    }

    /// Split `targets` into the ones to run and the names of the ones skipped,
    /// keeping their order.
    #[must_use]
    pub fn partition(
        &self,
        targets: IndexMap<String, TargetSpec>,
    ) -> (IndexMap<String, TargetSpec>, Vec<String>) {
        let mut kept = IndexMap::new();
        let mut skipped = Vec::new();
        for (name, spec) in targets {
            if self.is_skipped(&name) {
                tracing::info!(bake_target = %name, "Skipping {}", name);
                skipped.push(name);
            } else {
                kept.insert(name, spec);
            }
        }
        (kept, skipped)
    }
}
