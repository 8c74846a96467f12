//! Group expansion.

use dockyard_common::{DockyardError, DockyardResult};
use indexmap::IndexMap;

use crate::plan::{BakePlan, TargetSpec};

/// Expand `group` into the plan targets it selects.
///
/// Each member selects every target whose name starts with it; members are
/// walked in declared order and targets in plan order, and a target selected
/// twice keeps its first position. A name that is not a group but is a
/// target resolves to that target alone.
///
/// # Errors
///
/// Returns [`DockyardError::UnknownGroup`] if `group` is neither a group nor
/// a target of the plan.
pub fn resolve_targets(plan: &BakePlan, group: &str) -> DockyardResult<IndexMap<String, TargetSpec>> {
    let Some(spec) = plan.group.get(group) else {
        return plan
            .target
            .get(group)
            .map(|target| IndexMap::from([(group.to_string(), target.clone())]))
            .ok_or_else(|| DockyardError::UnknownGroup {
                name: group.to_string(),
            });
    };

    let mut targets = IndexMap::new();
    for member in &spec.targets {
        for (name, target) in &plan.target {
            if name.starts_with(member.as_str()) {
                targets.insert(name.clone(), target.clone());
            }
        }
    }
    Ok(targets)
}
