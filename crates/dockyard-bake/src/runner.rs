//! Test orchestration across a bake group.

use std::path::PathBuf;

use dockyard_common::DockyardResult;

use crate::executor::Executor;
use crate::filter::SkipRules;
use crate::invocation::TestInvocation;
use crate::plan::BakePlan;
use crate::resolve::resolve_targets;

/// Settings for one test run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Bake definition, relative to `project_dir`.
    pub bake_file: PathBuf,
    /// Group (or single target) to test.
    pub target: String,
    /// Directory bake files and contexts are resolved against.
    pub project_dir: PathBuf,
    /// Docker CLI binary.
    pub docker: String,
    /// Patterns skipped in addition to the defaults.
    pub extra_skip: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            bake_file: PathBuf::from("docker-bake.hcl"),
            target: "default".to_string(),
            project_dir: PathBuf::from("."),
            docker: "docker".to_string(),
            extra_skip: Vec::new(),
        }
    }
}

/// Outcome of a test run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Targets whose tests were started, in run order.
    pub tested: Vec<String>,
    /// Targets excluded by a skip pattern.
    pub skipped: Vec<String>,
    /// Targets whose tests failed or could not run.
    pub failed: Vec<String>,
}

impl RunReport {
    /// Whether every tested target passed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit code: 0 if every target passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.success())
    }
}

/// Resolves a group, filters it, and runs each target's tests in order.
#[derive(Debug)]
pub struct TestRunner {
    config: RunnerConfig,
    rules: SkipRules,
}

impl TestRunner {
    /// Create a runner.
    ///
    /// # Errors
    ///
    /// Returns an error if an extra skip pattern is not a valid regex.
    pub fn new(config: RunnerConfig) -> DockyardResult<Self> {
        let rules = SkipRules::with_defaults(&config.extra_skip)?;
        Ok(Self { config, rules })
    }

    /// Generate the plan and run it.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan cannot be generated or the target group
    /// does not exist. Test failures are reported in the [`RunReport`].
    pub fn run(&self, executor: &mut dyn Executor) -> DockyardResult<RunReport> {
        let plan = BakePlan::generate(
            &self.config.docker,
            &self.config.project_dir,
            &self.config.bake_file,
            &self.config.target,
        )?;
        self.run_plan(&plan, executor)
    }

    /// Run the configured group of an already generated `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target group does not exist in `plan`.
    pub fn run_plan(&self, plan: &BakePlan, executor: &mut dyn Executor) -> DockyardResult<RunReport> {
        let targets = resolve_targets(plan, &self.config.target)?;
        tracing::info!(
            count = targets.len(),
            "Testing {} targets: {:?}",
            targets.len(),
            targets.keys().collect::<Vec<_>>()
        );

        let (kept, skipped) = self.rules.partition(targets);
        let mut report = RunReport {
            skipped,
            ..RunReport::default()
        };

        for (name, spec) in &kept {
            report.tested.push(name.clone());

            let invocation = match TestInvocation::build(
                &self.config.docker,
                &self.config.project_dir,
                name,
                spec,
            ) {
                Ok(invocation) => invocation,
                Err(e) => {
                    tracing::error!(bake_target = %name, error = %e, "Cannot build test command");
                    report.failed.push(name.clone());
                    continue;
                }
            };
            tracing::debug!(bake_target = %name, "{}", invocation.command_line());

            match executor.execute(name, &invocation) {
                Ok(0) => {}
                Ok(_) => report.failed.push(name.clone()),
                Err(e) => {
                    tracing::error!(bake_target = %name, error = %e, "Failed to start tests");
                    report.failed.push(name.clone());
                }
            }
        }

        tracing::info!("Skipped targets: {:?}", report.skipped);
        tracing::info!("Failed targets: {:?}", report.failed);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dockyard_common::DockyardError;

    use super::*;
    use crate::plan::{GroupSpec, TargetSpec};

    /// Records invocations and answers with canned exit codes.
    #[derive(Default)]
    struct FakeExecutor {
        codes: HashMap<String, i32>,
        calls: Vec<(String, TestInvocation)>,
    }

    impl FakeExecutor {
        fn failing(targets: &[&str]) -> Self {
            Self {
                codes: targets.iter().map(|t| ((*t).to_string(), 1)).collect(),
                calls: Vec::new(),
            }
        }
    }

    impl Executor for FakeExecutor {
        fn execute(&mut self, target_name: &str, invocation: &TestInvocation) -> DockyardResult<i32> {
            self.calls.push((target_name.to_string(), invocation.clone()));
            Ok(self.codes.get(target_name).copied().unwrap_or(0))
        }
    }

    fn plan(members: &[&str], targets: &[&str]) -> BakePlan {
        let mut plan = BakePlan::default();
        plan.group.insert(
            "default".to_string(),
            GroupSpec {
                targets: members.iter().map(ToString::to_string).collect(),
            },
        );
        for name in targets {
            plan.target.insert(
                (*name).to_string(),
                TargetSpec {
                    context: (*name).to_string(),
                    tags: vec![format!("rstudio/{}:test", name)],
                    ..TargetSpec::default()
                },
            );
        }
        plan
    }

    fn runner() -> TestRunner {
        TestRunner::new(RunnerConfig {
            project_dir: PathBuf::from("/repo"),
            ..RunnerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn two_of_five_failing_exits_one() {
        let plan = plan(
            &["r-session", "connect", "workbench"],
            &[
                "r-session-complete-jammy",
                "r-session-complete-focal",
                "connect-jammy",
                "workbench-jammy",
                "workbench-focal",
            ],
        );
        let mut executor = FakeExecutor::failing(&["connect-jammy", "workbench-focal"]);

        let report = runner().run_plan(&plan, &mut executor).unwrap();

        assert_eq!(report.tested.len(), 5);
        assert_eq!(report.failed, vec!["connect-jammy", "workbench-focal"]);
        assert_eq!(report.exit_code(), 1);
        assert!(!report.success());
    }

    #[test]
    fn all_passing_exits_zero() {
        let plan = plan(&["connect"], &["connect-jammy", "connect-focal"]);
        let mut executor = FakeExecutor::default();

        let report = runner().run_plan(&plan, &mut executor).unwrap();

        assert_eq!(report.exit_code(), 0);
        let order: Vec<&str> = executor.calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["connect-jammy", "connect-focal"]);
    }

    #[test]
    fn skipped_targets_are_not_executed() {
        let plan = plan(
            &["content", "workbench", "scan-workbench"],
            &["content-init", "workbench-jammy", "scan-workbench-for-microsoft-azure"],
        );
        let mut executor = FakeExecutor::default();

        let report = runner().run_plan(&plan, &mut executor).unwrap();

        assert_eq!(report.skipped, vec!["content-init", "scan-workbench-for-microsoft-azure"]);
        assert_eq!(report.tested, vec!["workbench-jammy"]);
        assert_eq!(executor.calls.len(), 1);
    }

    #[test]
    fn untagged_target_fails_without_running() {
        let mut plan = plan(&["connect"], &["connect-jammy"]);
        plan.target["connect-jammy"].tags.clear();
        let mut executor = FakeExecutor::default();

        let report = runner().run_plan(&plan, &mut executor).unwrap();

        assert_eq!(report.failed, vec!["connect-jammy"]);
        assert!(executor.calls.is_empty());
    }

    #[test]
    fn invocation_uses_project_dir() {
        let plan = plan(&["connect"], &["connect-jammy"]);
        let mut executor = FakeExecutor::default();

        runner().run_plan(&plan, &mut executor).unwrap();

        let (_, invocation) = &executor.calls[0];
        assert!(
            invocation
                .args()
                .iter()
                .any(|a| a == "--mount=type=bind,source=/repo/connect-jammy/test,destination=/test")
        );
    }

    #[test]
    fn unknown_group_is_fatal() {
        let plan = plan(&["connect"], &["connect-jammy"]);
        let runner = TestRunner::new(RunnerConfig {
            target: "release".to_string(),
            ..RunnerConfig::default()
        })
        .unwrap();

        let err = runner.run_plan(&plan, &mut FakeExecutor::default()).unwrap_err();
        assert!(matches!(err, DockyardError::UnknownGroup { .. }));
    }

    #[test]
    fn bad_extra_pattern_is_rejected() {
        let result = TestRunner::new(RunnerConfig {
            extra_skip: vec!["[".to_string()],
            ..RunnerConfig::default()
        });
        assert!(result.is_err());
    }
}
