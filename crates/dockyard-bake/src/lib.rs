//! # dockyard-bake
//!
//! Test runner for `docker buildx bake` artifacts.
//!
//! dockyard-bake provides:
//! - Bake plan loading via `docker buildx bake --print`
//! - Group expansion by target-name prefix
//! - Exclusion of untestable targets by pattern
//! - `docker run` invocations that execute each image's bundled tests

#![warn(missing_docs)]

pub mod cli;
pub mod executor;
pub mod filter;
pub mod invocation;
pub mod plan;
pub mod resolve;
pub mod runner;

pub use executor::{Executor, ShellExecutor};
pub use filter::SkipRules;
pub use invocation::TestInvocation;
pub use plan::{BakePlan, TargetSpec};
pub use runner::{RunReport, TestRunner};
