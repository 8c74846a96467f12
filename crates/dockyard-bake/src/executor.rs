//! Test execution.

use std::process::{Command, ExitStatus};

use dockyard_common::{DockyardError, DockyardResult};

use crate::invocation::TestInvocation;

/// Runs one target's test invocation and reports its exit code.
pub trait Executor {
    /// Execute `invocation` for `target_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be started at all.
    fn execute(&mut self, target_name: &str, invocation: &TestInvocation) -> DockyardResult<i32>;
}

/// Executes invocations through `sh -c`, inheriting stdio.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    /// Executor using `sh` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_shell("sh")
    }

    /// Executor using a specific shell.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }

    /// Run `command_line` and return its exit code unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Process`] if the shell cannot be spawned.
    pub fn run(&self, command_line: &str) -> DockyardResult<i32> {
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .status()
            .map_err(|e| DockyardError::Process {
                program: self.shell.clone(),
                message: e.to_string(),
            })?;
        Ok(exit_code(status))
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ShellExecutor {
    fn execute(&mut self, target_name: &str, invocation: &TestInvocation) -> DockyardResult<i32> {
        let command_line = invocation.command_line();
        tracing::info!(bake_target = %target_name, "Running tests for {}", target_name);
        tracing::info!("{}", command_line);

        let code = self.run(&command_line)?;
        if code != 0 {
            tracing::error!(
                bake_target = %target_name,
                code,
                "{} test failed with exit code {}",
                target_name,
                code
            );
        }
        Ok(code)
    }
}

/// Exit code, with signal deaths reported as `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
