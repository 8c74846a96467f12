//! `docker run` invocations for image tests.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use dockyard_common::{DockyardError, DockyardResult};

use crate::plan::TargetSpec;

/// Where the target's `test/` directory is mounted inside the container.
pub const TEST_MOUNT_POINT: &str = "/test";

/// Script run inside the container.
pub const TEST_ENTRYPOINT: &str = "/test/run_tests.sh";

const DOCKER_SOCKET: &str = "/var/run/docker.sock";

// Workstation images run docker themselves and need their build deps
const WORKSTATION_FAMILY: &str = "workbench-for-google-cloud-workstation";

/// A fully specified test container run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    program: String,
    args: Vec<String>,
}

impl TestInvocation {
    /// Build the test run for `target_name`.
    ///
    /// The target's context is resolved against `project_dir`; its `test/`
    /// directory is bind-mounted at [`TEST_MOUNT_POINT`], every build arg is
    /// passed as an environment variable, and the first tag is the image run.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Config`] if the target declares no tags.
    pub fn build(docker: &str, project_dir: &Path, target_name: &str, spec: &TargetSpec) -> DockyardResult<Self> {
        let image = spec.image().ok_or_else(|| DockyardError::Config {
            message: format!("Target {} has no tags to test", target_name),
        })?;

        let context = project_dir.join(&spec.context);
        let test_path = context.join("test");

        let mut args: Vec<String> = [
            "run",
            "-t",
            "--init",
            "--rm",
            "--entrypoint=",
            "--privileged",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        args.push(bind_mount(&test_path, TEST_MOUNT_POINT));
        args.extend(custom_options(target_name, &context));
        for (name, value) in &spec.args {
            args.push("--env".to_string());
            args.push(format!("{}={}", name, value));
        }
        args.push(image.to_string());
        args.push(TEST_ENTRYPOINT.to_string());

        Ok(Self {
            program: docker.to_string(),
            args,
        })
    }

    /// Program to run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, unquoted.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render as a single `sh` command line.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|arg| shell_escape::unix::escape(Cow::Borrowed(arg.as_str())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn bind_mount(source: &Path, destination: &str) -> String {
    format!(
        "--mount=type=bind,source={},destination={}",
        source.display(),
        destination
    )
}

/// Extra options some target families need.
fn custom_options(target_name: &str, context: &Path) -> Vec<String> {
    let mut opts = Vec::new();
    if target_name.contains(WORKSTATION_FAMILY) {
        let deps_path: PathBuf = context.join("deps");
        opts.push(bind_mount(Path::new(DOCKER_SOCKET), DOCKER_SOCKET));
        opts.push(bind_mount(&deps_path, "/tmp/deps"));
    }
    opts
}
