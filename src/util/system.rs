//! The process boundary to the shadow-utils tools.
//!
//! Stores never call `Command` directly; they go through [`ToolRunner`] so
//! tests can substitute a recording stub and prove that validation and
//! idempotence short-circuits happen before any process is spawned.

use crate::error::{Error, Result};
use crate::util::privilege;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Launches the external account management tools.
pub trait ToolRunner: Send + Sync {
    /// Whether mutating tools can be invoked at all. Defaults to the
    /// effective UID being 0.
    fn is_privileged(&self) -> bool {
        privilege::is_root()
    }

    /// Run a tool to completion, failing on non-zero exit.
    fn run(&self, program: &'static str, args: &[String]) -> Result<()>;

    /// Run a tool with `input` streamed over its stdin.
    fn run_with_stdin(&self, program: &'static str, args: &[String], input: &str) -> Result<()>;
}

/// Runs the real tools on the host system.
pub struct HostTools;

impl ToolRunner for HostTools {
    fn run(&self, program: &'static str, args: &[String]) -> Result<()> {
        debug!(program, ?args, "running external tool");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Error::Spawn { program, source })?;
        check_status(program, &output)
    }

    fn run_with_stdin(&self, program: &'static str, args: &[String], input: &str) -> Result<()> {
        debug!(program, ?args, "running external tool with stdin");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn { program, source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|source| Error::Spawn { program, source })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| Error::Spawn { program, source })?;
        check_status(program, &output)
    }
}

fn check_status(program: &'static str, output: &std::process::Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(Error::CommandFailed {
        program,
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// One recorded tool invocation: program, args, stdin payload.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Invocation {
        pub program: &'static str,
        pub args: Vec<String>,
        pub stdin: Option<String>,
    }

    /// Records invocations instead of spawning anything.
    pub(crate) struct RecordingTools {
        pub privileged: bool,
        pub fail_program: Option<&'static str>,
        pub calls: Mutex<Vec<Invocation>>,
    }

    impl RecordingTools {
        pub(crate) fn privileged() -> Self {
            Self {
                privileged: true,
                fail_program: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn unprivileged() -> Self {
            Self {
                privileged: false,
                fail_program: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing_on(program: &'static str) -> Self {
            Self {
                fail_program: Some(program),
                ..Self::privileged()
            }
        }

        pub(crate) fn invocations(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            program: &'static str,
            args: &[String],
            stdin: Option<&str>,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(Invocation {
                program,
                args: args.to_vec(),
                stdin: stdin.map(str::to_string),
            });
            if self.fail_program == Some(program) {
                return Err(Error::CommandFailed {
                    program,
                    code: Some(1),
                    stderr: "simulated failure".into(),
                });
            }
            Ok(())
        }
    }

    impl ToolRunner for RecordingTools {
        fn is_privileged(&self) -> bool {
            self.privileged
        }

        fn run(&self, program: &'static str, args: &[String]) -> Result<()> {
            self.record(program, args, None)
        }

        fn run_with_stdin(
            &self,
            program: &'static str,
            args: &[String],
            input: &str,
        ) -> Result<()> {
            self.record(program, args, Some(input))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_run_success() {
        HostTools.run("true", &[]).unwrap();
    }

    #[test]
    fn test_host_run_nonzero_exit() {
        let err = HostTools.run("false", &[]).unwrap_err();
        match err {
            Error::CommandFailed { program, code, .. } => {
                assert_eq!(program, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_host_run_missing_program() {
        let err = HostTools
            .run("definitely-not-a-real-tool", &[])
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[test]
    fn test_host_run_with_stdin() {
        HostTools
            .run_with_stdin("cat", &[], "hello\n")
            .unwrap();
    }
}
