//! External process execution

use humantime_serde::re::humantime::format_duration;
use std::collections::HashMap;
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

use crate::error::RenderError;

/// Captured output of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Failure to run an external command
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },

    #[error("`{command}` timed out after {}", format_duration(*.timeout))]
    Timeout { command: String, timeout: Duration },

    #[error("failed waiting for `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// Attach the release this command was run for
    pub fn for_release(self, release: &str) -> RenderError {
        let release = release.to_string();
        match self {
            Self::Spawn { command, source } => RenderError::ExternalTool {
                release,
                command,
                status: "not started".to_string(),
                output: source.to_string(),
            },
            Self::Failed {
                command,
                status,
                output,
            } => RenderError::ExternalTool {
                release,
                command,
                status,
                output,
            },
            Self::Timeout { command, timeout } => RenderError::Timeout {
                release,
                command,
                timeout,
            },
            Self::Io { command, source } => RenderError::ExternalTool {
                release,
                command,
                status: "unknown".to_string(),
                output: source.to_string(),
            },
        }
    }
}

/// Runs external commands
///
/// Implementations other than [`ShellRunner`] exist for tests.
pub trait CommandRunner {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<CommandOutput, ExecError>;
}

/// Runs commands as child processes, capturing stdout and stderr
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    /// Kill the child after this long
    pub timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl CommandRunner for ShellRunner {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<CommandOutput, ExecError> {
        let command = command_line(program, args);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            command: command.clone(),
            source,
        })?;

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = std::thread::spawn(move || read_pipe(stdout));
        let stderr_reader = std::thread::spawn(move || read_pipe(stderr));

        let waited = match self.timeout {
            Some(timeout) => child.wait_timeout(timeout),
            None => child.wait().map(Some),
        };
        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExecError::Timeout {
                    command,
                    timeout: self.timeout.unwrap_or_default(),
                });
            }
            Err(source) => return Err(ExecError::Io { command, source }),
        };

        let output = CommandOutput {
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
        };

        if status.success() {
            Ok(output)
        } else {
            Err(ExecError::Failed {
                command,
                status: describe_status(status),
                output: failure_output(&output),
            })
        }
    }
}

fn read_pipe(pipe: Option<impl Read>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => "signal".to_string(),
    }
}

/// stderr, falling back to stdout, trimmed
fn failure_output(output: &CommandOutput) -> String {
    let stderr = output.stderr_lossy();
    if stderr.trim().is_empty() {
        output.stdout_lossy().trim().to_string()
    } else {
        stderr.trim().to_string()
    }
}

/// Flags whose value never shows up in logs or errors
const SECRET_FLAGS: &[&str] = &["--password"];

/// Printable form of a command, with secret flag values masked
pub(crate) fn command_line(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("***".to_string());
            mask_next = false;
            continue;
        }
        match arg.split_once('=') {
            Some((flag, _)) if SECRET_FLAGS.contains(&flag) => parts.push(format!("{flag}=***")),
            _ => {
                mask_next = SECRET_FLAGS.contains(&arg.as_str());
                parts.push(arg.clone());
            }
        }
    }
    parts.join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_captures_stdout() {
        let output = ShellRunner::new()
            .execute("sh", &sh("echo hello"), &HashMap::new())
            .unwrap();
        assert_eq!(output.stdout_lossy().trim(), "hello");
    }

    #[test]
    fn test_passes_env() {
        let mut env = HashMap::new();
        env.insert("ATLAS_TEST_VALUE".to_string(), "42".to_string());
        let output = ShellRunner::new()
            .execute("sh", &sh("echo $ATLAS_TEST_VALUE"), &env)
            .unwrap();
        assert_eq!(output.stdout_lossy().trim(), "42");
    }

    #[test]
    fn test_non_zero_exit() {
        let err = ShellRunner::new()
            .execute("sh", &sh("echo broken chart >&2; exit 3"), &HashMap::new())
            .unwrap_err();
        match err {
            ExecError::Failed { status, output, .. } => {
                assert_eq!(status, "exit status 3");
                assert_eq!(output, "broken chart");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_binary() {
        let err = ShellRunner::new()
            .execute("atlas-definitely-not-a-binary", &[], &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn test_timeout() {
        let err = ShellRunner::new()
            .with_timeout(Duration::from_millis(100))
            .execute("sh", &sh("sleep 5"), &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(err.to_string().ends_with("timed out after 100ms"), "{err}");
    }

    #[test]
    fn test_failure_masks_password() {
        let args: Vec<String> = ["-c", "exit 1", "--password", "hunter2", "--password=hunter3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = ShellRunner::new()
            .execute("sh", &args, &HashMap::new())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--password *** --password=***"), "{message}");
        assert!(!message.contains("hunter"), "{message}");
    }

    #[test]
    fn test_for_release() {
        let err = ExecError::Failed {
            command: "helm template".to_string(),
            status: "exit status 1".to_string(),
            output: "Error: chart not found".to_string(),
        }
        .for_release("istio");
        let message = err.to_string();
        assert!(message.contains("istio"));
        assert!(message.contains("chart not found"));
    }
}
