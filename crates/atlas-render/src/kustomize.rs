//! Kustomize binary wrapper

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::exec::{CommandOutput, CommandRunner, ExecError, ShellRunner, command_line};

/// Builds a kustomization directory
pub trait Kustomizer {
    /// Build `dir`. With `output` set the result is written there as
    /// separate files, otherwise it comes back on stdout.
    fn build(&self, dir: &Path, output: Option<&Path>) -> Result<CommandOutput, ExecError>;
}

#[derive(Debug, Clone)]
pub struct Kustomize<R = ShellRunner> {
    binary: String,
    runner: R,
}

impl Kustomize<ShellRunner> {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self::with_runner(binary, ShellRunner::new().with_timeout(timeout))
    }
}

impl<R: CommandRunner> Kustomize<R> {
    pub fn with_runner(binary: impl Into<String>, runner: R) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }
}

impl<R: CommandRunner> Kustomizer for Kustomize<R> {
    fn build(&self, dir: &Path, output: Option<&Path>) -> Result<CommandOutput, ExecError> {
        let mut args = vec!["build".to_string(), dir.display().to_string()];
        if let Some(output) = output {
            args.extend(["--output".to_string(), output.display().to_string()]);
        }
        tracing::debug!(command = %command_line(&self.binary, &args), "exec");
        self.runner.execute(&self.binary, &args, &HashMap::new())
    }
}
