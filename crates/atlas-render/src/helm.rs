//! Helm binary wrapper

use atlas_core::RepositorySpec;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::exec::{CommandOutput, CommandRunner, ExecError, ShellRunner, command_line};

/// Renders a chart directory into files under an output directory
///
/// `args` carries everything but the chart itself, including the
/// `--output-dir` to write into.
pub trait Templater {
    fn template(&self, chart_dir: &Path, args: &[String]) -> Result<CommandOutput, ExecError>;
}

/// Downloads a chart
///
/// `args` carries version selection and the `--untardir` to unpack into.
pub trait ChartFetcher {
    fn fetch(&self, chart: &str, args: &[String]) -> Result<CommandOutput, ExecError>;
}

/// The `helm` command line
#[derive(Debug, Clone)]
pub struct Helm<R = ShellRunner> {
    binary: String,
    runner: R,
}

impl Helm<ShellRunner> {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self::with_runner(binary, ShellRunner::new().with_timeout(timeout))
    }
}

impl<R: CommandRunner> Helm<R> {
    pub fn with_runner(binary: impl Into<String>, runner: R) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    /// `helm repo add <name> <url>` with optional TLS and basic auth
    pub fn add_repo(&self, repo: &RepositorySpec) -> Result<CommandOutput, ExecError> {
        let mut args = vec![
            "repo".to_string(),
            "add".to_string(),
            repo.name.clone(),
            repo.url.clone(),
        ];
        if let (Some(cert), Some(key)) = (&repo.cert_file, &repo.key_file) {
            args.extend(["--cert-file".to_string(), cert.clone()]);
            args.extend(["--key-file".to_string(), key.clone()]);
        }
        if let (Some(user), Some(pass)) = (&repo.username, &repo.password) {
            args.extend(["--username".to_string(), user.clone()]);
            args.extend(["--password".to_string(), pass.clone()]);
        }
        tracing::info!(repo = %repo.name, url = %repo.url, "adding repo");
        self.exec(args)
    }

    pub fn update_repo(&self) -> Result<CommandOutput, ExecError> {
        tracing::info!("updating repo");
        self.exec(vec!["repo".to_string(), "update".to_string()])
    }

    fn exec(&self, args: Vec<String>) -> Result<CommandOutput, ExecError> {
        tracing::debug!(command = %command_line(&self.binary, &args), "exec");
        self.runner.execute(&self.binary, &args, &HashMap::new())
    }
}

impl<R: CommandRunner> Templater for Helm<R> {
    fn template(&self, chart_dir: &Path, args: &[String]) -> Result<CommandOutput, ExecError> {
        let mut full = vec!["template".to_string(), chart_dir.display().to_string()];
        full.extend(args.iter().cloned());
        self.exec(full)
    }
}

impl<R: CommandRunner> ChartFetcher for Helm<R> {
    fn fetch(&self, chart: &str, args: &[String]) -> Result<CommandOutput, ExecError> {
        tracing::info!(chart = %chart, "fetching chart");
        let mut full = vec!["fetch".to_string(), chart.to_string()];
        full.extend(args.iter().cloned());
        self.exec(full)
    }
}
