//! Config file loading and command line overrides

use atlas_core::{ClusterSpec, CopyPolicy, DEFAULT_CONFIG_FILE, DefaultConfig};
use clap::Args;
use std::path::PathBuf;

/// Flags shared by every subcommand
///
/// Each one overrides the matching `defaults` key of the config file.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file
    #[arg(long, global = true, env = "ATLAS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding the packages
    #[arg(long, global = true, env = "ATLAS_SOURCE_PATH")]
    pub source_path: Option<String>,

    /// Directory the rendered releases are written to
    #[arg(long, global = true, env = "ATLAS_RELEASE_PATH")]
    pub release_path: Option<String>,

    /// Cluster name used in release paths
    #[arg(long = "cluster", global = true, env = "ATLAS_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// Helm binary to run
    #[arg(long, global = true, env = "ATLAS_HELM_BINARY")]
    pub helm_binary: Option<String>,

    /// Kustomize binary to run
    #[arg(long, global = true, env = "ATLAS_KUSTOMIZE_BINARY")]
    pub kustomize_binary: Option<String>,

    /// Abort a release at the first file that fails to copy
    #[arg(long, global = true)]
    pub fail_fast: bool,
}

impl GlobalArgs {
    /// Load the config file and apply the overrides on top
    pub fn load(&self) -> atlas_core::Result<ClusterSpec> {
        let mut spec = ClusterSpec::load_from(&self.config)?;
        self.apply(&mut spec.defaults);
        Ok(spec)
    }

    pub fn apply(&self, defaults: &mut DefaultConfig) {
        override_with(&mut defaults.source_path, &self.source_path);
        override_with(&mut defaults.release_path, &self.release_path);
        override_with(&mut defaults.cluster_name, &self.cluster_name);
        override_with(&mut defaults.helm_binary, &self.helm_binary);
        override_with(&mut defaults.kustomize_binary, &self.kustomize_binary);
        if self.fail_fast {
            defaults.copy_policy = Some(CopyPolicy::FailFast);
        }
    }
}

fn override_with(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
        *target = Some(value.clone());
    }
}
