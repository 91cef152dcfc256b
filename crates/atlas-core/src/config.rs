//! Cluster state configuration
//!
//! The cluster state lives in a single YAML file (`atlas.yaml` by default):
//!
//! ```yaml
//! defaults:
//!   sourcePath: ./apps
//!   releasePath: ./releases
//!   clusterName: amz1
//!
//! repositories:
//!   - name: istio.io
//!     url: https://storage.googleapis.com/istio-release/releases/1.1.7/charts
//!
//! releases:
//!   - name: istio
//!     namespace: istio-system
//!     chart: istio.io/istio
//!     version: 1.1.7
//!     manifests:
//!       - gateways
//!       - virtual-services
//!     values:
//!       - values-custom.yaml
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CoreError, Result};
use crate::paths;
use crate::registry::ReleaseRegistry;

pub const DEFAULT_CHART_DIR: &str = "chart";
pub const DEFAULT_MANIFESTS_DIR: &str = "manifests";
pub const DEFAULT_VALUES_DIR: &str = "values";
pub const DEFAULT_PATCHES_DIR: &str = "patches";
pub const DEFAULT_RELEASE_DIR: &str = "releases";
pub const DEFAULT_SOURCE_DIR: &str = ".";
pub const DEFAULT_KUBE_VERSION: &str = "1.14.1-0";
pub const DEFAULT_RELEASE_PATH_TEMPLATE: &str =
    "{ReleasesPath}/{ClusterName}/{ReleaseNamespace}/{ReleaseName}";
pub const DEFAULT_HELM_BINARY: &str = "helm";
pub const DEFAULT_KUSTOMIZE_BINARY: &str = "kustomize";
pub const DEFAULT_TEMPLATER_TIMEOUT: Duration = Duration::from_secs(600);

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "atlas.yaml";

/// Output topology of a rendered release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Every produced document concatenated into `<release>.yaml`
    #[default]
    Single,
    /// The produced file tree, preserved as-is
    Multi,
    /// Reserved
    Custom,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Single => "single",
            Self::Multi => "multi",
            Self::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RenderMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            "custom" => Ok(Self::Custom),
            other => Err(CoreError::invalid_config(format!(
                "unknown render mode '{}', expected one of: single, multi, custom",
                other
            ))),
        }
    }
}

/// What to do when a single file fails to copy during reassembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyPolicy {
    /// Record the failure and keep going
    #[default]
    BestEffort,
    /// Abort the release at the first failure
    FailFast,
}

/// Process-wide defaults
///
/// Every accessor falls back to a built-in constant when the field is unset
/// or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patches_path: Option<String>,

    /// Root of the package sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// Root of the rendered releases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_mode: Option<RenderMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_path_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm_binary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomize_binary: Option<String>,

    /// Upper bound for a single templater invocation (e.g. `5m`)
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub templater_timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_policy: Option<CopyPolicy>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl DefaultConfig {
    /// Cluster name, empty when unset
    pub fn cluster_name(&self) -> &str {
        non_empty(&self.cluster_name).unwrap_or_default()
    }

    pub fn chart_path(&self) -> &str {
        non_empty(&self.chart_path).unwrap_or(DEFAULT_CHART_DIR)
    }

    pub fn manifests_path(&self) -> &str {
        non_empty(&self.manifests_path).unwrap_or(DEFAULT_MANIFESTS_DIR)
    }

    pub fn values_path(&self) -> &str {
        non_empty(&self.values_path).unwrap_or(DEFAULT_VALUES_DIR)
    }

    pub fn patches_path(&self) -> &str {
        non_empty(&self.patches_path).unwrap_or(DEFAULT_PATCHES_DIR)
    }

    pub fn source_path(&self) -> &str {
        non_empty(&self.source_path).unwrap_or(DEFAULT_SOURCE_DIR)
    }

    pub fn release_path(&self) -> &str {
        non_empty(&self.release_path).unwrap_or(DEFAULT_RELEASE_DIR)
    }

    pub fn kube_version(&self) -> &str {
        non_empty(&self.kube_version).unwrap_or(DEFAULT_KUBE_VERSION)
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode.unwrap_or_default()
    }

    pub fn release_path_template(&self) -> &str {
        non_empty(&self.release_path_template).unwrap_or(DEFAULT_RELEASE_PATH_TEMPLATE)
    }

    pub fn helm_binary(&self) -> &str {
        non_empty(&self.helm_binary).unwrap_or(DEFAULT_HELM_BINARY)
    }

    pub fn kustomize_binary(&self) -> &str {
        non_empty(&self.kustomize_binary).unwrap_or(DEFAULT_KUSTOMIZE_BINARY)
    }

    pub fn templater_timeout(&self) -> Duration {
        self.templater_timeout.unwrap_or(DEFAULT_TEMPLATER_TIMEOUT)
    }

    pub fn copy_policy(&self) -> CopyPolicy {
        self.copy_policy.unwrap_or_default()
    }
}

/// A helm chart repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySpec {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A declared package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    /// Unique name of the release
    pub name: String,

    /// Chart reference, e.g. `stable/prometheus`
    #[serde(default)]
    pub chart: String,

    #[serde(default)]
    pub version: String,

    /// Use development versions too. Equivalent to version '>0.0.0-0'
    #[serde(default)]
    pub devel: bool,

    /// The chart directory carries local modifications and must not be re-fetched
    #[serde(default)]
    pub dirty: bool,

    #[serde(default)]
    pub namespace: String,

    /// Output path template for this release only
    #[serde(default, alias = "release_path", skip_serializing_if = "Option::is_none")]
    pub release_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_mode: Option<RenderMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,

    /// Whitelisted manifest entries; empty means all of them
    #[serde(default)]
    pub manifests: Vec<String>,

    /// Values files, relative to the values directory
    #[serde(default)]
    pub values: Vec<String>,
}

impl ReleaseSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn kube_version<'a>(&'a self, defaults: &'a DefaultConfig) -> &'a str {
        non_empty(&self.kube_version).unwrap_or_else(|| defaults.kube_version())
    }

    pub fn render_mode(&self, defaults: &DefaultConfig) -> RenderMode {
        self.render_mode.unwrap_or_else(|| defaults.render_mode())
    }

    pub fn release_path_template<'a>(&'a self, defaults: &'a DefaultConfig) -> &'a str {
        non_empty(&self.release_path).unwrap_or_else(|| defaults.release_path_template())
    }
}

/// The whole cluster state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(default)]
    pub defaults: DefaultConfig,

    #[serde(default)]
    pub repositories: Vec<RepositorySpec>,

    #[serde(default)]
    pub releases: ReleaseRegistry,
}

impl ClusterSpec {
    /// Parse and validate a cluster state document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(content)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load and validate the cluster state from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let spec = Self::from_yaml(&content)?;
        tracing::debug!(
            config = %path.display(),
            releases = spec.releases.len(),
            "config file loaded"
        );
        Ok(spec)
    }

    /// Write the cluster state to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for release in self.releases.all_releases() {
            if release.name.trim().is_empty() {
                return Err(CoreError::invalid_config("release with an empty name"));
            }
            paths::check_name(self.defaults.source_path(), &release.name)?;
            if !seen.insert(release.name.as_str()) {
                return Err(CoreError::invalid_config(format!(
                    "release '{}' is declared more than once",
                    release.name
                )));
            }
        }

        for repo in &self.repositories {
            if repo.name.is_empty() || repo.url.is_empty() {
                return Err(CoreError::invalid_config(format!(
                    "repository '{}' must have both a name and an url",
                    repo.name
                )));
            }
        }

        Ok(())
    }

    pub fn release_by_name(&self, name: &str) -> Result<ReleaseSpec> {
        self.releases.release_by_name(name)
    }

    /// Create the package directory tree for every release
    pub fn create_source_directories(&self) -> Result<()> {
        for release in self.releases.all_releases() {
            paths::ensure_dirs(&self.defaults, &release.name)?;
        }
        Ok(())
    }

    /// Create the releases root and the output directory of every release
    pub fn create_release_directories(&self) -> Result<Vec<PathBuf>> {
        paths::create_dir_all(Path::new(self.defaults.release_path()))?;
        let mut created = Vec::with_capacity(self.releases.len());
        for release in self.releases.all_releases() {
            let dst = paths::release_output_path(&self.defaults, release)?;
            paths::create_dir_all(&dst)?;
            created.push(dst);
        }
        Ok(created)
    }
}
