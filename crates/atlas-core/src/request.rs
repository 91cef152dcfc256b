//! Per-invocation render and fetch requests

use std::path::PathBuf;

use crate::config::{DefaultConfig, ReleaseSpec, RenderMode};
use crate::error::Result;
use crate::paths;

/// An immutable description of one operation on one release
///
/// Chart and version substitutions live on the request, never on the
/// registry's copy of the release.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub defaults: &'a DefaultConfig,
    pub release: ReleaseSpec,
    chart_override: Option<String>,
    version_override: Option<String>,
}

impl<'a> RenderRequest<'a> {
    pub fn new(defaults: &'a DefaultConfig, release: ReleaseSpec) -> Self {
        Self {
            defaults,
            release,
            chart_override: None,
            version_override: None,
        }
    }

    /// Substitute the chart reference; empty values are ignored
    pub fn with_chart(mut self, chart: Option<impl Into<String>>) -> Self {
        self.chart_override = chart.map(Into::into).filter(|c: &String| !c.is_empty());
        self
    }

    /// Substitute the chart version; empty values are ignored
    pub fn with_version(mut self, version: Option<impl Into<String>>) -> Self {
        self.version_override = version.map(Into::into).filter(|v: &String| !v.is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.release.name
    }

    pub fn chart(&self) -> &str {
        self.chart_override.as_deref().unwrap_or(&self.release.chart)
    }

    pub fn version(&self) -> &str {
        self.version_override
            .as_deref()
            .unwrap_or(&self.release.version)
    }

    pub fn is_chart_overridden(&self) -> bool {
        self.chart_override
            .as_deref()
            .is_some_and(|c| c != self.release.chart)
    }

    pub fn is_version_overridden(&self) -> bool {
        self.version_override
            .as_deref()
            .is_some_and(|v| v != self.release.version)
    }

    pub fn render_mode(&self) -> RenderMode {
        self.release.render_mode(self.defaults)
    }

    pub fn kube_version(&self) -> &str {
        self.release.kube_version(self.defaults)
    }

    pub fn chart_path(&self) -> Result<PathBuf> {
        paths::chart_path(self.defaults, &self.release.name)
    }

    pub fn manifests_path(&self) -> Result<PathBuf> {
        paths::manifests_path(self.defaults, &self.release.name)
    }

    pub fn values_path(&self) -> Result<PathBuf> {
        paths::values_path(self.defaults, &self.release.name)
    }

    pub fn output_path(&self) -> Result<PathBuf> {
        paths::release_output_path(self.defaults, &self.release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ReleaseRegistry;

    fn registry() -> ReleaseRegistry {
        ReleaseRegistry::new(vec![ReleaseSpec {
            chart: "stable/prometheus".to_string(),
            version: "8.11.4".to_string(),
            ..ReleaseSpec::new("prometheus")
        }])
    }

    #[test]
    fn test_overrides_do_not_leak() {
        let defaults = DefaultConfig::default();
        let registry = registry();

        let request = RenderRequest::new(&defaults, registry.release_by_name("prometheus").unwrap())
            .with_chart(Some("stable/prometheus-operator"))
            .with_version(Some("5.0.0"));
        assert_eq!(request.chart(), "stable/prometheus-operator");
        assert_eq!(request.version(), "5.0.0");
        assert!(request.is_chart_overridden());

        let plain = RenderRequest::new(&defaults, registry.release_by_name("prometheus").unwrap());
        assert_eq!(plain.chart(), "stable/prometheus");
        assert_eq!(plain.version(), "8.11.4");
        assert!(!plain.is_version_overridden());
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let defaults = DefaultConfig::default();
        let request = RenderRequest::new(&defaults, registry().release_by_name("prometheus").unwrap())
            .with_chart(Some(""))
            .with_version(None::<String>);
        assert_eq!(request.chart(), "stable/prometheus");
        assert_eq!(request.version(), "8.11.4");
    }

    #[test]
    fn test_resolved_paths() {
        let defaults = DefaultConfig {
            source_path: Some("apps".to_string()),
            ..Default::default()
        };
        let request = RenderRequest::new(&defaults, ReleaseSpec::new("grafana"));
        assert_eq!(request.chart_path().unwrap(), PathBuf::from("apps/grafana/chart"));
        assert_eq!(request.output_path().unwrap(), PathBuf::from("releases/grafana"));
    }
}
