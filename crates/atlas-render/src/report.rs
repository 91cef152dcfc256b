//! Per-run rendering results

use atlas_core::{ContentType, CopyFailure, CopyReport, RenderMode};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::RenderError;

/// What happened when rendering one release
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReleaseOutcome {
    Rendered {
        content: ContentType,
        mode: RenderMode,
        output: PathBuf,
        files: usize,
        /// Files that could not be reassembled
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failures: Vec<CopyFailure>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

impl ReleaseOutcome {
    pub(crate) fn rendered(
        content: ContentType,
        mode: RenderMode,
        output: PathBuf,
        copy: CopyReport,
    ) -> Self {
        Self::Rendered {
            content,
            mode,
            output,
            files: copy.copied.len(),
            failures: copy.failures,
        }
    }

    pub(crate) fn failed(error: &RenderError) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Rendered, but some files did not make it into the output
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Rendered { failures, .. } if !failures.is_empty())
    }
}

/// What happened when merging a release's extra manifests
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ManifestOutcome {
    Merged {
        files: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failures: Vec<CopyFailure>,
    },
    Failed {
        error: String,
    },
}

impl ManifestOutcome {
    pub(crate) fn merged(copy: CopyReport) -> Self {
        Self::Merged {
            files: copy.copied.len(),
            failures: copy.failures,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Merged { failures, .. } if !failures.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    pub name: String,
    pub render: ReleaseOutcome,
    pub manifests: ManifestOutcome,
    /// Some files were left out of the output
    pub incomplete: bool,
}

impl ReleaseReport {
    pub fn new(name: impl Into<String>, render: ReleaseOutcome, manifests: ManifestOutcome) -> Self {
        let incomplete = render.is_incomplete() || manifests.is_incomplete();
        Self {
            name: name.into(),
            render,
            manifests,
            incomplete,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.render.is_failed() || self.manifests.is_failed()
    }
}

/// Results of a render run, in release order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    pub releases: Vec<ReleaseReport>,
}

impl RenderReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: ReleaseReport) {
        self.releases.push(report);
    }

    pub fn rendered(&self) -> usize {
        self.releases
            .iter()
            .filter(|r| r.render.is_rendered() && !r.is_failed())
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.releases
            .iter()
            .filter(|r| matches!(r.render, ReleaseOutcome::Skipped { .. }) && !r.is_failed())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.releases.iter().filter(|r| r.is_failed()).count()
    }

    pub fn incomplete(&self) -> usize {
        self.releases.iter().filter(|r| r.incomplete).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// "3 rendered, 1 skipped, 0 failed"
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} rendered, {} skipped, {} failed",
            self.rendered(),
            self.skipped(),
            self.failed()
        );
        let incomplete = self.incomplete();
        if incomplete > 0 {
            summary.push_str(&format!(", {} incomplete", incomplete));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn rendered(failures: usize) -> ReleaseOutcome {
        ReleaseOutcome::Rendered {
            content: ContentType::Helm,
            mode: RenderMode::Single,
            output: PathBuf::from("releases/app"),
            files: 2,
            failures: (0..failures)
                .map(|_| CopyFailure::new(Path::new("a"), Path::new("b"), "denied"))
                .collect(),
        }
    }

    fn merged() -> ManifestOutcome {
        ManifestOutcome::Merged {
            files: 0,
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_summary() {
        let mut report = RenderReport::new();
        report.push(ReleaseReport::new("a", rendered(0), merged()));
        report.push(ReleaseReport::new("b", rendered(1), merged()));
        report.push(ReleaseReport::new(
            "c",
            ReleaseOutcome::Skipped {
                reason: "empty".to_string(),
            },
            merged(),
        ));
        report.push(ReleaseReport::new(
            "d",
            ReleaseOutcome::Failed {
                error: "boom".to_string(),
            },
            merged(),
        ));

        assert_eq!(report.summary(), "2 rendered, 1 skipped, 1 failed, 1 incomplete");
        assert!(report.has_failures());
    }

    #[test]
    fn test_manifest_failure_fails_release() {
        let release = ReleaseReport::new(
            "a",
            rendered(0),
            ManifestOutcome::Failed {
                error: "escape".to_string(),
            },
        );
        assert!(release.is_failed());

        let mut report = RenderReport::new();
        report.push(release);
        assert_eq!(report.summary(), "0 rendered, 0 skipped, 1 failed");
    }

    #[test]
    fn test_json_shape() {
        let release = ReleaseReport::new("grafana", rendered(0), merged());
        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(json["name"], "grafana");
        assert_eq!(json["render"]["status"], "rendered");
        assert_eq!(json["render"]["content"], "helm");
        assert_eq!(json["render"]["mode"], "single");
        assert_eq!(json["manifests"]["status"], "merged");
        assert_eq!(json["incomplete"], false);
        assert!(json["render"].get("failures").is_none());
    }
}
