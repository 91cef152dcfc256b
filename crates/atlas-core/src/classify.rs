//! Chart directory classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const HELM_MARKER: &str = "Chart.yaml";
pub const KUSTOMIZE_MARKER: &str = "kustomization.yaml";

/// How a package's chart directory has to be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Helm,
    Kustomize,
    Raw,
    None,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Helm => "helm",
            Self::Kustomize => "kustomize",
            Self::Raw => "raw",
            Self::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Classify a chart directory by its direct entries
///
/// `Chart.yaml` wins over `kustomization.yaml`, which wins over plain `.yaml`
/// files. Unreadable or empty directories are `None`.
pub fn classify(chart_dir: &Path) -> ContentType {
    let entries = match std::fs::read_dir(chart_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %chart_dir.display(), error = %e, "chart directory is not readable");
            return ContentType::None;
        }
    };

    let files: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    if files.iter().any(|name| name == HELM_MARKER) {
        ContentType::Helm
    } else if files.iter().any(|name| name == KUSTOMIZE_MARKER) {
        ContentType::Kustomize
    } else if files.iter().any(|name| is_yaml(name)) {
        ContentType::Raw
    } else {
        ContentType::None
    }
}

/// Whether a file name carries the `.yaml` extension
pub fn is_yaml(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext == "yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for f in files {
            fs::write(dir.path().join(f), "kind: ConfigMap\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_helm_wins_over_kustomize() {
        let dir = dir_with(&["kustomization.yaml", "Chart.yaml", "values.yaml"]);
        assert_eq!(classify(dir.path()), ContentType::Helm);
    }

    #[test]
    fn test_kustomize() {
        let dir = dir_with(&["kustomization.yaml", "deployment.yaml"]);
        assert_eq!(classify(dir.path()), ContentType::Kustomize);
    }

    #[test]
    fn test_raw_yaml() {
        let dir = dir_with(&["deployment.yaml", "service.yaml"]);
        assert_eq!(classify(dir.path()), ContentType::Raw);
    }

    #[test]
    fn test_empty_is_none() {
        let dir = dir_with(&[]);
        assert_eq!(classify(dir.path()), ContentType::None);
    }

    #[test]
    fn test_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(classify(&dir.path().join("nope")), ContentType::None);
    }

    #[test]
    fn test_no_yaml_is_none() {
        let dir = dir_with(&["README.md", "deployment.yml"]);
        assert_eq!(classify(dir.path()), ContentType::None);
    }

    #[test]
    fn test_marker_directory_is_ignored() {
        let dir = dir_with(&["service.yaml"]);
        fs::create_dir(dir.path().join("Chart.yaml")).unwrap();
        assert_eq!(classify(dir.path()), ContentType::Raw);
    }

    #[test]
    fn test_display() {
        assert_eq!(ContentType::Kustomize.to_string(), "kustomize");
    }
}
