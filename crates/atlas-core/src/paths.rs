//! Canonical package and release paths
//!
//! Every path a release can refer to is a pure function of the defaults and
//! the release identity:
//!
//! ```text
//! <sourcePath>/<release>/{chart,manifests,values,patches}
//! <releasePath>/<clusterName>/<namespace>/<release>   (release path template)
//! ```
//!
//! Joins never leave their base directory. A name carrying `..` segments or an
//! absolute path is rejected with [`CoreError::PathEscape`] instead of being
//! clamped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};

use crate::config::{DefaultConfig, ReleaseSpec};
use crate::error::{CoreError, Result};

/// Matches `{Name}` as well as `{{ .Name }}` placeholders
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("placeholder regex is valid")
});

/// Lexically normalize a path: drop `.` segments, collapse separators and
/// resolve `..` against preceding segments. An empty result becomes `.`.
pub fn clean_path(path: impl AsRef<Path>) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Join `unsafe_path` onto `base`, failing if the result would leave `base`
///
/// Any `..` segment, absolute path or name that resolves to the base itself
/// is rejected, so two different names never share a directory. When both
/// ends exist on disk the check is repeated on the canonical paths so that a
/// symlink cannot be used to step outside either.
pub fn secure_join(base: impl AsRef<Path>, unsafe_path: impl AsRef<Path>) -> Result<PathBuf> {
    let base = base.as_ref();
    let requested = unsafe_path.as_ref();
    let escape = || CoreError::PathEscape {
        base: base.display().to_string(),
        path: requested.display().to_string(),
    };

    check_name(base, requested)?;

    let cleaned_base = clean_path(base);
    let mut joined = if cleaned_base == Path::new(".") {
        PathBuf::new()
    } else {
        cleaned_base
    };
    for component in requested.components() {
        if let Component::Normal(part) = component {
            joined.push(part);
        }
    }

    if let (Ok(real_base), Ok(real_joined)) = (base.canonicalize(), joined.canonicalize()) {
        if !real_joined.starts_with(&real_base) || real_joined == real_base {
            return Err(escape());
        }
    }

    Ok(joined)
}

/// Reject a relative name that would not land strictly below `base`
///
/// The name must be made of plain segments (`.` is ignored) and carry at
/// least one of them.
pub fn check_name(base: impl AsRef<Path>, name: impl AsRef<Path>) -> Result<()> {
    let name = name.as_ref();
    let mut plain = 0usize;
    let mut clean = true;
    for component in name.components() {
        match component {
            Component::Normal(_) => plain += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => clean = false,
        }
    }

    if !clean || plain == 0 {
        return Err(CoreError::PathEscape {
            base: base.as_ref().display().to_string(),
            path: name.display().to_string(),
        });
    }
    Ok(())
}

/// Root directory of a package: `<sourcePath>/<release>`
pub fn package_path(defaults: &DefaultConfig, release_name: &str) -> Result<PathBuf> {
    secure_join(defaults.source_path(), release_name)
}

pub fn chart_path(defaults: &DefaultConfig, release_name: &str) -> Result<PathBuf> {
    secure_join(package_path(defaults, release_name)?, defaults.chart_path())
}

pub fn manifests_path(defaults: &DefaultConfig, release_name: &str) -> Result<PathBuf> {
    secure_join(package_path(defaults, release_name)?, defaults.manifests_path())
}

pub fn values_path(defaults: &DefaultConfig, release_name: &str) -> Result<PathBuf> {
    secure_join(package_path(defaults, release_name)?, defaults.values_path())
}

pub fn patches_path(defaults: &DefaultConfig, release_name: &str) -> Result<PathBuf> {
    secure_join(package_path(defaults, release_name)?, defaults.patches_path())
}

/// Variables available to the release path template
#[derive(Debug, Clone, Default)]
pub struct ReleasePathVars<'a> {
    pub releases_path: &'a str,
    pub cluster_name: &'a str,
    pub release_namespace: &'a str,
    pub release_name: &'a str,
}

impl ReleasePathVars<'_> {
    fn lookup(&self, name: &str) -> &str {
        match name {
            "ReleasesPath" => self.releases_path,
            "ClusterName" => self.cluster_name,
            "ReleaseNamespace" => self.release_namespace,
            "ReleaseName" => self.release_name,
            _ => "",
        }
    }
}

/// Substitute placeholders in a release path template
///
/// Unknown or unset variables render as an empty string.
pub fn render_path_template(template: &str, vars: &ReleasePathVars<'_>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            vars.lookup(name).to_string()
        })
        .into_owned()
}

/// Output directory of a rendered release
pub fn release_output_path(defaults: &DefaultConfig, release: &ReleaseSpec) -> Result<PathBuf> {
    let releases_path = defaults.release_path();

    check_segment(releases_path, defaults.cluster_name())?;
    check_segment(releases_path, &release.namespace)?;
    check_name(releases_path, &release.name)?;

    let template = release.release_path_template(defaults);
    let vars = ReleasePathVars {
        releases_path,
        cluster_name: defaults.cluster_name(),
        release_namespace: &release.namespace,
        release_name: &release.name,
    };
    let path = clean_path(render_path_template(template, &vars));

    let root = clean_path(releases_path);
    let escapes = if template_uses(template, "ReleasesPath") {
        !is_strictly_within(&root, &path)
    } else {
        // literal destinations are allowed, but never one that holds the releases root
        is_ancestor_or_self(&path, &root)
    };
    if escapes {
        return Err(CoreError::PathEscape {
            base: releases_path.to_string(),
            path: path.display().to_string(),
        });
    }

    Ok(path)
}

/// Create the package root and its four standard subdirectories
///
/// Safe to call on an existing tree.
pub fn ensure_dirs(defaults: &DefaultConfig, release_name: &str) -> Result<PathBuf> {
    let pkg_path = package_path(defaults, release_name)?;
    create_dir_all(&pkg_path)?;
    for sub in [
        defaults.chart_path(),
        defaults.manifests_path(),
        defaults.patches_path(),
        defaults.values_path(),
    ] {
        let sub_path = secure_join(&pkg_path, sub)?;
        create_dir_all(&sub_path)?;
    }
    tracing::debug!(path = %pkg_path.display(), "package directories ready");
    Ok(pkg_path)
}

/// `create_dir_all` with `0755` permissions on unix
pub fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)?;
    Ok(())
}

/// Optional template segments: empty is fine, anything but plain names is not
fn check_segment(base: &str, segment: &str) -> Result<()> {
    let plain = Path::new(segment)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(CoreError::PathEscape {
            base: base.to_string(),
            path: segment.to_string(),
        });
    }
    Ok(())
}

fn template_uses(template: &str, variable: &str) -> bool {
    PLACEHOLDER.captures_iter(template).any(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .is_some_and(|m| m.as_str() == variable)
    })
}

fn is_strictly_within(root: &Path, path: &Path) -> bool {
    if root == Path::new(".") {
        return !path.is_absolute()
            && path
                .components()
                .next()
                .is_some_and(|c| matches!(c, Component::Normal(_)));
    }
    path != root && path.starts_with(root)
}

/// `.`, `/` and every directory above `path` count as ancestors
fn is_ancestor_or_self(candidate: &Path, path: &Path) -> bool {
    if !candidate
        .components()
        .any(|c| matches!(c, Component::Normal(_)))
    {
        return true;
    }
    candidate.is_absolute() == path.is_absolute() && path.starts_with(candidate)
}
