//! Downloading a chart into its package's chart directory

use atlas_core::{RenderRequest, paths};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{RenderError, Result};
use crate::helm::ChartFetcher;

/// Fetch the release's chart and replace the package's chart directory
/// with it
///
/// The chart is unpacked into a scratch directory inside the package first,
/// so a failed download leaves the existing chart untouched. A chart marked
/// dirty is only replaced with `force`.
pub fn install_chart(
    request: &RenderRequest<'_>,
    fetcher: &dyn ChartFetcher,
    force: bool,
) -> Result<PathBuf> {
    let name = request.name();
    let chart = request.chart();
    if chart.is_empty() {
        return Err(RenderError::MissingChart {
            release: name.to_string(),
        });
    }

    let chart_path = request.chart_path()?;
    if request.release.dirty {
        if !force {
            return Err(RenderError::DirtyChart {
                release: name.to_string(),
                path: chart_path,
            });
        }
        warn!(path = %chart_path.display(), "chart is marked dirty, overwriting local changes");
    }

    if request.is_chart_overridden() || request.is_version_overridden() {
        info!(
            chart = %chart,
            version = %request.version(),
            "fetching a different chart than configured, update the config once it works"
        );
    }

    let pkg_path = paths::ensure_dirs(request.defaults, name)?;
    let scratch = tempfile::Builder::new()
        .prefix(".fetch-")
        .tempdir_in(&pkg_path)
        .map_err(RenderError::io(name, &pkg_path))?;

    fetcher
        .fetch(chart, &fetch_args(request, scratch.path()))
        .map_err(|e| e.for_release(name))?;

    let fetched = single_entry(name, scratch.path())?;
    if chart_path.exists() {
        fs::remove_dir_all(&chart_path).map_err(RenderError::io(name, &chart_path))?;
    }
    fs::rename(&fetched, &chart_path).map_err(RenderError::io(name, &chart_path))?;

    info!(path = %chart_path.display(), "chart installed");
    Ok(chart_path)
}

/// Arguments for `helm fetch`, minus the chart
pub fn fetch_args(request: &RenderRequest<'_>, untar_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();
    if !request.version().is_empty() {
        args.extend(["--version".to_string(), request.version().to_string()]);
    }
    if request.release.devel {
        args.push("--devel".to_string());
    }
    args.extend([
        "--untar".to_string(),
        "--untardir".to_string(),
        untar_dir.display().to_string(),
    ]);
    args
}

fn single_entry(release: &str, scratch: &Path) -> Result<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(scratch)
        .map_err(RenderError::io(release, scratch))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();

    if entries.len() != 1 {
        return Err(RenderError::InternalConsistency {
            release: release.to_string(),
            path: scratch.to_path_buf(),
            message: format!("expected exactly one fetched chart, found {}", entries.len()),
        });
    }
    Ok(entries.remove(0))
}
