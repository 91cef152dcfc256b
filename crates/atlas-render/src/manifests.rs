//! Merging a package's extra manifests into its release output

use atlas_core::fileutil::{self, copy_file, flatten_name};
use atlas_core::paths::{self, clean_path};
use atlas_core::{CopyFailure, CopyReport, DirNaming, RenderRequest};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

use crate::error::{RenderError, Result};

/// Copy whitelisted (or all) entries of the manifests directory into the
/// release output directory
///
/// Directories are flattened into `<entry>-<subdir>-<file>` names, single
/// files land as `manifest-<entry>`. Missing entries are skipped.
pub fn merge_manifests(request: &RenderRequest<'_>) -> Result<CopyReport> {
    let name = request.name();
    let manifests_dir = request.manifests_path()?;
    let policy = request.defaults.copy_policy();

    let entries = if request.release.manifests.is_empty() {
        match list_entries(&manifests_dir) {
            Ok(entries) => {
                if !entries.is_empty() {
                    info!("no whitelisted manifests, including all");
                }
                entries
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %manifests_dir.display(), "no manifests directory, nothing to merge");
                return Ok(CopyReport::default());
            }
            Err(e) => return Err(RenderError::io(name, &manifests_dir)(e)),
        }
    } else {
        request.release.manifests.clone()
    };

    let mut report = CopyReport::default();
    if entries.is_empty() {
        return Ok(report);
    }

    let output = request.output_path()?;
    paths::create_dir_all(&output)?;

    for entry in &entries {
        let cleaned = clean_path(entry);
        if cleaned == Path::new(".") {
            info!(manifest = %entry, "manifest entry names the manifests directory itself, skipping");
            continue;
        }
        let source = paths::secure_join(&manifests_dir, &cleaned)?;

        let meta = match fs::metadata(&source) {
            Ok(meta) => meta,
            Err(_) => {
                info!(manifest = %entry, path = %source.display(), "manifest does not exist, skipping");
                continue;
            }
        };

        let label = flatten_name(&cleaned);
        if meta.is_dir() {
            let copied = fileutil::copy_dir(&source, &output, DirNaming::Prefixed(&label), policy)
                .map_err(RenderError::copy(name))?;
            report.extend(copied);
        } else {
            let target = output.join(format!("manifest-{}", label));
            match copy_file(&source, &target) {
                Ok(()) => report.copied.push(target),
                Err(e) => report
                    .record(CopyFailure::new(&source, &target, e), policy)
                    .map_err(RenderError::copy(name))?,
            }
        }
    }

    info!(copied = report.copied.len(), "manifests merged");
    Ok(report)
}

fn list_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}
