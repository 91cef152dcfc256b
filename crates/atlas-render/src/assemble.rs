//! Reassembling a produced file tree into the release output directory

use atlas_core::classify::is_yaml;
use atlas_core::fileutil::{self, copy_file};
use atlas_core::{CopyFailure, CopyPolicy, CopyReport, CoreError, DirNaming};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Concatenate every file under `root`, depth-first in file-name order,
/// with a newline after each one
pub fn concat_tree(
    root: &Path,
    policy: CopyPolicy,
) -> Result<(Vec<u8>, CopyReport), CopyFailure> {
    let mut buf = Vec::new();
    let mut report = CopyReport::default();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                report.record(CopyFailure::new(&path, root, e), policy)?;
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        match fs::read(entry.path()) {
            Ok(content) => {
                buf.extend_from_slice(&content);
                buf.push(b'\n');
                report.copied.push(entry.path().to_path_buf());
            }
            Err(e) => report.record(CopyFailure::new(entry.path(), root, e), policy)?,
        }
    }

    Ok((buf, report))
}

/// Mirror `root` into `output`
pub fn copy_tree(
    root: &Path,
    output: &Path,
    policy: CopyPolicy,
) -> Result<CopyReport, CopyFailure> {
    fileutil::copy_dir(root, output, DirNaming::Preserve, policy)
}

/// Copy only the `.yaml` files of `src` into `dst`, keeping their layout
pub fn stage_yaml(src: &Path, dst: &Path, policy: CopyPolicy) -> Result<CopyReport, CopyFailure> {
    let mut report = CopyReport::default();

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(src).to_path_buf();
                report.record(CopyFailure::new(&path, dst, e), policy)?;
                continue;
            }
        };
        if entry.file_type().is_dir() || !is_yaml(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        let copied = match target.parent() {
            Some(parent) => fs::create_dir_all(parent).map_err(CoreError::from),
            None => Ok(()),
        }
        .and_then(|_| copy_file(entry.path(), &target));
        match copied {
            Ok(()) => report.copied.push(target),
            Err(e) => report.record(CopyFailure::new(entry.path(), &target, e), policy)?,
        }
    }

    Ok(report)
}
