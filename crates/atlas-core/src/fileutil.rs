//! File and directory copying

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::CopyPolicy;
use crate::error::Result;

/// A single file that could not be copied
#[derive(Error, Debug, Clone, Serialize)]
#[error("failed to copy {} to {}: {message}", .source_path.display(), .destination.display())]
pub struct CopyFailure {
    pub source_path: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

impl CopyFailure {
    pub fn new(source: &Path, destination: &Path, message: impl ToString) -> Self {
        Self {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// What a directory copy did
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyReport {
    pub copied: Vec<PathBuf>,
    pub failures: Vec<CopyFailure>,
}

impl CopyReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn extend(&mut self, other: CopyReport) {
        self.copied.extend(other.copied);
        self.failures.extend(other.failures);
    }

    /// Record a failure, or hand it back when the policy says to stop
    pub fn record(
        &mut self,
        failure: CopyFailure,
        policy: CopyPolicy,
    ) -> std::result::Result<(), CopyFailure> {
        match policy {
            CopyPolicy::FailFast => Err(failure),
            CopyPolicy::BestEffort => {
                tracing::warn!(
                    source = %failure.source_path.display(),
                    destination = %failure.destination.display(),
                    error = %failure.message,
                    "copy failed, continuing"
                );
                self.failures.push(failure);
                Ok(())
            }
        }
    }
}

/// How files of a copied directory are named at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirNaming<'a> {
    /// Mirror the source tree
    Preserve,
    /// Flatten into the destination, naming each file
    /// `<prefix>-<subdir>-...-<file>`
    Prefixed(&'a str),
}

/// Copy a regular file, keeping its permission bits
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src)?;
    if !meta.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unable to copy non-regular file {}", src.display()),
        )
        .into());
    }

    if let Ok(dst_meta) = fs::metadata(dst) {
        if !dst_meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unable to copy to non-regular file {}", dst.display()),
            )
            .into());
        }
        if same_file(src, dst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unable to copy {} onto itself", src.display()),
            )
            .into());
        }
    }

    // fs::copy carries the permission bits over
    fs::copy(src, dst)?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy the contents of `src` into `dst`
///
/// Entries are visited in file-name order. Per-file failures are handled
/// according to `policy`; the destination root itself must be creatable.
pub fn copy_dir(
    src: &Path,
    dst: &Path,
    naming: DirNaming<'_>,
    policy: CopyPolicy,
) -> std::result::Result<CopyReport, CopyFailure> {
    let mut report = CopyReport::default();

    if !src.is_dir() {
        return Err(CopyFailure::new(src, dst, "source is not a directory"));
    }
    fs::create_dir_all(dst).map_err(|e| CopyFailure::new(src, dst, e))?;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(src).to_path_buf();
                report.record(CopyFailure::new(&path, dst, e), policy)?;
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(e) => {
                report.record(CopyFailure::new(entry.path(), dst, e), policy)?;
                continue;
            }
        };

        match naming {
            DirNaming::Preserve => {
                let target = dst.join(relative);
                if entry.file_type().is_dir() {
                    if let Err(e) = fs::create_dir_all(&target) {
                        report.record(CopyFailure::new(entry.path(), &target, e), policy)?;
                    }
                } else if let Err(e) = copy_file(entry.path(), &target) {
                    report.record(CopyFailure::new(entry.path(), &target, e), policy)?;
                } else {
                    report.copied.push(target);
                }
            }
            DirNaming::Prefixed(prefix) => {
                if entry.file_type().is_dir() {
                    continue;
                }
                let target = dst.join(prefixed_name(prefix, relative));
                if let Err(e) = copy_file(entry.path(), &target) {
                    report.record(CopyFailure::new(entry.path(), &target, e), policy)?;
                } else {
                    report.copied.push(target);
                }
            }
        }
    }

    Ok(report)
}

/// `a` + `sub/x.yaml` -> `a-sub-x.yaml`
pub fn prefixed_name(prefix: &str, relative: &Path) -> String {
    let mut name = flatten_name(Path::new(prefix));
    for component in relative.components() {
        name.push('-');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

/// Join the components of a relative path with `-`
pub fn flatten_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("-")
}
