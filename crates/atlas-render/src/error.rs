//! Render error types

use atlas_core::{CopyFailure, CoreError};
use humantime_serde::re::humantime::format_duration;
use miette::Diagnostic;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum RenderError {
    #[error("release '{release}': `{command}` failed ({status}): {output}")]
    #[diagnostic(
        code(atlas::render::external_tool),
        help("run the command by hand to see the full output")
    )]
    ExternalTool {
        release: String,
        command: String,
        status: String,
        output: String,
    },

    #[error("release '{release}': `{command}` timed out after {}", format_duration(*.timeout))]
    #[diagnostic(
        code(atlas::render::timeout),
        help("raise defaults.templaterTimeout in the config")
    )]
    Timeout {
        release: String,
        command: String,
        timeout: Duration,
    },

    #[error("release '{release}': unexpected output at {}: {message}", .path.display())]
    #[diagnostic(code(atlas::render::internal_consistency))]
    InternalConsistency {
        release: String,
        path: PathBuf,
        message: String,
    },

    #[error("release '{release}': {feature} is not implemented")]
    #[diagnostic(code(atlas::render::not_implemented))]
    NotImplemented { release: String, feature: String },

    #[error("release '{release}': no chart reference configured")]
    #[diagnostic(
        code(atlas::render::missing_chart),
        help("set `chart` on the release or pass --chart")
    )]
    MissingChart { release: String },

    #[error("release '{release}': chart directory {} is marked dirty", .path.display())]
    #[diagnostic(
        code(atlas::render::dirty_chart),
        help("local changes would be overwritten; pass --force to fetch anyway")
    )]
    DirtyChart { release: String, path: PathBuf },

    #[error("release '{release}': {failure}")]
    #[diagnostic(code(atlas::render::copy))]
    Copy {
        release: String,
        failure: CopyFailure,
    },

    #[error("release '{release}': {}: {source}", .path.display())]
    #[diagnostic(code(atlas::render::io))]
    Io {
        release: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),
}

impl RenderError {
    /// Errors that stop every remaining release, not only the current one
    pub fn is_fatal_for_run(&self) -> bool {
        match self {
            Self::Core(e) => e.is_fatal_for_run(),
            _ => false,
        }
    }

    pub(crate) fn io(release: &str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let release = release.to_string();
        let path = path.into();
        move |source| Self::Io {
            release,
            path,
            source,
        }
    }

    pub(crate) fn copy(release: &str) -> impl FnOnce(CopyFailure) -> Self {
        let release = release.to_string();
        move |failure| Self::Copy { release, failure }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
