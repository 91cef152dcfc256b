//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use atlas_core::CoreError;
use atlas_render::RenderError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    /// Some releases failed; details were already logged
    #[error("{summary}")]
    #[diagnostic(
        code(atlas::cli::render_failed),
        help("run with --debug to see the external tool invocations")
    )]
    RenderFailed { summary: String },

    /// Refusing to touch something that already exists
    #[error("{message}")]
    #[diagnostic(code(atlas::cli::exists))]
    AlreadyExists {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid arguments: {message}")]
    #[diagnostic(code(atlas::cli::usage))]
    Usage { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(atlas::cli::io))]
    Io { message: String },

    #[error("{message}")]
    #[diagnostic(code(atlas::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Core(e) => core_exit_code(e),
            CliError::Render(RenderError::Core(e)) => core_exit_code(e),
            CliError::Render(RenderError::Io { .. }) => exit_codes::IO_ERROR,
            CliError::Render(_) => exit_codes::RENDER_ERROR,
            CliError::RenderFailed { .. } => exit_codes::RENDER_ERROR,
            CliError::AlreadyExists { .. } => exit_codes::ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

fn core_exit_code(err: &CoreError) -> u8 {
    match err {
        CoreError::ReleaseNotFound { .. } => exit_codes::NOT_FOUND,
        CoreError::Io(_) => exit_codes::IO_ERROR,
        CoreError::PathEscape { .. }
        | CoreError::InvalidConfig { .. }
        | CoreError::ConfigNotFound { .. }
        | CoreError::YamlParse(_) => exit_codes::CONFIG_ERROR,
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: format!("failed to encode JSON: {}", err),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
