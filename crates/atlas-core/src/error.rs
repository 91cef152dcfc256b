//! Core error types

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    #[error("path '{path}' escapes base directory '{base}'")]
    #[diagnostic(
        code(atlas::core::path_escape),
        help("release names and directory names must not contain '..' segments or absolute paths")
    )]
    PathEscape { base: String, path: String },

    #[error("release '{name}' not found in the config")]
    #[diagnostic(code(atlas::core::release_not_found))]
    ReleaseNotFound { name: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(atlas::core::config))]
    InvalidConfig { message: String },

    #[error("Config file not found: {path}")]
    #[diagnostic(
        code(atlas::core::config_not_found),
        help("run `atlas init` to create one, or pass --config")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse config: {0}")]
    #[diagnostic(code(atlas::core::yaml))]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(atlas::core::io))]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Configuration and path-escape errors abort the whole run
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            Self::PathEscape { .. }
                | Self::InvalidConfig { .. }
                | Self::ConfigNotFound { .. }
                | Self::YamlParse(_)
        )
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
