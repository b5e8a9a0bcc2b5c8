//! Error types for the addon index
//!
//! Resolution itself never fails outward (see `ResolutionError`), so this
//! module covers the surfaces that can: configuration, settings files and
//! command arguments.

use std::path::PathBuf;
use thiserror::Error;

use crate::project_resolver::ResolutionError;

/// Main error type for index operations
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] Box<figment::Error>),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Configuration file already exists at '{path}'. Use --force to overwrite")]
    ConfigExists { path: PathBuf },

    /// Project errors
    #[error("Project root '{path}' is not a directory")]
    InvalidRoot { path: PathBuf },

    #[error(
        "Unknown artifact kind '{kind}'. Expected one of: component, route-path, helper, modifier, model, service, transform"
    )]
    UnknownKind { kind: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl IndexError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileWrite { .. } => "FILE_WRITE_ERROR".to_string(),
            Self::ConfigLoad(_) => "CONFIG_LOAD_ERROR".to_string(),
            Self::ConfigSerialize(_) => "CONFIG_SERIALIZE_ERROR".to_string(),
            Self::ConfigExists { .. } => "CONFIG_EXISTS".to_string(),
            Self::InvalidRoot { .. } => "INVALID_ROOT".to_string(),
            Self::UnknownKind { .. } => "UNKNOWN_KIND".to_string(),
            Self::Resolution(e) => e.status_code(),
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::ConfigLoad(_) => vec![
                "Check .addon-index/settings.toml for syntax errors",
                "Run 'addon-index init --force' to regenerate the default settings",
            ],
            Self::ConfigExists { .. } => {
                vec!["Pass --force to overwrite the existing settings file"]
            }
            Self::FileWrite { .. } => vec![
                "Check that you have write permissions in the target directory",
                "Ensure the disk is not full",
            ],
            Self::InvalidRoot { .. } => vec![
                "Pass the directory containing the project's package.json",
            ],
            Self::Resolution(e) => e.recovery_suggestions(),
            _ => vec![],
        }
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;
