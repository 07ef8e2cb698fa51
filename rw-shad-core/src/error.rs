//! Error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by registry access, pipeline steps and file operations
#[derive(Error, Debug)]
pub enum ShadError {
    /// The registry could not be fetched or returned an unusable payload
    #[error("Failed to fetch component registry: {0}")]
    RegistryFetch(String),

    /// A cached registry file exists but cannot be parsed
    #[error("Registry cache is corrupt: {path}\n\nRun again with --refresh, or remove the file with:\n  rw-shad cache clear")]
    RegistryCacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A requested component has no match in the registry
    #[error("Component \"{0}\" not found in registry")]
    ComponentNotFound(String),

    /// An external process failed or was torn down unexpectedly
    #[error("{message}\n{output}")]
    ExternalProcess {
        message: String,
        output: String,
        exit_code: Option<i32>,
    },

    /// A rename, read or write in the project failed
    #[error("{message}")]
    FileOperation {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The interactive selection was empty or invalid
    #[error("{0}")]
    Selection(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not a usable project (no redwood.toml, unsupported tooling)
    #[error("{0}")]
    Project(String),
}

pub type Result<T> = std::result::Result<T, ShadError>;

impl ShadError {
    /// Build a file operation error that wraps an I/O failure on `path`
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ShadError::FileOperation {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Build a file operation error that has no underlying I/O error
    pub fn file(message: impl Into<String>) -> Self {
        ShadError::FileOperation {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Process exit code carried by the error, if any
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ShadError::ExternalProcess { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}
