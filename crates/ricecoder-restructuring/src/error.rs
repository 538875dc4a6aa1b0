//! Error types for the restructuring engine

use std::path::PathBuf;

use thiserror::Error;

use crate::types::DependencyConflict;

/// Result type for restructuring operations
pub type Result<T> = std::result::Result<T, RestructuringError>;

/// Errors that can occur while restructuring a codebase
#[derive(Debug, Error)]
pub enum RestructuringError {
    /// Backup creation or opening the code model failed
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Dependency conflicts were found before anything was mutated
    #[error("Validation conflict in {transformation}: {} conflict(s) found", .conflicts.len())]
    ValidationConflict {
        /// Human readable description of the rejected transformation
        transformation: String,
        /// Every conflict that was detected
        conflicts: Vec<DependencyConflict>,
    },

    /// Transformation kind is not known
    #[error("Unsupported transformation: {0}")]
    UnsupportedTransformation(String),

    /// Flushing the revision or deleting staged files failed
    #[error("Commit failed: {0}")]
    CommitFailure(String),

    /// Operation called in a state that does not allow it
    #[error("Cannot {operation} while engine is {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: String,
        /// State the engine was in
        state: String,
    },

    /// Malformed dotted identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Transformation is well-formed but cannot be applied to this codebase
    #[error("Invalid transformation: {0}")]
    InvalidTransformation(String),

    /// Declaration lookup came back empty
    #[error("Declaration not found: {0}")]
    DeclarationNotFound(String),

    /// Code model provider failure
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Backup creation failed
    #[error("Backup failed: {0}")]
    BackupFailed(String),

    /// Snapshot content does not match its manifest
    #[error("Backup integrity check failed for {0}")]
    BackupCorrupted(PathBuf),

    /// Restore failed
    #[error("Restore failed: {0}")]
    RestoreFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl RestructuringError {
    /// Whether the error was raised before any file was touched on disk
    pub fn leaves_tree_untouched(&self) -> bool {
        !matches!(
            self,
            RestructuringError::CommitFailure(_) | RestructuringError::RestoreFailed(_)
        )
    }
}
