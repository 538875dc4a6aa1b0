// CLI error types

use ricecoder_restructuring::RestructuringError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Restructuring error: {0}")]
    Restructuring(#[from] RestructuringError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'rice-restructure --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => {
                format!("File operation failed: {}", e)
            }
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nCheck the transformation list in your configuration file.",
                    msg
                )
            }
            CliError::Restructuring(e) => restructuring_message(e),
            CliError::Internal(msg) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }

    /// Whether the codebase on disk may have been partially written
    pub fn may_have_modified_tree(&self) -> bool {
        matches!(self, CliError::Restructuring(e) if !e.leaves_tree_untouched())
    }
}

fn restructuring_message(error: &RestructuringError) -> String {
    match error {
        RestructuringError::ValidationConflict {
            transformation,
            conflicts,
        } => {
            let mut message = format!(
                "{} was rejected by dependency validation. Nothing was changed on disk.\n",
                transformation
            );
            for conflict in conflicts {
                message.push_str(&format!("\n  - {}", conflict));
            }
            message
        }
        RestructuringError::UnsupportedTransformation(kind) => {
            format!(
                "Unsupported transformation kind '{}'.\n\nSupported kinds: MoveNamespace, RenameNamespace, ExtractClass, GenerateLayer.",
                kind
            )
        }
        RestructuringError::InvalidConfiguration(msg) | RestructuringError::ConfigError(msg) => {
            format!(
                "Configuration error: {}\n\nCheck the transformation list in your configuration file.",
                msg
            )
        }
        RestructuringError::CommitFailure(msg) => {
            format!(
                "Commit failed: {}\n\nThe codebase may be partially written. Run 'rice-restructure restore --solution <path>' to roll back to the backup taken before this run. Restore only overwrites backed-up files; files written by this run stay in place.",
                msg
            )
        }
        RestructuringError::InitializationError(msg) => {
            format!(
                "Could not prepare the codebase: {}\n\nNo transformation was applied.",
                msg
            )
        }
        RestructuringError::BackupCorrupted(path) => {
            format!(
                "Backup integrity check failed for {}\n\nThe snapshot was not restored. Pick another one with 'rice-restructure backups'.",
                path.display()
            )
        }
        other => other.to_string(),
    }
}

pub type CliResult<T> = Result<T, CliError>;
