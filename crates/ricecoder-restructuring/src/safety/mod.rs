//! Backup and restore of the codebase tree

pub mod backup;

pub use backup::{compute_hash, BackupService, BackupSnapshot, BACKUP_FOLDER};
