//! Dry-run previews of staged changes

pub mod generator;

pub use generator::{ChangeKind, FileChange, PreviewGenerator, RestructuringPreview};
