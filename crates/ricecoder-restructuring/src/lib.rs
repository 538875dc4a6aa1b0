//! Ricecoder Restructuring Engine
//!
//! Safely restructures a multi-project codebase: moving and renaming
//! namespaces, extracting declarations into their own files and scaffolding
//! architecture layers.
//!
//! # Architecture
//!
//! - **Dependency analysis**: a namespace dependency graph built from provider
//!   reference edges, checked for layer violations and cycles before anything
//!   is staged
//! - **Explicit revisions**: every edit consumes the current [`Revision`] and
//!   returns the next one, so the engine is the single owner of the code model
//! - **Deferred commit**: file writes and deletions happen once, after every
//!   transformation has been validated and staged
//! - **Backups**: a snapshot of the tree is taken before the run and can be
//!   restored explicitly
//! - **Pluggable providers**: the engine only sees [`CodeModelProvider`]; the
//!   bundled [`TextCodeModelProvider`] handles brace-delimited languages
//!   described by a [`LanguageProfile`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ricecoder_restructuring::{ConfigLoader, RestructuringEngine, TextCodeModelProvider};
//!
//! let config = ConfigLoader::load(Path::new("restructure.json"))?;
//! let provider = TextCodeModelProvider::new(config.language.clone())?;
//! let mut engine = RestructuringEngine::new(Arc::new(provider), config.settings.clone());
//!
//! engine.initialize(Path::new("./src")).await?;
//! let report = engine.run(&config.transformations()?).await?;
//! ```

pub mod adapters;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod model;
pub mod preview;
pub mod providers;
pub mod safety;
pub mod templates;
pub mod types;

// Re-export commonly used types
pub use adapters::TextCodeModelProvider;
pub use analysis::{CycleDetection, DependencyAnalyzer, DependencyGraph, Layer, Validation};
pub use config::{ConfigLoader, EngineSettings, LanguageProfile, RestructuringConfig};
pub use engine::{CommitReport, EngineState, PendingDeleteSet, RestructuringEngine};
pub use error::{RestructuringError, Result};
pub use identifier::Identifier;
pub use model::{Declaration, DeclarationKind, Document, NamePattern, ProjectSpec, Revision};
pub use preview::{ChangeKind, PreviewGenerator, RestructuringPreview};
pub use providers::CodeModelProvider;
pub use safety::{BackupService, BackupSnapshot, BACKUP_FOLDER};
pub use templates::ArchitectureTemplate;
pub use types::{
    ConflictKind, DependencyConflict, Transformation, TransformationKind, TransformationOutcome,
};
