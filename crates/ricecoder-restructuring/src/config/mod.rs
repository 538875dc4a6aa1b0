//! Configuration loading for the restructuring engine

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    parse_subfolders, EngineSettings, LanguageProfile, RestructuringConfig, TransformationRecord,
};
