//! Code model provider implementations

pub mod text;

pub use text::{TextCodeModelProvider, PROJECT_MANIFEST_SUFFIX};
