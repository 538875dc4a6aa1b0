//! Built-in architecture templates

use std::collections::BTreeMap;

use crate::analysis::Layer;
use crate::error::{RestructuringError, Result};
use crate::identifier::Identifier;
use crate::types::Transformation;

/// A named set of layers with their subfolders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureTemplate {
    /// Template name
    pub name: &'static str,
    /// Layers in generation order
    pub layers: Vec<(Layer, Vec<&'static str>)>,
}

impl ArchitectureTemplate {
    /// Names accepted by [`by_name`](Self::by_name)
    pub const NAMES: [&'static str; 2] = ["clean", "clean-architecture"];

    /// Clean architecture: Domain, Application, Infrastructure, Presentation
    pub fn clean() -> Self {
        Self {
            name: "clean",
            layers: vec![
                (Layer::Domain, vec!["Entities", "ValueObjects"]),
                (Layer::Application, vec!["Services", "Interfaces"]),
                (Layer::Infrastructure, vec!["Persistence", "Services"]),
                (Layer::Presentation, vec!["Controllers"]),
            ],
        }
    }

    /// Look up a template by name (case-insensitive)
    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "clean" | "clean-architecture" | "clean_architecture" => Ok(Self::clean()),
            other => Err(RestructuringError::InvalidConfiguration(format!(
                "Unknown architecture template '{}' (available: {})",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// One `GenerateLayer` per layer, innermost first
    pub fn transformations(&self) -> Result<Vec<Transformation>> {
        self.layers
            .iter()
            .map(|(layer, subfolders)| {
                Ok(Transformation::GenerateLayer {
                    name: Identifier::new(layer.name())?,
                    subfolders: subfolders.iter().map(|s| s.to_string()).collect(),
                    options: BTreeMap::new(),
                })
            })
            .collect()
    }
}
