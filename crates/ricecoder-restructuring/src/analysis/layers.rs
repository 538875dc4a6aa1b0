//! Architecture layers and their allowed dependency direction

use std::fmt;

use crate::identifier::Identifier;

/// Rank given to identifiers that do not belong to a known layer
pub const UNRANKED: u8 = 4;

/// Well-known architecture layers, innermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Entities and value objects
    Domain,
    /// Use cases
    Application,
    /// Persistence and external services
    Infrastructure,
    /// UI and API surface
    Presentation,
}

impl Layer {
    /// All layers in rank order
    pub const ALL: [Layer; 4] = [
        Layer::Domain,
        Layer::Application,
        Layer::Infrastructure,
        Layer::Presentation,
    ];

    /// Layer name as it appears in identifiers
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Domain => "Domain",
            Layer::Application => "Application",
            Layer::Infrastructure => "Infrastructure",
            Layer::Presentation => "Presentation",
        }
    }

    /// Position in the layer table; lower is further inside
    pub fn rank(&self) -> u8 {
        match self {
            Layer::Domain => 0,
            Layer::Application => 1,
            Layer::Infrastructure => 2,
            Layer::Presentation => 3,
        }
    }

    /// Projects a newly generated layer references
    pub fn references(&self) -> &'static [Layer] {
        match self {
            Layer::Domain => &[],
            Layer::Application => &[Layer::Domain],
            Layer::Infrastructure => &[Layer::Application, Layer::Domain],
            Layer::Presentation => &[Layer::Application],
        }
    }

    /// Exact layer name lookup
    pub fn from_name(name: &str) -> Option<Layer> {
        Layer::ALL.into_iter().find(|layer| layer.name() == name)
    }

    /// First layer (in rank order) whose name occurs anywhere in `identifier`
    pub fn detect(identifier: &Identifier) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|layer| identifier.as_str().contains(layer.name()))
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rank of an identifier by substring match against the layer table
pub fn layer_rank(identifier: &Identifier) -> u8 {
    Layer::detect(identifier)
        .map(|layer| layer.rank())
        .unwrap_or(UNRANKED)
}
