//! Core value types shared by the analyzer and the engine

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RestructuringError, Result};
use crate::identifier::Identifier;

/// A single restructuring step, immutable once parsed from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// Move a namespace (and its subtree) to a new full identifier
    MoveNamespace {
        /// Namespace being moved
        source: Identifier,
        /// Final identifier
        target: Identifier,
    },
    /// Rename a namespace (and its subtree)
    RenameNamespace {
        /// Namespace being renamed
        source: Identifier,
        /// Final identifier
        target: Identifier,
    },
    /// Extract a type declaration into its own file under another namespace
    ExtractClass {
        /// Simple name of the declaration
        class_name: String,
        /// Namespace that will own the new file
        target_namespace: Identifier,
    },
    /// Scaffold a new architectural layer
    GenerateLayer {
        /// Layer (and project) name
        name: Identifier,
        /// Namespaces to create under the layer
        subfolders: Vec<String>,
        /// Remaining free-form options
        options: BTreeMap<String, String>,
    },
}

impl Transformation {
    /// Kind tag for this transformation
    pub fn kind(&self) -> TransformationKind {
        match self {
            Transformation::MoveNamespace { .. } => TransformationKind::MoveNamespace,
            Transformation::RenameNamespace { .. } => TransformationKind::RenameNamespace,
            Transformation::ExtractClass { .. } => TransformationKind::ExtractClass,
            Transformation::GenerateLayer { .. } => TransformationKind::GenerateLayer,
        }
    }

    /// Short description used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Transformation::MoveNamespace { source, target }
            | Transformation::RenameNamespace { source, target } => {
                format!("{} {} -> {}", self.kind(), source, target)
            }
            Transformation::ExtractClass {
                class_name,
                target_namespace,
            } => format!("{} {} -> {}", self.kind(), class_name, target_namespace),
            Transformation::GenerateLayer {
                name, subfolders, ..
            } => {
                if subfolders.is_empty() {
                    format!("{} {}", self.kind(), name)
                } else {
                    format!("{} {} [{}]", self.kind(), name, subfolders.join(", "))
                }
            }
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Kind tag of a [`Transformation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformationKind {
    /// See [`Transformation::MoveNamespace`]
    MoveNamespace,
    /// See [`Transformation::RenameNamespace`]
    RenameNamespace,
    /// See [`Transformation::ExtractClass`]
    ExtractClass,
    /// See [`Transformation::GenerateLayer`]
    GenerateLayer,
}

impl TransformationKind {
    /// Canonical tag as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::MoveNamespace => "MoveNamespace",
            TransformationKind::RenameNamespace => "RenameNamespace",
            TransformationKind::ExtractClass => "ExtractClass",
            TransformationKind::GenerateLayer => "GenerateLayer",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationKind {
    type Err = RestructuringError;

    /// Accepts `RenameNamespace`, `renamenamespace` and `rename_namespace` spellings
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "movenamespace" => Ok(TransformationKind::MoveNamespace),
            "renamenamespace" => Ok(TransformationKind::RenameNamespace),
            "extractclass" => Ok(TransformationKind::ExtractClass),
            "generatelayer" => Ok(TransformationKind::GenerateLayer),
            _ => Err(RestructuringError::UnsupportedTransformation(s.to_string())),
        }
    }
}

/// Why a dependency blocks a transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// An inner layer would end up depending on an outer layer
    LayerViolation,
    /// Following the dependency leads into a cycle
    CyclicDependency,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::LayerViolation => f.write_str("layer violation"),
            ConflictKind::CyclicDependency => f.write_str("cyclic dependency"),
        }
    }
}

/// A dependency that prevents moving `source`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyConflict {
    /// Namespace being moved
    pub source: Identifier,
    /// Dependency of `source` that causes the conflict
    pub conflicting_dependency: Identifier,
    /// Reason
    pub kind: ConflictKind,
}

impl fmt::Display for DependencyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} depends on {}",
            self.kind, self.source, self.conflicting_dependency
        )
    }
}

/// What a successfully applied transformation staged in the revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformationOutcome {
    /// Kind of the applied transformation
    pub kind: TransformationKind,
    /// Description of the transformation
    pub description: String,
    /// Documents created by the step
    pub added: Vec<PathBuf>,
    /// Documents whose content changed in place
    pub modified: Vec<PathBuf>,
    /// Documents moved from the first path to the second
    pub relocated: Vec<(PathBuf, PathBuf)>,
    /// Paths added to the pending delete set
    pub staged_deletions: Vec<PathBuf>,
}

impl TransformationOutcome {
    pub(crate) fn new(transformation: &Transformation) -> Self {
        Self {
            kind: transformation.kind(),
            description: transformation.describe(),
            added: Vec::new(),
            modified: Vec::new(),
            relocated: Vec::new(),
            staged_deletions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing_accepts_spellings() {
        assert_eq!(
            "RenameNamespace".parse::<TransformationKind>().unwrap(),
            TransformationKind::RenameNamespace
        );
        assert_eq!(
            "move_namespace".parse::<TransformationKind>().unwrap(),
            TransformationKind::MoveNamespace
        );
        assert_eq!(
            "GENERATE-LAYER".parse::<TransformationKind>().unwrap(),
            TransformationKind::GenerateLayer
        );
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let err = "SplitProject".parse::<TransformationKind>().unwrap_err();
        assert!(matches!(err, RestructuringError::UnsupportedTransformation(k) if k == "SplitProject"));
    }

    #[test]
    fn test_describe() {
        let t = Transformation::RenameNamespace {
            source: Identifier::new("Old").unwrap(),
            target: Identifier::new("New").unwrap(),
        };
        assert_eq!(t.describe(), "RenameNamespace Old -> New");

        let layer = Transformation::GenerateLayer {
            name: Identifier::new("Domain").unwrap(),
            subfolders: vec!["Entities".to_string()],
            options: BTreeMap::new(),
        };
        assert_eq!(layer.to_string(), "GenerateLayer Domain [Entities]");
    }

    #[test]
    fn test_conflict_display() {
        let conflict = DependencyConflict {
            source: Identifier::new("App.Domain").unwrap(),
            conflicting_dependency: Identifier::new("App.Infrastructure").unwrap(),
            kind: ConflictKind::LayerViolation,
        };
        assert_eq!(
            conflict.to_string(),
            "layer violation: App.Domain depends on App.Infrastructure"
        );
    }
}
