//! Configuration types for the restructuring engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::CycleDetection;
use crate::error::{RestructuringError, Result};
use crate::identifier::Identifier;
use crate::types::{Transformation, TransformationKind};

/// Option key holding the comma-separated subfolder list of `GenerateLayer`
pub const SUBFOLDERS_OPTION: &str = "subfolders";

/// Top-level restructuring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestructuringConfig {
    /// Engine behaviour
    #[serde(default)]
    pub settings: EngineSettings,
    /// Source language description used by the text provider
    #[serde(default)]
    pub language: LanguageProfile,
    /// Transformations, applied in order
    #[serde(default)]
    pub transformations: Vec<TransformationRecord>,
}

impl RestructuringConfig {
    /// Convert every record, failing on the first unsupported or malformed one
    pub fn transformations(&self) -> Result<Vec<Transformation>> {
        self.transformations
            .iter()
            .map(TransformationRecord::to_transformation)
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.language.validate()?;
        if self.settings.backup_retention == 0 {
            return Err(RestructuringError::InvalidConfiguration(
                "backup_retention must keep at least one snapshot".to_string(),
            ));
        }
        self.transformations()?;
        Ok(())
    }
}

/// Engine behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Cycle check run during validation
    #[serde(default)]
    pub cycle_detection: CycleDetection,
    /// Snapshots kept in the backup store
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,
    /// Stage and report changes without touching the tree
    #[serde(default)]
    pub dry_run: bool,
}

fn default_backup_retention() -> usize {
    10
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cycle_detection: CycleDetection::default(),
            backup_retention: default_backup_retention(),
            dry_run: false,
        }
    }
}

/// Surface syntax understood by the text provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageProfile {
    /// Source file extension, without the dot
    pub extension: String,
    /// Keyword that opens a namespace declaration
    pub namespace_keyword: String,
    /// Keyword that imports a namespace
    pub import_keyword: String,
    /// Keywords that introduce type declarations
    pub declaration_keywords: Vec<String>,
    /// Modifiers that may precede a type declaration
    pub modifiers: Vec<String>,
    /// Type name used for namespace placeholder units
    pub placeholder_name: String,
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self {
            extension: "cs".to_string(),
            namespace_keyword: "namespace".to_string(),
            import_keyword: "using".to_string(),
            declaration_keywords: ["class", "interface", "struct", "enum", "record"]
                .into_iter()
                .map(String::from)
                .collect(),
            modifiers: [
                "public", "internal", "private", "protected", "static", "sealed", "abstract",
                "partial", "readonly",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            placeholder_name: "NamespaceInfo".to_string(),
        }
    }
}

impl LanguageProfile {
    /// Validate the profile
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(RestructuringError::InvalidConfiguration(
                "extension must be non-empty and given without a leading dot".to_string(),
            ));
        }

        if self.namespace_keyword.is_empty() || self.import_keyword.is_empty() {
            return Err(RestructuringError::InvalidConfiguration(
                "namespace and import keywords cannot be empty".to_string(),
            ));
        }

        if self.declaration_keywords.is_empty() {
            return Err(RestructuringError::InvalidConfiguration(
                "At least one declaration keyword must be specified".to_string(),
            ));
        }

        Identifier::new(self.placeholder_name.as_str()).map_err(|_| {
            RestructuringError::InvalidConfiguration(format!(
                "placeholder_name '{}' is not a valid type name",
                self.placeholder_name
            ))
        })?;

        Ok(())
    }
}

/// A transformation as written in a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationRecord {
    /// Kind tag, matched case-insensitively
    pub kind: String,
    /// Source namespace, class name or layer name
    #[serde(default)]
    pub source: Option<String>,
    /// Target namespace
    #[serde(default)]
    pub target: Option<String>,
    /// Free-form options
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl TransformationRecord {
    /// Convert into a typed transformation
    pub fn to_transformation(&self) -> Result<Transformation> {
        let kind: TransformationKind = self.kind.parse()?;

        match kind {
            TransformationKind::MoveNamespace => Ok(Transformation::MoveNamespace {
                source: self.identifier("source", &self.source)?,
                target: self.identifier("target", &self.target)?,
            }),
            TransformationKind::RenameNamespace => Ok(Transformation::RenameNamespace {
                source: self.identifier("source", &self.source)?,
                target: self.identifier("target", &self.target)?,
            }),
            TransformationKind::ExtractClass => {
                let class_name = self.required("source", &self.source)?.trim().to_string();
                Ok(Transformation::ExtractClass {
                    class_name,
                    target_namespace: self.identifier("target", &self.target)?,
                })
            }
            TransformationKind::GenerateLayer => {
                let name = match (&self.source, &self.target) {
                    (Some(_), _) => self.identifier("source", &self.source)?,
                    (None, Some(_)) => self.identifier("target", &self.target)?,
                    (None, None) => self.identifier("source", &None)?,
                };
                let mut options = self.options.clone();
                let subfolders = options
                    .remove(SUBFOLDERS_OPTION)
                    .map(|list| parse_subfolders(&list))
                    .unwrap_or_default();

                Ok(Transformation::GenerateLayer {
                    name,
                    subfolders,
                    options,
                })
            }
        }
    }

    fn required<'a>(&self, field: &str, value: &'a Option<String>) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                RestructuringError::InvalidConfiguration(format!(
                    "{} transformation requires '{}'",
                    self.kind, field
                ))
            })
    }

    fn identifier(&self, field: &str, value: &Option<String>) -> Result<Identifier> {
        Identifier::new(self.required(field, value)?)
    }
}

/// Split a comma-separated subfolder list, trimming entries and dropping empty ones
pub fn parse_subfolders(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, source: Option<&str>, target: Option<&str>) -> TransformationRecord {
        TransformationRecord {
            kind: kind.to_string(),
            source: source.map(String::from),
            target: target.map(String::from),
            options: BTreeMap::new(),
        }
    }

    #[test]
    fn test_rename_record() -> Result<()> {
        let t = record("rename_namespace", Some("Old"), Some("New")).to_transformation()?;
        assert_eq!(
            t,
            Transformation::RenameNamespace {
                source: Identifier::new("Old")?,
                target: Identifier::new("New")?,
            }
        );
        Ok(())
    }

    #[test]
    fn test_missing_target_is_invalid() {
        let err = record("MoveNamespace", Some("Old"), None)
            .to_transformation()
            .unwrap_err();
        assert!(matches!(err, RestructuringError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let config = RestructuringConfig {
            transformations: vec![
                record("RenameNamespace", Some("Old"), Some("New")),
                record("InlineEverything", Some("Old"), None),
            ],
            ..Default::default()
        };
        assert!(matches!(
            config.transformations(),
            Err(RestructuringError::UnsupportedTransformation(_))
        ));
    }

    #[test]
    fn test_generate_layer_subfolders() -> Result<()> {
        let mut r = record("GenerateLayer", Some("Domain"), None);
        r.options
            .insert("subfolders".to_string(), " Entities, ,ValueObjects ,".to_string());
        r.options.insert("references".to_string(), "Shared".to_string());

        match r.to_transformation()? {
            Transformation::GenerateLayer {
                name,
                subfolders,
                options,
            } => {
                assert_eq!(name.as_str(), "Domain");
                assert_eq!(subfolders, vec!["Entities", "ValueObjects"]);
                assert_eq!(options.get("references").map(String::as_str), Some("Shared"));
                assert!(!options.contains_key("subfolders"));
            }
            other => panic!("unexpected transformation {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_missing_subfolders_is_empty() -> Result<()> {
        let t = record("GenerateLayer", Some("Reporting"), None).to_transformation()?;
        assert!(matches!(t, Transformation::GenerateLayer { subfolders, .. } if subfolders.is_empty()));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_dotted_extension() {
        let profile = LanguageProfile {
            extension: ".cs".to_string(),
            ..Default::default()
        };
        assert!(profile.validate().is_err());
        assert!(LanguageProfile::default().validate().is_ok());
    }
}
