//! Architecture layer scaffolding

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    analysis::Layer,
    config::parse_subfolders,
    error::{RestructuringError, Result},
    identifier::Identifier,
    model::{ProjectSpec, Revision},
    providers::CodeModelProvider,
    types::TransformationOutcome,
};

/// Option key with extra comma-separated project references
pub const REFERENCES_OPTION: &str = "references";

/// Suffix of the stub declaration generated in each subfolder
pub const STUB_SUFFIX: &str = "Marker";

/// Projects a new layer named `name` references
///
/// Well-known layers get the fixed table (sibling projects when `name` is
/// nested); unknown names get only what `options` lists explicitly.
pub fn layer_references(name: &Identifier, options: &BTreeMap<String, String>) -> Vec<String> {
    let mut references: Vec<String> = Layer::from_name(name.last_segment())
        .map(|layer| {
            layer
                .references()
                .iter()
                .map(|referenced| match name.parent() {
                    Some(parent) => format!("{}.{}", parent, referenced),
                    None => referenced.name().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    if let Some(extra) = options.get(REFERENCES_OPTION) {
        for reference in parse_subfolders(extra) {
            if !references.contains(&reference) {
                references.push(reference);
            }
        }
    }

    references
}

/// Create project `name` with one namespace and one stub per subfolder
pub(super) fn generate_layer(
    provider: &dyn CodeModelProvider,
    revision: Revision,
    name: &Identifier,
    subfolders: &[String],
    options: &BTreeMap<String, String>,
    outcome: &mut TransformationOutcome,
) -> Result<Revision> {
    if provider
        .projects(&revision)?
        .iter()
        .any(|project| project.name == name.as_str())
    {
        return Err(RestructuringError::InvalidTransformation(format!(
            "Project {} already exists",
            name
        )));
    }

    let project = ProjectSpec {
        name: name.to_string(),
        references: layer_references(name, options),
    };
    let manifest = provider.project_unit(&project)?;
    if revision.contains_document(&manifest.path) {
        return Err(RestructuringError::InvalidTransformation(format!(
            "{} already exists",
            manifest.path.display()
        )));
    }

    debug!(layer = %name, references = ?project.references, "Generating layer");
    outcome.added.push(manifest.path.clone());
    let mut revision = revision.with_document(manifest);

    for subfolder in subfolders {
        let namespace = name.child(subfolder)?;
        let stub = provider.stub_unit(&namespace, &format!("{}{}", subfolder.trim(), STUB_SUFFIX))?;
        if revision.contains_document(&stub.path) {
            return Err(RestructuringError::InvalidTransformation(format!(
                "{} already exists",
                stub.path.display()
            )));
        }
        outcome.added.push(stub.path.clone());
        revision = revision.with_document(stub);
    }

    Ok(revision)
}
