//! Extract a type declaration into its own unit

use tracing::debug;

use crate::{
    error::{RestructuringError, Result},
    identifier::Identifier,
    model::{Declaration, NamePattern, Revision},
    providers::CodeModelProvider,
    types::TransformationOutcome,
};

/// First type declaration named exactly `class_name`, in document path order
pub(super) fn locate_declaration(
    provider: &dyn CodeModelProvider,
    revision: &Revision,
    class_name: &str,
) -> Result<Declaration> {
    provider
        .find_declarations(revision, &NamePattern::exact(class_name))?
        .into_iter()
        .find(Declaration::is_type)
        .ok_or_else(|| RestructuringError::DeclarationNotFound(class_name.to_string()))
}

/// Move `class_name` into a new unit under `target`, removing it from its original unit
pub(super) fn extract_class(
    provider: &dyn CodeModelProvider,
    revision: Revision,
    class_name: &str,
    target: &Identifier,
    outcome: &mut TransformationOutcome,
) -> Result<Revision> {
    let declaration = locate_declaration(provider, &revision, class_name)?;
    let source = revision
        .document(&declaration.path)
        .cloned()
        .ok_or_else(|| {
            RestructuringError::ProviderError(format!(
                "Declaration {} points at missing document {}",
                class_name,
                declaration.path.display()
            ))
        })?;

    let unit = provider.synthesize_unit(&source, &declaration, target)?;
    if unit.path == source.path {
        return Err(RestructuringError::InvalidTransformation(format!(
            "{} already lives in {}",
            class_name,
            source.path.display()
        )));
    }
    if revision.contains_document(&unit.path) {
        return Err(RestructuringError::InvalidTransformation(format!(
            "Cannot extract {}: {} already exists",
            class_name,
            unit.path.display()
        )));
    }

    let remaining = provider.remove_declaration(&source, &declaration)?;
    debug!(
        class = class_name,
        from = %source.path.display(),
        to = %unit.path.display(),
        "Extracted declaration"
    );

    outcome.modified.push(remaining.path.clone());
    outcome.added.push(unit.path.clone());
    Ok(revision.with_document(remaining).with_document(unit))
}
