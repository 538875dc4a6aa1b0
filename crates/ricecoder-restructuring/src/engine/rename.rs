//! Two-phase namespace rename and document relocation

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::pending::PendingDeleteSet;
use crate::{
    error::{RestructuringError, Result},
    identifier::Identifier,
    model::{DeclarationKind, Document, NamePattern, Revision},
    providers::CodeModelProvider,
    types::TransformationOutcome,
};

/// Marker embedded in temporary namespace names
pub const TEMP_MARKER: &str = "__restructure_tmp_";

const TEMP_TOKEN_LEN: usize = 12;
const MAX_TEMP_ATTEMPTS: usize = 8;

/// Rename `source` to `target` through a fresh temporary name, then move its
/// documents to the folder of `target`
pub(super) fn move_namespace(
    provider: &dyn CodeModelProvider,
    revision: Revision,
    source: &Identifier,
    target: &Identifier,
    pending: &mut PendingDeleteSet,
    outcome: &mut TransformationOutcome,
) -> Result<Revision> {
    if source == target {
        return Err(RestructuringError::InvalidTransformation(format!(
            "{} is already named {}",
            source, target
        )));
    }
    if !declares_namespace_within(provider, &revision, source)? {
        return Err(RestructuringError::DeclarationNotFound(format!(
            "namespace {}",
            source
        )));
    }

    // Snapshot the documents the rename can touch so changes can be reported
    let candidates: Vec<(PathBuf, String)> = revision
        .documents()
        .filter(|doc| doc.content.contains(source.as_str()))
        .map(|doc| (doc.path.clone(), doc.content.clone()))
        .collect();

    let plan = plan_relocation(provider, &revision, source, target)?;

    let temp = temporary_identifier(provider, &revision, source)?;
    debug!(source = %source, temp = %temp, target = %target, "Renaming through temporary namespace");

    let revision = provider.rename_namespace(revision, source, &temp)?;
    let revision = provider.rename_namespace(revision, &temp, target)?;

    let revision = relocate_documents(provider, revision, target, plan, pending, outcome)?;

    for (path, before) in candidates {
        let relocated = outcome.relocated.iter().any(|(old, _)| *old == path);
        let changed = revision
            .document(&path)
            .is_some_and(|doc| doc.content != before);
        if !relocated && changed {
            outcome.modified.push(path);
        }
    }

    Ok(revision)
}

/// Whether any namespace equal to or nested in `namespace` is declared
fn declares_namespace_within(
    provider: &dyn CodeModelProvider,
    revision: &Revision,
    namespace: &Identifier,
) -> Result<bool> {
    let pattern = NamePattern::parse(&format!("{}*", namespace))?;
    Ok(provider
        .find_declarations(revision, &pattern)?
        .into_iter()
        .filter(|declaration| declaration.kind == DeclarationKind::Namespace)
        .filter_map(|declaration| declaration.namespace)
        .any(|declared| declared.is_within(namespace)))
}

/// `<source>__restructure_tmp_<token>`, regenerated until no declaration carries that name
pub(super) fn temporary_identifier(
    provider: &dyn CodeModelProvider,
    revision: &Revision,
    source: &Identifier,
) -> Result<Identifier> {
    for _ in 0..MAX_TEMP_ATTEMPTS {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let candidate = Identifier::new(format!(
            "{}{}{}",
            source,
            TEMP_MARKER,
            &token[..TEMP_TOKEN_LEN]
        ))?;

        let taken = provider.find_declarations(revision, &NamePattern::exact(candidate.as_str()))?;
        if taken.is_empty() {
            return Ok(candidate);
        }
        debug!(candidate = %candidate, "Temporary namespace already taken");
    }

    Err(RestructuringError::InvalidTransformation(format!(
        "Could not find a free temporary name for {}",
        source
    )))
}

/// Old and new path of every document under the folder of `old`, in path order
///
/// Old paths come from the pre-rename identifier and new paths from the
/// post-rename one. Fails when a new path is held by a document that stays
/// put, or when two documents would land on the same path.
pub(super) fn plan_relocation(
    provider: &dyn CodeModelProvider,
    revision: &Revision,
    old: &Identifier,
    new: &Identifier,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let old_root = old.to_relative_path();
    let moving: BTreeSet<&Path> = revision
        .documents()
        .filter(|doc| doc.path.starts_with(&old_root))
        .map(|doc| doc.path.as_path())
        .collect();

    let mut claimed = BTreeSet::new();
    let mut plan = Vec::with_capacity(moving.len());
    for path in &moving {
        let destination = provider.relocated_path(path, old, new)?;
        let occupied = revision.contains_document(&destination)
            && !moving.contains(destination.as_path());
        if occupied || !claimed.insert(destination.clone()) {
            return Err(RestructuringError::InvalidTransformation(format!(
                "Cannot move {} to {}: {} already exists",
                path.display(),
                new,
                destination.display()
            )));
        }
        plan.push((path.to_path_buf(), destination));
    }

    Ok(plan)
}

/// Move documents along `plan`, staging their old paths for deletion
///
/// All documents are removed before any is re-inserted so that a target
/// nested inside the source folder cannot collide with itself.
pub(super) fn relocate_documents(
    provider: &dyn CodeModelProvider,
    revision: Revision,
    new: &Identifier,
    plan: Vec<(PathBuf, PathBuf)>,
    pending: &mut PendingDeleteSet,
    outcome: &mut TransformationOutcome,
) -> Result<Revision> {
    let new_root = new.to_relative_path();
    let target_is_new = !revision
        .documents()
        .any(|doc| doc.path.starts_with(&new_root));

    let mut revision = revision;
    let mut moved = Vec::with_capacity(plan.len());
    for (from, to) in plan {
        let (next, removed) = revision.without_document(&from);
        revision = next;
        if let Some(document) = removed {
            moved.push((document, to));
        }
    }

    let mut lands_in_root = false;
    for (document, new_path) in moved {
        lands_in_root |= new_path.parent() == Some(new_root.as_path());

        pending.insert(document.path.clone());
        outcome.staged_deletions.push(document.path.clone());
        outcome.relocated.push((document.path, new_path.clone()));
        revision = revision.with_document(Document::new(new_path, document.content));
    }

    if target_is_new && !lands_in_root {
        let placeholder = provider.placeholder_unit(new)?;
        if !revision.contains_document(&placeholder.path) {
            debug!(namespace = %new, path = %placeholder.path.display(), "Adding placeholder unit");
            outcome.added.push(placeholder.path.clone());
            revision = revision.with_document(placeholder);
        }
    }

    Ok(revision)
}
