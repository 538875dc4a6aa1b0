//! Code model provider protocol
//!
//! The engine never parses source text itself. Everything it needs to know
//! about declarations and references, and every edit it stages, goes through
//! a [`CodeModelProvider`]. Edits consume the current [`Revision`] and return
//! the next one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{RestructuringError, Result};
use crate::identifier::Identifier;
use crate::model::{Declaration, Document, NamePattern, ProjectSpec, ReferenceEdge, Revision};

/// Language-specific access to a codebase
#[async_trait]
pub trait CodeModelProvider: Send + Sync {
    /// Short language tag (for logs)
    fn language(&self) -> &str;

    /// Read the codebase under `root` into the initial revision
    async fn open(&self, root: &Path) -> Result<Revision>;

    /// Declarations whose display name matches `pattern`, in document path order
    ///
    /// Namespaces display as their full identifier, types as their simple name.
    fn find_declarations(&self, revision: &Revision, pattern: &NamePattern)
        -> Result<Vec<Declaration>>;

    /// Rename namespace `from` (and every namespace nested in it) to `to`,
    /// together with every reference to it
    fn rename_namespace(
        &self,
        revision: Revision,
        from: &Identifier,
        to: &Identifier,
    ) -> Result<Revision>;

    /// Copy of `document` without `declaration`
    fn remove_declaration(&self, document: &Document, declaration: &Declaration)
        -> Result<Document>;

    /// New unit holding `declaration` (taken from `source`) under `namespace`
    fn synthesize_unit(
        &self,
        source: &Document,
        declaration: &Declaration,
        namespace: &Identifier,
    ) -> Result<Document>;

    /// Initializer unit that makes an otherwise empty namespace discoverable
    fn placeholder_unit(&self, namespace: &Identifier) -> Result<Document>;

    /// Unit with a single generated declaration `name` in `namespace`
    fn stub_unit(&self, namespace: &Identifier, name: &str) -> Result<Document>;

    /// Manifest document describing `project`
    fn project_unit(&self, project: &ProjectSpec) -> Result<Document>;

    /// Projects present in `revision`
    fn projects(&self, revision: &Revision) -> Result<Vec<ProjectSpec>>;

    /// Raw dependency edges for every reference made from `document`
    fn references(&self, revision: &Revision, document: &Document) -> Result<Vec<ReferenceEdge>>;

    /// Where a document under the folder of `from` lands when `from` becomes `to`
    ///
    /// Defaults to swapping the folder prefix and keeping the file name.
    fn relocated_path(&self, path: &Path, from: &Identifier, to: &Identifier) -> Result<PathBuf> {
        let relative = path.strip_prefix(from.to_relative_path()).map_err(|_| {
            RestructuringError::ProviderError(format!(
                "{} is not in the folder of {}",
                path.display(),
                from
            ))
        })?;
        Ok(to.to_relative_path().join(relative))
    }

    /// Write every document touched in `revision` under `root`
    async fn apply(&self, root: &Path, revision: &Revision) -> Result<()>;
}
