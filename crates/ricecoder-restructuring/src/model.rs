//! In-memory code model exchanged with a [`CodeModelProvider`](crate::providers::CodeModelProvider)
//!
//! A [`Revision`] is never edited through a shared reference: every edit takes
//! the revision by value and hands back the next one, so there is exactly one
//! owner of the current code model at any time.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RestructuringError, Result};
use crate::identifier::Identifier;

/// A source file, addressed relative to the codebase root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the codebase root
    pub path: PathBuf,
    /// Full text
    pub content: String,
}

impl Document {
    /// Create a document
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Folder containing the document (empty for files at the root)
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Kind of a declaration reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// Namespace declaration; its display name is the full identifier
    Namespace,
    /// Type declaration, tagged with the keyword that introduced it
    Type(String),
}

/// A declaration located in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Display name
    pub name: String,
    /// Declaration kind
    pub kind: DeclarationKind,
    /// Enclosing namespace (the namespace itself for namespace declarations)
    pub namespace: Option<Identifier>,
    /// Document that holds the declaration
    pub path: PathBuf,
    /// Byte range of the declaration inside the document
    pub span: Range<usize>,
}

impl Declaration {
    /// Whether this is a type declaration
    pub fn is_type(&self) -> bool {
        matches!(self.kind, DeclarationKind::Type(_))
    }
}

/// Raw dependency edge: code in `enclosing` references a symbol contained in `referenced`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceEdge {
    /// Namespace enclosing the reference
    pub enclosing: Identifier,
    /// Namespace containing the referenced declaration
    pub referenced: Identifier,
}

/// A project (top-level unit) and the projects it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Project name
    pub name: String,
    /// Referenced project names
    #[serde(default)]
    pub references: Vec<String>,
}

/// Declaration name filter: exact match or `*` / `?` wildcards
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Exact display name
    Exact(String),
    /// Compiled wildcard pattern
    Wildcard {
        /// Pattern as written
        pattern: String,
        /// Anchored regex equivalent
        regex: Regex,
    },
}

impl NamePattern {
    /// Exact-match pattern
    pub fn exact(name: impl Into<String>) -> Self {
        NamePattern::Exact(name.into())
    }

    /// Parse a pattern, treating `*` and `?` as wildcards
    pub fn parse(pattern: &str) -> Result<Self> {
        if !pattern.contains(|c: char| c == '*' || c == '?') {
            return Ok(NamePattern::Exact(pattern.to_string()));
        }

        let mut expr = String::with_capacity(pattern.len() + 2);
        expr.push('^');
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| {
            RestructuringError::InvalidConfiguration(format!("Invalid name pattern '{}': {}", pattern, e))
        })?;

        Ok(NamePattern::Wildcard {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Check a display name against the pattern
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(expected) => expected == name,
            NamePattern::Wildcard { regex, .. } => regex.is_match(name),
        }
    }
}

/// Snapshot of the whole code model after zero or more staged edits
#[derive(Debug, Default)]
pub struct Revision {
    sequence: u64,
    documents: BTreeMap<PathBuf, Document>,
    touched: BTreeSet<PathBuf>,
}

impl Revision {
    /// Initial revision as read from storage
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            sequence: 0,
            documents: documents
                .into_iter()
                .map(|doc| (doc.path.clone(), doc))
                .collect(),
            touched: BTreeSet::new(),
        }
    }

    /// Number of edits applied since the revision was opened
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// All documents in path order
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Document at `path`
    pub fn document(&self, path: &Path) -> Option<&Document> {
        self.documents.get(path)
    }

    /// Whether a document exists at `path`
    pub fn contains_document(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }

    /// Number of documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Documents added or changed since the revision was opened
    pub fn touched_documents(&self) -> impl Iterator<Item = &Document> {
        self.touched
            .iter()
            .filter_map(|path| self.documents.get(path))
    }

    /// Whether any edit was staged
    pub fn has_changes(&self) -> bool {
        self.sequence > 0
    }

    /// Next revision with `document` added or replaced
    pub fn with_document(mut self, document: Document) -> Self {
        self.sequence += 1;
        self.touched.insert(document.path.clone());
        self.documents.insert(document.path.clone(), document);
        self
    }

    /// Next revision without the document at `path`, plus the removed document
    pub fn without_document(mut self, path: &Path) -> (Self, Option<Document>) {
        let removed = self.documents.remove(path);
        if removed.is_some() {
            self.sequence += 1;
            self.touched.remove(path);
        }
        (self, removed)
    }

    /// Next revision with every document passed through `rewrite`
    ///
    /// `rewrite` returns `Some(new_content)` for documents that change.
    pub fn rewrite_documents<F>(mut self, mut rewrite: F) -> Result<Self>
    where
        F: FnMut(&Document) -> Result<Option<String>>,
    {
        let mut changed = Vec::new();
        for document in self.documents.values() {
            if let Some(content) = rewrite(document)? {
                if content != document.content {
                    changed.push(Document::new(document.path.clone(), content));
                }
            }
        }

        for document in changed {
            self = self.with_document(document);
        }
        Ok(self)
    }
}
