//! Preview generation for staged restructuring changes

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::engine::PendingDeleteSet;
use crate::model::Revision;

const CONTEXT_LINES: usize = 3;

/// How a file would change on commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    /// New file
    Added,
    /// Existing file with new content
    Modified,
    /// File removed from disk
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => f.write_str("added"),
            ChangeKind::Modified => f.write_str("modified"),
            ChangeKind::Deleted => f.write_str("deleted"),
        }
    }
}

/// One file in a preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Path relative to the codebase root
    pub path: PathBuf,
    /// Kind of change
    pub kind: ChangeKind,
    /// Unified diff of the change
    pub diff: String,
    /// Inserted lines
    pub insertions: usize,
    /// Removed lines
    pub deletions: usize,
}

/// Everything a commit would write and delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestructuringPreview {
    /// Changes in path order
    pub changes: Vec<FileChange>,
}

impl RestructuringPreview {
    /// Changes of one kind
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &FileChange> {
        self.changes.iter().filter(move |change| change.kind == kind)
    }

    /// Change for `path`, if any
    pub fn change(&self, path: &Path) -> Option<&FileChange> {
        self.changes.iter().find(|change| change.path == path)
    }

    /// Whether nothing would change
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Builds previews by diffing the staged revision against the opened one
pub struct PreviewGenerator;

impl PreviewGenerator {
    /// Unified diff between `old` and `new` with the given headers
    pub fn unified_diff(old_header: &str, new_header: &str, old: &str, new: &str) -> String {
        TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(CONTEXT_LINES)
            .header(old_header, new_header)
            .to_string()
    }

    /// Preview of every touched document and every staged deletion
    ///
    /// `baseline` holds the content of each document as it was opened.
    pub fn generate(
        baseline: &BTreeMap<PathBuf, String>,
        revision: &Revision,
        pending: &PendingDeleteSet,
    ) -> RestructuringPreview {
        let mut changes = Vec::new();

        for document in revision.touched_documents() {
            let display = document.path.display().to_string();
            match baseline.get(&document.path) {
                Some(original) if *original == document.content => {}
                Some(original) => changes.push(Self::change(
                    &document.path,
                    ChangeKind::Modified,
                    original,
                    &document.content,
                    (format!("a/{}", display), format!("b/{}", display)),
                )),
                None => changes.push(Self::change(
                    &document.path,
                    ChangeKind::Added,
                    "",
                    &document.content,
                    ("/dev/null".to_string(), format!("b/{}", display)),
                )),
            }
        }

        for path in pending.iter() {
            if revision.contains_document(path) {
                continue;
            }
            if let Some(original) = baseline.get(path) {
                let display = path.display().to_string();
                changes.push(Self::change(
                    path,
                    ChangeKind::Deleted,
                    original,
                    "",
                    (format!("a/{}", display), "/dev/null".to_string()),
                ));
            }
        }

        changes.sort_by(|a, b| a.path.cmp(&b.path));
        RestructuringPreview { changes }
    }

    fn change(
        path: &Path,
        kind: ChangeKind,
        old: &str,
        new: &str,
        headers: (String, String),
    ) -> FileChange {
        let diff = TextDiff::from_lines(old, new);
        let mut insertions = 0;
        let mut deletions = 0;
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        FileChange {
            path: path.to_path_buf(),
            kind,
            diff: Self::unified_diff(&headers.0, &headers.1, old, new),
            insertions,
            deletions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    #[test]
    fn test_unified_diff_format() {
        let diff = PreviewGenerator::unified_diff("a/x.cs", "b/x.cs", "one\ntwo\n", "one\nthree\n");
        assert!(diff.starts_with("--- a/x.cs\n+++ b/x.cs\n"));
        assert!(diff.contains("-two\n"));
        assert!(diff.contains("+three\n"));
    }

    #[test]
    fn test_generate_classifies_changes() {
        let mut baseline = BTreeMap::new();
        baseline.insert(PathBuf::from("Old/A.cs"), "namespace Old;\n".to_string());
        baseline.insert(PathBuf::from("Keep.cs"), "using Old;\n".to_string());

        let revision = Revision::from_documents(vec![
            Document::new("Old/A.cs", "namespace Old;\n"),
            Document::new("Keep.cs", "using Old;\n"),
        ]);
        let (revision, _) = revision.without_document(Path::new("Old/A.cs"));
        let revision = revision
            .with_document(Document::new("New/A.cs", "namespace New;\n"))
            .with_document(Document::new("Keep.cs", "using New;\n"));

        let mut pending = PendingDeleteSet::new();
        pending.insert(PathBuf::from("Old/A.cs"));

        let preview = PreviewGenerator::generate(&baseline, &revision, &pending);
        let kinds: Vec<_> = preview
            .changes
            .iter()
            .map(|c| (c.path.display().to_string(), c.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Keep.cs".to_string(), ChangeKind::Modified),
                ("New/A.cs".to_string(), ChangeKind::Added),
                ("Old/A.cs".to_string(), ChangeKind::Deleted),
            ]
        );

        let keep = preview.change(Path::new("Keep.cs")).unwrap();
        assert_eq!((keep.insertions, keep.deletions), (1, 1));
        assert_eq!(preview.of_kind(ChangeKind::Added).count(), 1);
    }
}
