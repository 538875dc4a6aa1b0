//! Text-based code model provider driven by a [`LanguageProfile`]
//!
//! Works on any brace-delimited language whose files declare a single
//! namespace and import other namespaces by name. Declarations are located
//! with regexes and their extent is found by brace matching, so braces inside
//! string literals or comments can confuse it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::{
    config::LanguageProfile,
    error::{RestructuringError, Result},
    identifier::Identifier,
    model::{
        Declaration, DeclarationKind, Document, NamePattern, ProjectSpec, ReferenceEdge, Revision,
    },
    providers::CodeModelProvider,
};

/// Suffix of project manifest documents
pub const PROJECT_MANIFEST_SUFFIX: &str = ".project.json";

/// Regex-driven provider for brace-delimited languages
pub struct TextCodeModelProvider {
    profile: LanguageProfile,
    namespace_re: Regex,
    import_re: Regex,
    declaration_re: Regex,
    token_re: Regex,
}

impl TextCodeModelProvider {
    /// Create a provider for `profile`
    pub fn new(profile: LanguageProfile) -> Result<Self> {
        profile.validate()?;

        let namespace_re = compile(&format!(
            r"(?m)^[ \t]*{}[ \t]+([A-Za-z_][\w.]*)",
            regex::escape(&profile.namespace_keyword)
        ))?;
        let import_re = compile(&format!(
            r"(?m)^[ \t]*{}[ \t]+([A-Za-z_][\w.]*)[ \t]*;[ \t]*\r?\n?",
            regex::escape(&profile.import_keyword)
        ))?;

        let modifiers = if profile.modifiers.is_empty() {
            String::new()
        } else {
            format!(r"(?:(?:{})[ \t]+)*", alternation(&profile.modifiers))
        };
        let declaration_re = compile(&format!(
            r"(?m)^[ \t]*{}({})[ \t]+([A-Za-z_]\w*)",
            modifiers,
            alternation(&profile.declaration_keywords)
        ))?;
        let token_re = compile(r"\b[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*")?;

        Ok(Self {
            profile,
            namespace_re,
            import_re,
            declaration_re,
            token_re,
        })
    }

    /// Provider for the default profile
    pub fn with_default_profile() -> Result<Self> {
        Self::new(LanguageProfile::default())
    }

    /// Profile in use
    pub fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.profile.extension)
    }

    fn is_manifest(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(PROJECT_MANIFEST_SUFFIX))
    }

    fn is_tracked(&self, path: &Path) -> bool {
        self.is_source(path) || Self::is_manifest(path)
    }

    /// Namespace declared by `content`, if any
    pub fn namespace_of(&self, content: &str) -> Option<Identifier> {
        self.namespace_re
            .captures(content)
            .and_then(|caps| Identifier::new(&caps[1]).ok())
    }

    /// Namespaces imported by `content`, in order of appearance
    pub fn imports_of(&self, content: &str) -> Vec<Identifier> {
        self.import_re
            .captures_iter(content)
            .filter_map(|caps| Identifier::new(&caps[1]).ok())
            .collect()
    }

    /// Top-level type declarations of a source document
    fn type_declarations(&self, document: &Document) -> Vec<Declaration> {
        let namespace = self.namespace_of(&document.content);
        let mut declarations = Vec::new();
        let mut covered_until = 0;

        for caps in self.declaration_re.captures_iter(&document.content) {
            let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if whole.start() < covered_until {
                continue;
            }

            let end = declaration_end(&document.content, name.end());
            covered_until = end;
            declarations.push(Declaration {
                name: name.as_str().to_string(),
                kind: DeclarationKind::Type(keyword.as_str().to_string()),
                namespace: namespace.clone(),
                path: document.path.clone(),
                span: whole.start()..end,
            });
        }

        declarations
    }

    /// Namespace -> simple names of the types it declares, across the revision
    fn namespace_index(&self, revision: &Revision) -> BTreeMap<Identifier, BTreeSet<String>> {
        let mut index: BTreeMap<Identifier, BTreeSet<String>> = BTreeMap::new();
        for document in revision.documents().filter(|d| self.is_source(&d.path)) {
            let Some(namespace) = self.namespace_of(&document.content) else {
                continue;
            };
            let types = index.entry(namespace).or_default();
            types.extend(
                self.type_declarations(document)
                    .into_iter()
                    .map(|declaration| declaration.name),
            );
        }
        index
    }

    fn unit_path(&self, namespace: &Identifier, name: &str) -> PathBuf {
        namespace
            .to_relative_path()
            .join(format!("{}.{}", name, self.profile.extension))
    }

    fn type_unit(&self, namespace: &Identifier, modifier: Option<&str>, name: &str) -> Document {
        let keyword = self
            .profile
            .declaration_keywords
            .first()
            .map(String::as_str)
            .unwrap_or("class");
        let modifier = modifier.map(|m| format!("{} ", m)).unwrap_or_default();

        Document::new(
            self.unit_path(namespace, name),
            format!(
                "{} {};\n\n{}{} {}\n{{\n}}\n",
                self.profile.namespace_keyword, namespace, modifier, keyword, name
            ),
        )
    }

    /// Rewrite every dotted token equal to `from` or nested under it
    fn rename_tokens(&self, content: &str, from: &Identifier, to: &Identifier) -> String {
        self.token_re
            .replace_all(content, |caps: &Captures| {
                let token = &caps[0];
                if token == from.as_str() {
                    return to.to_string();
                }
                match token.strip_prefix(from.as_str()) {
                    Some(rest) if rest.starts_with('.') => format!("{}{}", to, rest),
                    _ => token.to_string(),
                }
            })
            .into_owned()
    }
}

/// `name` with the `from` prefix replaced by `to`; `None` when it is not within `from`
fn rebase_name(name: &str, from: &Identifier, to: &Identifier) -> Option<String> {
    Identifier::new(name)
        .ok()?
        .rebase(from, to)
        .map(|renamed| renamed.to_string())
}

/// Manifest content with the project name and references renamed
fn rename_project(document: &Document, from: &Identifier, to: &Identifier) -> Result<Option<String>> {
    let mut project: ProjectSpec = serde_json::from_str(&document.content).map_err(|e| {
        RestructuringError::ProviderError(format!(
            "Invalid project manifest {}: {}",
            document.path.display(),
            e
        ))
    })?;

    let mut changed = false;
    for name in std::iter::once(&mut project.name).chain(project.references.iter_mut()) {
        if let Some(renamed) = rebase_name(name, from, to) {
            *name = renamed;
            changed = true;
        }
    }
    if !changed {
        return Ok(None);
    }

    let mut content = serde_json::to_string_pretty(&project)?;
    content.push('\n');
    Ok(Some(content))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        RestructuringError::InvalidConfiguration(format!("Invalid language profile pattern: {}", e))
    })
}

fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|")
}

/// End of a declaration starting before `from`: past the matching closing
/// brace, or past the terminating `;` for body-less declarations, plus one
/// trailing line break
fn declaration_end(content: &str, from: usize) -> usize {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut end = content.len();

    for (offset, byte) in bytes[from..].iter().enumerate() {
        match byte {
            b';' if depth == 0 => {
                end = from + offset + 1;
                break;
            }
            b'{' => depth += 1,
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    end = from + offset + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    let rest = &content[end..];
    if rest.starts_with("\r\n") {
        end + 2
    } else if rest.starts_with('\n') {
        end + 1
    } else {
        end
    }
}

/// Strip the indentation shared by every non-blank line
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl CodeModelProvider for TextCodeModelProvider {
    fn language(&self) -> &str {
        &self.profile.extension
    }

    async fn open(&self, root: &Path) -> Result<Revision> {
        let mut documents = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                RestructuringError::ProviderError(format!(
                    "Failed to read directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                let hidden = entry.file_name().to_string_lossy().starts_with('.');

                if file_type.is_dir() {
                    if !hidden {
                        pending.push(path);
                    }
                    continue;
                }
                if !file_type.is_file() || !self.is_tracked(&path) {
                    continue;
                }

                let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    RestructuringError::ProviderError(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let relative = path
                    .strip_prefix(root)
                    .map_err(|e| RestructuringError::ProviderError(e.to_string()))?;
                documents.push(Document::new(relative, content));
            }
        }

        info!(
            root = %root.display(),
            documents = documents.len(),
            language = %self.profile.extension,
            "Opened code model"
        );
        Ok(Revision::from_documents(documents))
    }

    fn find_declarations(
        &self,
        revision: &Revision,
        pattern: &NamePattern,
    ) -> Result<Vec<Declaration>> {
        let mut found = Vec::new();

        for document in revision.documents().filter(|d| self.is_source(&d.path)) {
            if let Some(caps) = self.namespace_re.captures(&document.content) {
                if let (Some(whole), Ok(namespace)) = (caps.get(0), Identifier::new(&caps[1])) {
                    if pattern.matches(namespace.as_str()) {
                        found.push(Declaration {
                            name: namespace.to_string(),
                            kind: DeclarationKind::Namespace,
                            namespace: Some(namespace),
                            path: document.path.clone(),
                            span: whole.range(),
                        });
                    }
                }
            }

            found.extend(
                self.type_declarations(document)
                    .into_iter()
                    .filter(|declaration| pattern.matches(&declaration.name)),
            );
        }

        Ok(found)
    }

    fn rename_namespace(
        &self,
        revision: Revision,
        from: &Identifier,
        to: &Identifier,
    ) -> Result<Revision> {
        let before = revision.sequence();
        let revision = revision.rewrite_documents(|document| {
            if Self::is_manifest(&document.path) {
                return rename_project(document, from, to);
            }
            if !self.is_source(&document.path) {
                return Ok(None);
            }
            Ok(Some(self.rename_tokens(&document.content, from, to)))
        })?;

        debug!(
            from = %from,
            to = %to,
            documents = revision.sequence() - before,
            "Renamed namespace"
        );
        Ok(revision)
    }

    fn remove_declaration(
        &self,
        document: &Document,
        declaration: &Declaration,
    ) -> Result<Document> {
        if declaration.path != document.path {
            return Err(RestructuringError::ProviderError(format!(
                "Declaration {} belongs to {}, not {}",
                declaration.name,
                declaration.path.display(),
                document.path.display()
            )));
        }

        let span = declaration.span.clone();
        let (Some(before), Some(after)) = (
            document.content.get(..span.start),
            document.content.get(span.end..),
        ) else {
            return Err(RestructuringError::ProviderError(format!(
                "Declaration {} is out of bounds in {}",
                declaration.name,
                document.path.display()
            )));
        };

        let after = if before.ends_with("\n\n") {
            after.trim_start_matches(|c| c == '\r' || c == '\n')
        } else {
            after
        };

        Ok(Document::new(
            document.path.clone(),
            format!("{}{}", before, after),
        ))
    }

    fn synthesize_unit(
        &self,
        source: &Document,
        declaration: &Declaration,
        namespace: &Identifier,
    ) -> Result<Document> {
        let body = source.content.get(declaration.span.clone()).ok_or_else(|| {
            RestructuringError::ProviderError(format!(
                "Declaration {} is out of bounds in {}",
                declaration.name,
                source.path.display()
            ))
        })?;

        let mut imports = self.imports_of(&source.content);
        if let Some(original) = &declaration.namespace {
            if original != namespace && !imports.contains(original) {
                imports.push(original.clone());
            }
        }
        imports.retain(|import| import != namespace);

        let mut content = String::new();
        for import in &imports {
            content.push_str(&format!("{} {};\n", self.profile.import_keyword, import));
        }
        if !imports.is_empty() {
            content.push('\n');
        }
        content.push_str(&format!(
            "{} {};\n\n{}\n",
            self.profile.namespace_keyword,
            namespace,
            dedent(body.trim_end())
        ));

        Ok(Document::new(
            self.unit_path(namespace, &declaration.name),
            content,
        ))
    }

    fn placeholder_unit(&self, namespace: &Identifier) -> Result<Document> {
        Ok(self.type_unit(namespace, None, &self.profile.placeholder_name))
    }

    fn stub_unit(&self, namespace: &Identifier, name: &str) -> Result<Document> {
        Identifier::new(name)?;
        let modifier = self.profile.modifiers.first().map(String::as_str);
        Ok(self.type_unit(namespace, modifier, name))
    }

    fn project_unit(&self, project: &ProjectSpec) -> Result<Document> {
        let mut content = serde_json::to_string_pretty(project)?;
        content.push('\n');
        let dir: PathBuf = project.name.split('.').collect();
        Ok(Document::new(
            dir.join(format!("{}{}", project.name, PROJECT_MANIFEST_SUFFIX)),
            content,
        ))
    }

    fn projects(&self, revision: &Revision) -> Result<Vec<ProjectSpec>> {
        revision
            .documents()
            .filter(|document| Self::is_manifest(&document.path))
            .map(|document| {
                serde_json::from_str(&document.content).map_err(|e| {
                    RestructuringError::ProviderError(format!(
                        "Invalid project manifest {}: {}",
                        document.path.display(),
                        e
                    ))
                })
            })
            .collect()
    }

    fn references(&self, revision: &Revision, document: &Document) -> Result<Vec<ReferenceEdge>> {
        if !self.is_source(&document.path) {
            return Ok(Vec::new());
        }
        let Some(enclosing) = self.namespace_of(&document.content) else {
            return Ok(Vec::new());
        };

        let index = self.namespace_index(revision);
        let body = self.import_re.replace_all(&document.content, "");
        let body = self.namespace_re.replace_all(&body, "");
        let tokens: BTreeSet<&str> = self.token_re.find_iter(&body).map(|m| m.as_str()).collect();
        let words: BTreeSet<&str> = tokens.iter().flat_map(|token| token.split('.')).collect();

        let mut edges: Vec<ReferenceEdge> = Vec::new();
        let mut add = |referenced: &Identifier| {
            let edge = ReferenceEdge {
                enclosing: enclosing.clone(),
                referenced: referenced.clone(),
            };
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        };

        for import in self.imports_of(&document.content) {
            if import == enclosing {
                continue;
            }
            if let Some(types) = index.get(&import) {
                if types.iter().any(|name| words.contains(name.as_str())) {
                    add(&import);
                }
            }
        }

        for (namespace, types) in &index {
            if *namespace == enclosing {
                continue;
            }
            let qualified_use = types.iter().any(|name| {
                let qualified = format!("{}.{}", namespace, name);
                tokens.iter().any(|token| {
                    *token == qualified
                        || token
                            .strip_prefix(qualified.as_str())
                            .is_some_and(|rest| rest.starts_with('.'))
                })
            });
            if qualified_use {
                add(namespace);
            }
        }

        Ok(edges)
    }

    fn relocated_path(&self, path: &Path, from: &Identifier, to: &Identifier) -> Result<PathBuf> {
        let relative = path.strip_prefix(from.to_relative_path()).map_err(|_| {
            RestructuringError::ProviderError(format!(
                "{} is not in the folder of {}",
                path.display(),
                from
            ))
        })?;
        let moved = to.to_relative_path().join(relative);

        // Manifests are named after their project, so they follow the rename
        let renamed = moved
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(PROJECT_MANIFEST_SUFFIX))
            .and_then(|project| rebase_name(project, from, to));
        Ok(match renamed {
            Some(project) => moved.with_file_name(format!("{}{}", project, PROJECT_MANIFEST_SUFFIX)),
            None => moved,
        })
    }

    async fn apply(&self, root: &Path, revision: &Revision) -> Result<()> {
        let mut written = 0usize;

        for document in revision.touched_documents() {
            let path = root.join(&document.path);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RestructuringError::ProviderError(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            tokio::fs::write(&path, &document.content).await.map_err(|e| {
                RestructuringError::ProviderError(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += 1;
        }

        debug!(root = %root.display(), written, "Applied revision");
        Ok(())
    }
}
