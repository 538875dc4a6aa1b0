//! Workflow tests for the restructuring engine
//!
//! These tests run the engine against real temporary trees:
//! - Two-phase rename into the source's own subtree
//! - Deferred deletion when a later transformation fails
//! - Namespace rename end to end
//! - Layer generation and reference wiring
//! - Backup and restore

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ricecoder_restructuring::{
    ArchitectureTemplate, BackupService, CodeModelProvider, ConflictKind, DeclarationKind,
    EngineSettings, EngineState, Identifier, NamePattern, RestructuringEngine, RestructuringError,
    TextCodeModelProvider, Transformation,
};
use tempfile::TempDir;

fn id(s: &str) -> Identifier {
    Identifier::new(s).unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Every file under `root` outside the backup store, with its bytes
fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                if !path.ends_with(".restructure") {
                    walk(root, &path, files);
                }
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, std::fs::read(&path).unwrap());
            }
        }
    }

    let mut files = BTreeMap::new();
    walk(root, root, &mut files);
    files
}

fn provider() -> Arc<TextCodeModelProvider> {
    Arc::new(TextCodeModelProvider::with_default_profile().unwrap())
}

fn engine(provider: Arc<TextCodeModelProvider>) -> RestructuringEngine {
    RestructuringEngine::new(provider, EngineSettings::default())
}

fn rename(source: &str, target: &str) -> Transformation {
    Transformation::RenameNamespace {
        source: id(source),
        target: id(target),
    }
}

fn old_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "Old/X/Alpha.cs",
        "using Old.Y;\n\nnamespace Old.X;\n\npublic class Alpha\n{\n    private Beta beta;\n}\n",
    );
    write(
        dir.path(),
        "Old/Y/Beta.cs",
        "namespace Old.Y;\n\npublic class Beta\n{\n}\n",
    );
    write(
        dir.path(),
        "App/Program.cs",
        "using Old.X;\n\nnamespace App;\n\npublic class Program\n{\n    private Alpha alpha;\n}\n",
    );
    dir
}

async fn namespaces(provider: &TextCodeModelProvider, root: &Path) -> BTreeSet<String> {
    let revision = provider.open(root).await.unwrap();
    provider
        .find_declarations(&revision, &NamePattern::parse("*").unwrap())
        .unwrap()
        .into_iter()
        .filter(|d| d.kind == DeclarationKind::Namespace)
        .map(|d| d.name)
        .collect()
}

#[tokio::test]
async fn test_rename_end_to_end() -> ricecoder_restructuring::Result<()> {
    let dir = old_tree();
    let provider = provider();
    let mut engine = engine(provider.clone());

    engine.initialize(dir.path()).await?;
    let report = engine.run(&[rename("Old", "New")]).await?;

    assert_eq!(
        report.deleted,
        vec![PathBuf::from("Old/X/Alpha.cs"), PathBuf::from("Old/Y/Beta.cs")]
    );
    assert!(report.skipped.is_empty());
    assert!(!dir.path().join("Old").exists());

    let found = namespaces(&provider, dir.path()).await;
    assert!(found.contains("New.X"));
    assert!(found.contains("New.Y"));
    assert!(!found.iter().any(|ns| ns == "Old" || ns.starts_with("Old.")));

    let alpha = std::fs::read_to_string(dir.path().join("New/X/Alpha.cs"))?;
    assert!(alpha.starts_with("using New.Y;\n\nnamespace New.X;"));
    let program = std::fs::read_to_string(dir.path().join("App/Program.cs"))?;
    assert!(program.starts_with("using New.X;"));

    // New had no document of its own
    assert!(dir.path().join("New/NamespaceInfo.cs").exists());

    let outcome = &engine.report()[0];
    assert_eq!(outcome.modified, vec![PathBuf::from("App/Program.cs")]);
    assert_eq!(outcome.relocated.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_two_phase_rename_into_own_subtree() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "A/B/Thing.cs",
        "namespace A.B;\n\npublic class Thing\n{\n}\n",
    );
    write(
        dir.path(),
        "A/Other.cs",
        "using A.B;\n\nnamespace A;\n\npublic class Other\n{\n    private Thing thing;\n}\n",
    );

    let provider = provider();
    let mut engine = engine(provider.clone());
    engine.initialize(dir.path()).await?;
    engine.run(&[rename("A.B", "A.B.C")]).await?;

    let revision = provider.open(dir.path()).await?;
    let temp = NamePattern::parse("*__restructure_tmp_*")?;
    assert!(provider.find_declarations(&revision, &temp)?.is_empty());
    assert!(revision
        .documents()
        .all(|doc| !doc.content.contains("__restructure_tmp_")));

    let finals = provider.find_declarations(&revision, &NamePattern::exact("A.B.C"))?;
    let distinct: BTreeSet<_> = finals.iter().map(|d| d.name.clone()).collect();
    assert_eq!(distinct.len(), 1);
    assert!(provider
        .find_declarations(&revision, &NamePattern::exact("A.B"))?
        .is_empty());
    assert!(provider
        .find_declarations(&revision, &NamePattern::exact("A.B.C.C"))?
        .is_empty());

    assert!(dir.path().join("A/B/C/Thing.cs").exists());
    assert!(!dir.path().join("A/B/Thing.cs").exists());
    assert!(std::fs::read_to_string(dir.path().join("A/Other.cs"))?.starts_with("using A.B.C;"));
    Ok(())
}

#[tokio::test]
async fn test_failure_at_later_step_deletes_nothing() -> ricecoder_restructuring::Result<()> {
    let dir = old_tree();
    let before = snapshot_tree(dir.path());

    let mut engine = engine(provider());
    engine.initialize(dir.path()).await?;

    let result = engine
        .run(&[
            rename("Old", "New"),
            Transformation::ExtractClass {
                class_name: "Missing".to_string(),
                target_namespace: id("New.Z"),
            },
        ])
        .await;

    assert!(matches!(result, Err(RestructuringError::DeclarationNotFound(_))));
    assert_eq!(engine.state(), EngineState::Failed);
    assert_eq!(snapshot_tree(dir.path()), before);
    Ok(())
}

#[tokio::test]
async fn test_layer_violation_aborts_whole_run() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "Shop/Orders/Order.cs",
        "using Shop.Infrastructure;\n\nnamespace Shop.Orders;\n\npublic class Order\n{\n    private Db db;\n}\n",
    );
    write(
        dir.path(),
        "Shop/Infrastructure/Db.cs",
        "namespace Shop.Infrastructure;\n\npublic class Db\n{\n}\n",
    );
    write(dir.path(), "Legacy/Tool.cs", "namespace Legacy;\n\npublic class Tool\n{\n}\n");
    let before = snapshot_tree(dir.path());

    let mut engine = engine(provider());
    engine.initialize(dir.path()).await?;

    engine.apply_transformation(&rename("Legacy", "Tools"))?;
    let result = engine.apply_transformation(&Transformation::MoveNamespace {
        source: id("Shop.Orders"),
        target: id("Shop.Domain.Orders"),
    });

    match result {
        Err(RestructuringError::ValidationConflict { conflicts, .. }) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].kind, ConflictKind::LayerViolation);
            assert_eq!(conflicts[0].conflicting_dependency, id("Shop.Infrastructure"));
        }
        other => panic!("expected a validation conflict, got {:?}", other.map(|o| o.description)),
    }

    assert!(engine.commit_changes().await.is_err());
    assert_eq!(snapshot_tree(dir.path()), before);
    Ok(())
}

#[tokio::test]
async fn test_generate_domain_layer() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "Legacy/Tool.cs", "namespace Legacy;\n\npublic class Tool\n{\n}\n");

    let provider = provider();
    let mut engine = engine(provider.clone());
    engine.initialize(dir.path()).await?;
    engine
        .run(&[Transformation::GenerateLayer {
            name: id("Domain"),
            subfolders: vec!["Entities".to_string(), "ValueObjects".to_string()],
            options: BTreeMap::new(),
        }])
        .await?;

    let revision = provider.open(dir.path()).await?;
    let projects = provider.projects(&revision)?;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Domain");
    assert!(projects[0].references.is_empty());

    for namespace in ["Domain.Entities", "Domain.ValueObjects"] {
        let stubs: Vec<_> = provider
            .find_declarations(&revision, &NamePattern::parse("*Marker")?)?
            .into_iter()
            .filter(|d| d.namespace.as_ref().map(Identifier::as_str) == Some(namespace))
            .collect();
        assert_eq!(stubs.len(), 1, "one stub in {}", namespace);
    }
    assert!(dir.path().join("Domain/Entities/EntitiesMarker.cs").exists());
    assert!(dir.path().join("Domain/ValueObjects/ValueObjectsMarker.cs").exists());
    Ok(())
}

#[tokio::test]
async fn test_generate_existing_project_fails() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "Domain/Domain.project.json",
        "{ \"name\": \"Domain\", \"references\": [] }\n",
    );

    let mut engine = engine(provider());
    engine.initialize(dir.path()).await?;
    let result = engine.apply_transformation(&Transformation::GenerateLayer {
        name: id("Domain"),
        subfolders: Vec::new(),
        options: BTreeMap::new(),
    });
    assert!(matches!(result, Err(RestructuringError::InvalidTransformation(_))));
    Ok(())
}

#[tokio::test]
async fn test_clean_template_wires_references() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    let provider = provider();
    let mut engine = engine(provider.clone());
    engine.initialize(dir.path()).await?;

    let transformations = ArchitectureTemplate::clean().transformations()?;
    engine.run(&transformations).await?;

    let revision = provider.open(dir.path()).await?;
    let references: BTreeMap<_, _> = provider
        .projects(&revision)?
        .into_iter()
        .map(|p| (p.name, p.references))
        .collect();

    assert_eq!(references["Domain"], Vec::<String>::new());
    assert_eq!(references["Application"], vec!["Domain"]);
    assert_eq!(references["Infrastructure"], vec!["Application", "Domain"]);
    assert_eq!(references["Presentation"], vec!["Application"]);
    assert!(dir.path().join("Infrastructure/Services/ServicesMarker.cs").exists());
    Ok(())
}

#[tokio::test]
async fn test_extract_class_end_to_end() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "Shop/Domain/Order.cs",
        "namespace Shop.Domain;\n\npublic class Order\n{\n}\n\npublic class OrderLine\n{\n}\n",
    );

    let mut engine = engine(provider());
    engine.initialize(dir.path()).await?;
    engine
        .run(&[Transformation::ExtractClass {
            class_name: "OrderLine".to_string(),
            target_namespace: id("Shop.Domain.Lines"),
        }])
        .await?;

    let original = std::fs::read_to_string(dir.path().join("Shop/Domain/Order.cs"))?;
    assert!(!original.contains("OrderLine"));
    let extracted = std::fs::read_to_string(dir.path().join("Shop/Domain/Lines/OrderLine.cs"))?;
    assert!(extracted.contains("namespace Shop.Domain.Lines;"));
    assert!(extracted.contains("public class OrderLine"));
    Ok(())
}

#[tokio::test]
async fn test_backup_restore_round_trip() -> ricecoder_restructuring::Result<()> {
    let dir = old_tree();
    std::fs::write(dir.path().join("logo.bin"), [0u8, 159, 146, 150, 255])?;
    let before = snapshot_tree(dir.path());

    let service = BackupService::default();
    let snapshot = service.create_backup(dir.path()).await?;
    service.restore_backup(&snapshot).await?;

    assert_eq!(snapshot_tree(dir.path()), before);
    Ok(())
}

#[tokio::test]
async fn test_manual_restore_after_commit() -> ricecoder_restructuring::Result<()> {
    let dir = old_tree();
    let before = snapshot_tree(dir.path());

    let mut engine = engine(provider());
    engine.initialize(dir.path()).await?;
    engine.run(&[rename("Old", "New")]).await?;
    assert!(!dir.path().join("Old/X/Alpha.cs").exists());

    assert_eq!(engine.restore_backup().await?, before.len());
    let after = snapshot_tree(dir.path());
    for (path, bytes) in &before {
        assert_eq!(after.get(path), Some(bytes), "{} restored", path.display());
    }
    Ok(())
}

#[tokio::test]
async fn test_rename_onto_existing_file_is_rejected() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "Old/Thing.cs",
        "namespace Old;\n\npublic class OldThing\n{\n}\n",
    );
    write(
        dir.path(),
        "New/Thing.cs",
        "namespace New;\n\npublic class NewThing\n{\n}\n",
    );
    let before = snapshot_tree(dir.path());

    let mut engine = engine(provider());
    engine.initialize(dir.path()).await?;
    let result = engine.apply_transformation(&rename("Old", "New"));

    match result {
        Err(RestructuringError::InvalidTransformation(message)) => {
            assert!(message.contains("New/Thing.cs"), "{}", message);
        }
        other => panic!("expected a collision error, got {:?}", other.map(|o| o.description)),
    }
    assert_eq!(engine.state(), EngineState::Failed);
    assert!(engine.commit_changes().await.is_err());
    assert_eq!(snapshot_tree(dir.path()), before);
    Ok(())
}

#[tokio::test]
async fn test_rename_moves_and_renames_project_manifest() -> ricecoder_restructuring::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "Old/Old.project.json",
        "{\n  \"name\": \"Old\",\n  \"references\": []\n}\n",
    );
    write(dir.path(), "Old/Thing.cs", "namespace Old;\n\npublic class Thing\n{\n}\n");
    write(
        dir.path(),
        "App/App.project.json",
        "{\n  \"name\": \"App\",\n  \"references\": [\"Old\"]\n}\n",
    );

    let provider = provider();
    let mut engine = engine(provider.clone());
    engine.initialize(dir.path()).await?;
    engine.run(&[rename("Old", "New")]).await?;

    assert!(!dir.path().join("Old").exists());
    assert!(!dir.path().join("New/Old.project.json").exists());
    assert!(dir.path().join("New/New.project.json").exists());

    let revision = provider.open(dir.path()).await?;
    let projects: BTreeMap<String, Vec<String>> = provider
        .projects(&revision)?
        .into_iter()
        .map(|project| (project.name, project.references))
        .collect();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects["New"], Vec::<String>::new());
    assert_eq!(projects["App"], vec!["New".to_string()]);

    let outcome = &engine.report()[0];
    assert!(outcome.relocated.contains(&(
        PathBuf::from("Old/Old.project.json"),
        PathBuf::from("New/New.project.json")
    )));
    assert_eq!(outcome.modified, vec![PathBuf::from("App/App.project.json")]);
    Ok(())
}
