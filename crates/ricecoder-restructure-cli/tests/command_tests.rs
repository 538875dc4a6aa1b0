//! Command tests
//!
//! Runs the commands against temporary codebases.

use std::path::Path;

use ricecoder_restructure_cli::commands::{
    BackupsCommand, GenerateCommand, RestoreCommand, RestructureCommand,
};
use ricecoder_restructure_cli::error::CliError;
use ricecoder_restructure_cli::output::OutputStyle;
use ricecoder_restructuring::{RestructuringError, BACKUP_FOLDER};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn codebase() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "Old/Core/Widget.cs",
        "namespace Old.Core;\n\npublic class Widget\n{\n}\n",
    );
    write(
        dir.path(),
        "App/Program.cs",
        "using Old.Core;\n\nnamespace App;\n\npublic class Program\n{\n    private Widget widget;\n}\n",
    );
    dir
}

fn config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("restructure.json");
    std::fs::write(&path, body).unwrap();
    path
}

const RENAME_CONFIG: &str = r#"{
  "transformations": [
    { "kind": "RenameNamespace", "source": "Old", "target": "Modern" }
  ]
}"#;

#[tokio::test]
async fn test_restructure_commits_and_backs_up() {
    let dir = codebase();
    let config_dir = TempDir::new().unwrap();
    let config = config(&config_dir, RENAME_CONFIG);

    let report = RestructureCommand::new(dir.path().to_path_buf(), config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    let commit = report.commit.expect("commit report");
    assert_eq!(commit.deleted.len(), 1);
    assert!(report.backup_id.is_some());

    assert!(!dir.path().join("Old/Core/Widget.cs").exists());
    let widget = std::fs::read_to_string(dir.path().join("Modern/Core/Widget.cs")).unwrap();
    assert!(widget.starts_with("namespace Modern.Core;"));
    let program = std::fs::read_to_string(dir.path().join("App/Program.cs")).unwrap();
    assert!(program.starts_with("using Modern.Core;"));
    assert!(dir.path().join(BACKUP_FOLDER).is_dir());
}

#[tokio::test]
async fn test_restructure_dry_run_leaves_tree_alone() {
    let dir = codebase();
    let config_dir = TempDir::new().unwrap();
    let config = config(&config_dir, RENAME_CONFIG);

    let report = RestructureCommand::new(dir.path().to_path_buf(), config)
        .with_dry_run(true)
        .run()
        .await
        .unwrap();

    assert!(report.commit.is_none());
    assert!(report.backup_id.is_none());
    assert!(report
        .preview
        .change(Path::new("Modern/Core/Widget.cs"))
        .is_some());
    assert!(dir.path().join("Old/Core/Widget.cs").exists());
    assert!(!dir.path().join("Modern").exists());
    assert!(!dir.path().join(BACKUP_FOLDER).exists());
}

#[tokio::test]
async fn test_restructure_rejects_unknown_kind() {
    let dir = codebase();
    let config_dir = TempDir::new().unwrap();
    let config = config(
        &config_dir,
        r#"{ "transformations": [ { "kind": "InlineClass", "source": "Widget" } ] }"#,
    );

    let result = RestructureCommand::new(dir.path().to_path_buf(), config)
        .run()
        .await;

    assert!(matches!(
        result,
        Err(CliError::Restructuring(
            RestructuringError::UnsupportedTransformation(_)
        ))
    ));
    assert!(!dir.path().join(BACKUP_FOLDER).exists());
}

#[tokio::test]
async fn test_missing_solution_is_invalid_argument() {
    let config_dir = TempDir::new().unwrap();
    let config = config(&config_dir, RENAME_CONFIG);

    let result = RestructureCommand::new(config_dir.path().join("nowhere"), config)
        .run()
        .await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_generate_clean_template() {
    let dir = codebase();

    let report = GenerateCommand::new(dir.path().to_path_buf(), "clean".to_string())
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 4);
    for layer in ["Domain", "Application", "Infrastructure", "Presentation"] {
        let manifest = dir.path().join(layer).join(format!("{}.project.json", layer));
        assert!(manifest.exists(), "{} manifest", layer);
    }
    assert!(dir
        .path()
        .join("Presentation/Controllers/ControllersMarker.cs")
        .exists());
}

#[tokio::test]
async fn test_generate_unknown_template() {
    let dir = codebase();
    let result = GenerateCommand::new(dir.path().to_path_buf(), "hexagonal".to_string())
        .run()
        .await;

    match result {
        Err(error) => assert!(error.user_message().contains("hexagonal")),
        Ok(_) => panic!("expected an unknown template error"),
    }
}

#[tokio::test]
async fn test_backups_and_restore() {
    let dir = codebase();
    let config_dir = TempDir::new().unwrap();
    let config = config(&config_dir, RENAME_CONFIG);
    RestructureCommand::new(dir.path().to_path_buf(), config)
        .run()
        .await
        .unwrap();

    let backups = BackupsCommand::new(dir.path().to_path_buf());
    let snapshots = backups.run().await.unwrap();
    assert_eq!(snapshots.len(), 1);
    let listing = backups.render(&snapshots, &OutputStyle::plain()).unwrap();
    assert!(listing.contains(&snapshots[0].id));
    assert!(listing.contains("2 file(s)"));

    let (snapshot, restored) = RestoreCommand::new(dir.path().to_path_buf())
        .run()
        .await
        .unwrap();
    assert_eq!(snapshot.id, snapshots[0].id);
    assert_eq!(restored, 2);

    let widget = std::fs::read_to_string(dir.path().join("Old/Core/Widget.cs")).unwrap();
    assert!(widget.starts_with("namespace Old.Core;"));
    let program = std::fs::read_to_string(dir.path().join("App/Program.cs")).unwrap();
    assert!(program.starts_with("using Old.Core;"));
    // Relocated files outlive the restore, and the summary says so
    assert!(dir.path().join("Modern/Core/Widget.cs").exists());
    let summary = RestoreCommand::summary(&snapshot, restored, &OutputStyle::plain());
    assert!(summary.contains(&format!("Restored 2 file(s) from backup {}", snapshot.id)));
    assert!(summary.contains("⚠ Files created after"));
}

#[tokio::test]
async fn test_backups_json_listing() {
    let dir = codebase();
    let backups = BackupsCommand::new(dir.path().to_path_buf()).with_json(true);
    let rendered = backups.render(&[], &OutputStyle::plain()).unwrap();
    assert_eq!(rendered, "[]");
}

#[tokio::test]
async fn test_restore_without_backups() {
    let dir = codebase();
    let result = RestoreCommand::new(dir.path().to_path_buf()).run().await;
    assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_restore_unknown_id() {
    let dir = codebase();
    let result = RestoreCommand::new(dir.path().to_path_buf())
        .with_backup(Some("19700101_000000_000000".to_string()))
        .run()
        .await;
    assert!(matches!(
        result,
        Err(CliError::Restructuring(RestructuringError::RestoreFailed(_)))
    ));
}
