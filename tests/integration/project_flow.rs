use crate::integration::support::{install, MockRegistry, TestProject};
use multikit::config::{config_path, save_config, MultikitConfig, CONFIG_FILE_NAME};
use multikit::tooling::cli::Commands;
use multikit::tooling::CommandStatus;
use std::path::PathBuf;

#[test]
fn init_creates_layout_and_config() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(Commands::Init {
        path: PathBuf::from("."),
    });

    assert_eq!(status, CommandStatus::Success);
    assert!(project.path().join(".github/agents").is_dir());
    assert!(project.path().join(".github/prompts").is_dir());
    assert!(config_path(project.path()).exists());
    assert_eq!(project.config(), MultikitConfig::default());
    let canonical = project.path().canonicalize().unwrap();
    assert!(out
        .stdout
        .contains(&format!("✓ Initialized multikit in {}", canonical.display())));
}

#[test]
fn init_keeps_existing_config() {
    let project = TestProject::new(MockRegistry::with_testkit());
    let custom = MultikitConfig {
        registry_url: "https://kits.example.com".to_string(),
        ..MultikitConfig::default()
    };
    save_config(project.path(), &custom).unwrap();

    let (status, _) = project.run(Commands::Init {
        path: PathBuf::from("."),
    });

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(project.config().registry_url, "https://kits.example.com");
}

#[test]
fn init_relative_subdirectory() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, _) = project.run(Commands::Init {
        path: PathBuf::from("nested/app"),
    });

    assert_eq!(status, CommandStatus::Success);
    assert!(project.path().join("nested/app/.github/agents").is_dir());
    assert!(project.path().join("nested/app").join(CONFIG_FILE_NAME).exists());
}

#[test]
fn list_shows_registry_and_install_state() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(Commands::List);
    assert_eq!(status, CommandStatus::Success);
    assert!(out.stdout.contains("testkit"));
    assert!(out.stdout.contains("❌ Available"));

    project.run(install("testkit"));
    let (_, out) = project.run(Commands::List);
    assert!(out.stdout.contains("✅ Installed"));
}

#[test]
fn list_without_registry_shows_local_kits() {
    let registry = MockRegistry::with_testkit();
    let project = TestProject::new(registry.clone());
    project.run(install("testkit"));
    registry.remove("registry.json");

    let (status, out) = project.run(Commands::List);

    assert_eq!(status, CommandStatus::Success);
    assert!(out
        .stderr
        .contains("⚠ Could not fetch remote registry. Showing local kits only."));
    assert!(out.stdout.contains("testkit"));
}

#[test]
fn list_with_nothing_to_show() {
    let registry = MockRegistry::with_testkit();
    registry.remove("registry.json");
    let project = TestProject::new(registry);

    let (status, out) = project.run(Commands::List);

    assert_eq!(status, CommandStatus::Success);
    assert!(out.stdout.contains("No kits found."));
}

#[test]
fn corrupted_config_is_backed_up_and_recovered() {
    let project = TestProject::new(MockRegistry::with_testkit());
    std::fs::write(config_path(project.path()), "[multikit\nbroken = ").unwrap();

    let (status, out) = project.run(install("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert!(out.stderr.contains("Corrupted multikit.toml detected"));
    let backups: Vec<_> = std::fs::read_dir(project.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("multikit.toml.corrupted.")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(project.config().is_installed("testkit"));
}
