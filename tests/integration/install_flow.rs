use crate::integration::support::{
    install, run_in, MockRegistry, ScriptedResolver, ScriptedSelector, TestProject, AGENT, PROMPT,
};
use multikit::installer::OverwriteChoice;
use multikit::tooling::cli::Commands;
use multikit::tooling::CommandStatus;

#[test]
fn install_into_empty_project() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(install("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(project.read(AGENT), "agent v1\n");
    assert_eq!(project.read(PROMPT), "prompt v1\n");
    let config = project.config();
    let kit = config.get_kit("testkit").unwrap();
    assert_eq!(kit.version, "1.0.0");
    assert_eq!(kit.source, "remote");
    assert_eq!(kit.files, vec![AGENT.to_string(), PROMPT.to_string()]);
    assert!(out.stdout.contains("✓ Installed testkit v1.0.0"));
    assert!(out.stderr.is_empty());
}

#[test]
fn reinstall_is_idempotent() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));
    let before = std::fs::read(project.github_file(AGENT)).unwrap();

    let (status, out) = project.run(install("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(std::fs::read(project.github_file(AGENT)).unwrap(), before);
    assert_eq!(project.config().get_kit("testkit").unwrap().version, "1.0.0");
    assert!(out.stdout.contains(&format!("✓ {} (unchanged)", AGENT)));
}

#[test]
fn missing_file_aborts_whole_kit() {
    let registry = MockRegistry::with_testkit();
    registry.remove(&format!("testkit/{}", PROMPT));
    let project = TestProject::new(registry);

    let (status, out) = project.run(install("testkit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(!project.github_file(AGENT).exists());
    assert!(!project.github_file(PROMPT).exists());
    assert!(project.config().kits.is_empty());
    assert!(out.stderr.contains("✗ File not found:"));
    assert!(out.stderr.contains(PROMPT));
}

#[test]
fn unknown_kit_reports_not_found() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(install("nope"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out.stderr.contains("✗ Kit 'nope' not found"));
}

#[test]
fn invalid_kit_name_is_rejected_before_fetching() {
    let registry = MockRegistry::with_testkit();
    let project = TestProject::new(registry.clone());

    let (status, out) = project.run(install("Bad_Kit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out.stderr.starts_with("✗ "));
    assert!(registry.requests().is_empty());
}

#[test]
fn declined_conflict_keeps_local_edits() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.write(AGENT, "my edits\n");
    let resolver = ScriptedResolver::new(vec![OverwriteChoice::No]);
    let asked = resolver.asked.clone();
    let context = project.context_with(resolver, ScriptedSelector::new(&[]));

    let (status, out) = run_in(&context, install("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(*asked.lock(), vec![AGENT.to_string()]);
    assert_eq!(project.read(AGENT), "my edits\n");
    assert_eq!(project.read(PROMPT), "prompt v1\n");
    assert_eq!(project.config().get_kit("testkit").unwrap().files, vec![PROMPT.to_string()]);
    assert!(out.stdout.contains(&format!("Conflict: {}", AGENT)));
    assert!(out.stdout.contains("-my edits"));
    assert!(out.stdout.contains("+agent v1"));
}

#[test]
fn force_overwrites_without_asking() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.write(AGENT, "my edits\n");
    let resolver = ScriptedResolver::new(vec![]);
    let asked = resolver.asked.clone();
    let context = project.context_with(resolver, ScriptedSelector::new(&[]));

    let (status, _) = run_in(
        &context,
        Commands::Install {
            kit: Some("testkit".to_string()),
            force: true,
            registry: None,
        },
    );

    assert_eq!(status, CommandStatus::Success);
    assert!(asked.lock().is_empty());
    assert_eq!(project.read(AGENT), "agent v1\n");
}

#[test]
fn registry_flag_overrides_configured_url() {
    let registry = MockRegistry::new("https://mirror.example.com/kits");
    registry.publish_testkit("3.0.0", "mirror agent\n", "mirror prompt\n");
    let project = TestProject::new(registry);

    let (status, _) = project.run(Commands::Install {
        kit: Some("testkit".to_string()),
        force: false,
        registry: Some("https://mirror.example.com/kits/".to_string()),
    });

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(project.read(AGENT), "mirror agent\n");
    let config = project.config();
    assert_eq!(config.get_kit("testkit").unwrap().version, "3.0.0");
    assert_ne!(config.registry_url, "https://mirror.example.com/kits/");
}

#[test]
fn interactive_batch_isolates_failures() {
    let registry = MockRegistry::with_testkit();
    registry.set(
        "registry.json",
        r#"{"kits": [
            {"name": "testkit", "version": "1.0.0"},
            {"name": "broken", "version": "0.1.0"}
        ]}"#,
    );
    let project = TestProject::new(registry);
    let selector = ScriptedSelector::new(&["testkit", "broken"]);
    let context = project.context_with(ScriptedResolver::new(vec![]), selector);

    let (status, out) = run_in(
        &context,
        Commands::Install {
            kit: None,
            force: false,
            registry: None,
        },
    );

    assert_eq!(status, CommandStatus::Failure);
    assert!(project.config().is_installed("testkit"));
    assert!(!project.config().is_installed("broken"));
    assert!(out.stderr.contains("✗ Failed to install: broken"));
}

#[test]
fn interactive_install_offers_only_uninstalled_kits() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));
    let selector = ScriptedSelector::new(&[]);
    let offered = selector.offered.clone();
    let context = project.context_with(ScriptedResolver::new(vec![]), selector);

    let (status, out) = run_in(
        &context,
        Commands::Install {
            kit: None,
            force: false,
            registry: None,
        },
    );

    assert_eq!(status, CommandStatus::Success);
    assert!(offered.lock().is_empty());
    assert!(out.stdout.contains("No kits available to install."));
}

#[test]
fn update_requires_installed_kit() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(Commands::Update {
        kit: Some("testkit".to_string()),
        force: false,
        registry: None,
    });

    assert_eq!(status, CommandStatus::Failure);
    assert!(out.stderr.contains("✗ Kit 'testkit' is not installed"));
}

#[test]
fn update_pulls_new_version() {
    let registry = MockRegistry::with_testkit();
    let project = TestProject::new(registry.clone());
    project.run(install("testkit"));
    registry.publish_testkit("1.1.0", "agent v2\n", "prompt v1\n");
    let context = project.context_with(
        ScriptedResolver::new(vec![OverwriteChoice::Yes]),
        ScriptedSelector::new(&[]),
    );

    let (status, out) = run_in(
        &context,
        Commands::Update {
            kit: Some("testkit".to_string()),
            force: false,
            registry: None,
        },
    );

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(project.read(AGENT), "agent v2\n");
    assert_eq!(project.config().get_kit("testkit").unwrap().version, "1.1.0");
    assert!(out.stdout.contains("Updating 'testkit'..."));
    assert!(out.stdout.contains("✓ Installed testkit v1.1.0"));
}
