use crate::integration::support::{install, run_in, MockRegistry, ScriptedResolver, ScriptedSelector, TestProject, AGENT, PROMPT};
use multikit::tooling::cli::Commands;
use multikit::tooling::CommandStatus;

fn diff(kit: &str) -> Commands {
    Commands::Diff {
        kit: Some(kit.to_string()),
    }
}

fn installed_project() -> TestProject {
    let project = TestProject::new(MockRegistry::with_testkit());
    let (status, _) = project.run(install("testkit"));
    assert_eq!(status, CommandStatus::Success);
    project
}

#[test]
fn matching_files_report_no_changes() {
    let project = installed_project();

    let (status, out) = project.run(diff("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert!(out
        .stdout
        .contains("Comparing testkit (local v1.0.0 ↔ remote v1.0.0)"));
    assert!(out.stdout.contains("✓ No changes detected for testkit"));
}

#[test]
fn local_edit_is_shown_and_fails() {
    let project = installed_project();
    project.write(AGENT, "agent v1\nlocal note\n");

    let (status, out) = project.run(diff("testkit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out.stdout.contains("--- local/testkit.testAgent.agent.md"));
    assert!(out.stdout.contains("+++ remote/testkit.testAgent.agent.md"));
    assert!(out.stdout.contains("-local note"));
    assert!(out.stdout.contains("✓ 1 file(s) changed, 1 unchanged"));
}

#[test]
fn deleted_local_file_counts_as_changed() {
    let project = installed_project();
    std::fs::remove_file(project.github_file(PROMPT)).unwrap();

    let (status, out) = project.run(diff("testkit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out
        .stdout
        .contains(&format!("✗ Local file missing: {}", PROMPT)));
}

#[test]
fn unfetchable_remote_file_is_a_warning() {
    let registry = MockRegistry::with_testkit();
    let project = TestProject::new(registry.clone());
    project.run(install("testkit"));
    registry.remove(&format!("testkit/{}", AGENT));

    let (status, out) = project.run(diff("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert!(out
        .stderr
        .contains(&format!("⚠ Could not fetch remote {}", AGENT)));
    assert!(out.stdout.contains("✓ No changes detected for testkit"));
}

#[test]
fn kit_missing_from_registry() {
    let registry = MockRegistry::with_testkit();
    let project = TestProject::new(registry.clone());
    project.run(install("testkit"));
    registry.remove("testkit/manifest.json");

    let (status, out) = project.run(diff("testkit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out
        .stderr
        .contains("✗ Kit 'testkit' not found in remote registry"));
}

#[test]
fn diff_of_uninstalled_kit_fails() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(diff("testkit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out.stderr.contains("✗ Kit 'testkit' is not installed"));
}

#[test]
fn interactive_diff_offers_installed_kits() {
    let project = installed_project();
    let selector = ScriptedSelector::new(&["testkit"]);
    let offered = selector.offered.clone();
    let context = project.context_with(ScriptedResolver::new(vec![]), selector);

    let (status, _) = run_in(&context, Commands::Diff { kit: None });

    assert_eq!(status, CommandStatus::Success);
    assert_eq!(*offered.lock(), vec![vec!["testkit".to_string()]]);
}

#[test]
fn interactive_diff_with_nothing_installed() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(Commands::Diff { kit: None });

    assert_eq!(status, CommandStatus::Success);
    assert!(out.stdout.contains("No kits installed."));
}
