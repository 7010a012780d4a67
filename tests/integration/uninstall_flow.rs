use crate::integration::support::{install, run_in, MockRegistry, ScriptedResolver, ScriptedSelector, TestProject, AGENT, PROMPT};
use multikit::tooling::cli::Commands;
use multikit::tooling::CommandStatus;

fn uninstall(kit: &str) -> Commands {
    Commands::Uninstall {
        kit: Some(kit.to_string()),
    }
}

#[test]
fn uninstall_removes_files_and_entry() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));

    let (status, out) = project.run(uninstall("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert!(!project.github_file(AGENT).exists());
    assert!(!project.github_file(PROMPT).exists());
    assert!(!project.config().is_installed("testkit"));
    assert!(out.stdout.contains("✓ Uninstalled testkit (2 files removed)"));
}

#[test]
fn manually_deleted_files_still_remove_entry() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));
    std::fs::remove_file(project.github_file(AGENT)).unwrap();
    std::fs::remove_file(project.github_file(PROMPT)).unwrap();

    let (status, out) = project.run(uninstall("testkit"));

    assert_eq!(status, CommandStatus::Success);
    assert!(!project.config().is_installed("testkit"));
    assert!(out.stdout.contains("✓ Uninstalled testkit (0 files removed)"));
}

#[test]
fn untracked_files_are_left_alone() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));
    project.write("agents/mine.agent.md", "keep\n");

    project.run(uninstall("testkit"));

    assert_eq!(project.read("agents/mine.agent.md"), "keep\n");
}

#[test]
fn uninstall_unknown_kit_fails() {
    let project = TestProject::new(MockRegistry::with_testkit());

    let (status, out) = project.run(uninstall("testkit"));

    assert_eq!(status, CommandStatus::Failure);
    assert!(out.stderr.contains("✗ Kit 'testkit' is not installed"));
}

#[test]
fn interactive_uninstall_selects_one_kit() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));
    let context = project.context_with(ScriptedResolver::new(vec![]), ScriptedSelector::new(&["testkit"]));

    let (status, out) = run_in(&context, Commands::Uninstall { kit: None });

    assert_eq!(status, CommandStatus::Success);
    assert!(out.stdout.contains("✓ Uninstalled testkit (2 files removed)"));
}

#[test]
fn cancelled_selection_exits_cleanly() {
    let project = TestProject::new(MockRegistry::with_testkit());
    project.run(install("testkit"));

    let (status, out) = project.run(Commands::Uninstall { kit: None });

    assert_eq!(status, CommandStatus::Success);
    assert!(project.config().is_installed("testkit"));
    assert!(!out.stdout.contains("Uninstalled"));
}
