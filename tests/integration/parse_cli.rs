use clap::{CommandFactory, Parser};
use multikit::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["multikit", "init"],
        vec!["multikit", "init", "./project"],
        vec!["multikit", "install"],
        vec!["multikit", "install", "testkit", "--force"],
        vec!["multikit", "install", "testkit", "--registry", "https://kits.example.com"],
        vec!["multikit", "update"],
        vec!["multikit", "update", "testkit", "--force"],
        vec!["multikit", "uninstall", "testkit"],
        vec!["multikit", "list"],
        vec!["multikit", "diff"],
        vec!["multikit", "--verbose", "diff", "testkit"],
        vec!["multikit", "list", "--log-level", "debug", "--log-output", "stderr"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_invocations() {
    assert!(Cli::try_parse_from(["multikit"]).is_err());
    assert!(Cli::try_parse_from(["multikit", "list", "extra"]).is_err());
    assert!(Cli::try_parse_from(["multikit", "uninstall", "--force"]).is_err());
}

#[test]
fn update_keeps_flags() {
    let cli = Cli::try_parse_from(["multikit", "update", "--registry", "https://m.example.com"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Update {
            kit: None,
            force: false,
            registry: Some("https://m.example.com".to_string()),
        }
    );
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
