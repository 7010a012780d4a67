//! Per-file overwrite decisions for conflicting local files.

use crate::error::ValidationError;
use std::str::FromStr;
use tracing::{debug, warn};

/// Decision for one conflicting file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteChoice {
    /// Overwrite this file.
    Yes,
    /// Keep the local file.
    No,
    /// Overwrite this and every remaining conflict without asking.
    All,
    /// Keep this and skip every remaining file without asking.
    SkipAll,
}

impl FromStr for OverwriteChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(OverwriteChoice::Yes),
            "n" | "no" => Ok(OverwriteChoice::No),
            "a" | "all" => Ok(OverwriteChoice::All),
            "s" | "skip" | "skip all" => Ok(OverwriteChoice::SkipAll),
            other => Err(ValidationError::new(
                "choice",
                format!("Invalid choice '{}'. Please enter y, n, a, or s.", other),
            )),
        }
    }
}

/// Source of overwrite decisions.
pub trait ConflictResolver {
    fn resolve(&mut self, rel_path: &str) -> OverwriteChoice;
}

/// Terminal prompt. Re-asks on invalid input; EOF or interrupt skips everything remaining.
#[derive(Debug, Default)]
pub struct InteractiveResolver;

impl ConflictResolver for InteractiveResolver {
    fn resolve(&mut self, rel_path: &str) -> OverwriteChoice {
        let answer = dialoguer::Input::<String>::new()
            .with_prompt(format!(
                "  Overwrite {}? [y(es)/n(o)/a(ll)/s(kip all)]",
                rel_path
            ))
            .validate_with(|input: &String| -> Result<(), String> {
                input
                    .parse::<OverwriteChoice>()
                    .map(|_| ())
                    .map_err(|e| e.reason)
            })
            .interact_text();

        match answer.map(|a| a.parse::<OverwriteChoice>()) {
            Ok(Ok(choice)) => {
                debug!(file = rel_path, ?choice, "Conflict resolved");
                choice
            }
            Ok(Err(_)) => OverwriteChoice::SkipAll,
            Err(e) => {
                warn!(file = rel_path, error = %e, "Prompt aborted, skipping remaining files");
                OverwriteChoice::SkipAll
            }
        }
    }
}

/// Answers every conflict the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub OverwriteChoice);

impl ConflictResolver for FixedResolver {
    fn resolve(&mut self, _rel_path: &str) -> OverwriteChoice {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        for (input, expected) in [
            ("y", OverwriteChoice::Yes),
            ("YES", OverwriteChoice::Yes),
            (" n ", OverwriteChoice::No),
            ("no", OverwriteChoice::No),
            ("a", OverwriteChoice::All),
            ("All", OverwriteChoice::All),
            ("s", OverwriteChoice::SkipAll),
            ("skip", OverwriteChoice::SkipAll),
            ("skip all", OverwriteChoice::SkipAll),
        ] {
            assert_eq!(input.parse::<OverwriteChoice>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn rejects_unknown_answers() {
        let err = "maybe".parse::<OverwriteChoice>().unwrap_err();
        assert!(err.reason.contains("Invalid choice 'maybe'"));
        assert!("".parse::<OverwriteChoice>().is_err());
    }
}
