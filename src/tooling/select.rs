//! Interactive kit selection.

use crate::error::ApiError;

/// A selectable kit, shown as `name (vX)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitChoice {
    pub name: String,
    pub version: String,
}

impl KitChoice {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} (v{})", self.name, self.version)
    }
}

/// Chooses kits when a command is run without a kit name.
///
/// An empty or `None` result means the user cancelled.
pub trait KitSelector {
    fn select_many(&mut self, prompt: &str, choices: &[KitChoice]) -> Result<Vec<String>, ApiError>;

    fn select_one(&mut self, prompt: &str, choices: &[KitChoice])
        -> Result<Option<String>, ApiError>;
}

/// Terminal menus via `dialoguer`.
#[derive(Debug, Default)]
pub struct InteractiveSelector;

impl KitSelector for InteractiveSelector {
    fn select_many(&mut self, prompt: &str, choices: &[KitChoice]) -> Result<Vec<String>, ApiError> {
        let labels: Vec<String> = choices.iter().map(KitChoice::label).collect();
        let picked = dialoguer::MultiSelect::new()
            .with_prompt(prompt)
            .items(&labels)
            .interact_opt()
            .map_err(|e| ApiError::Prompt(format!("Failed to get user input: {}", e)))?;
        Ok(picked
            .unwrap_or_default()
            .into_iter()
            .filter_map(|i| choices.get(i).map(|c| c.name.clone()))
            .collect())
    }

    fn select_one(
        &mut self,
        prompt: &str,
        choices: &[KitChoice],
    ) -> Result<Option<String>, ApiError> {
        let labels: Vec<String> = choices.iter().map(KitChoice::label).collect();
        let picked = dialoguer::Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(|e| ApiError::Prompt(format!("Failed to get user input: {}", e)))?;
        Ok(picked.and_then(|i| choices.get(i)).map(|c| c.name.clone()))
    }
}
