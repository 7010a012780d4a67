//! Remote `registry.json` index.

use super::validation::validate_kit_name;
use crate::error::ValidationError;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct RawRegistryEntry {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
}

/// A single kit listed in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRegistryEntry")]
pub struct RegistryEntry {
    name: String,
    version: String,
    description: String,
}

impl TryFrom<RawRegistryEntry> for RegistryEntry {
    type Error = ValidationError;

    fn try_from(raw: RawRegistryEntry) -> Result<Self, Self::Error> {
        RegistryEntry::new(raw.name, raw.version, raw.description)
    }
}

impl RegistryEntry {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_kit_name("kits.name", &name)?;
        Ok(Self {
            name,
            version: version.into(),
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Deserialize)]
struct RawRegistry {
    #[serde(default)]
    kits: Vec<RegistryEntry>,
}

/// Ordered collection of available kits with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRegistry")]
pub struct Registry {
    kits: Vec<RegistryEntry>,
}

impl TryFrom<RawRegistry> for Registry {
    type Error = ValidationError;

    fn try_from(raw: RawRegistry) -> Result<Self, Self::Error> {
        Registry::new(raw.kits)
    }
}

impl Registry {
    pub fn new(kits: Vec<RegistryEntry>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(kits.len());
        for entry in &kits {
            if !seen.insert(entry.name()) {
                return Err(ValidationError::new(
                    "kits",
                    format!("duplicate kit name '{}'", entry.name()),
                ));
            }
        }
        Ok(Self { kits })
    }

    pub fn kits(&self) -> &[RegistryEntry] {
        &self.kits
    }

    /// Find a kit entry by name.
    pub fn find_kit(&self, name: &str) -> Option<&RegistryEntry> {
        self.kits.iter().find(|kit| kit.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_kit(name).is_some()
    }
}
