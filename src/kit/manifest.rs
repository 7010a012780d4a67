//! Per-kit `manifest.json` model.

use super::validation::validate_kit_name;
use crate::error::ValidationError;
use serde::Deserialize;
use std::fmt;

const AGENT_SUFFIX: &str = ".agent.md";
const PROMPT_SUFFIX: &str = ".prompt.md";

/// Subdirectory a kit file is installed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KitSubdir {
    Agents,
    Prompts,
}

impl KitSubdir {
    pub fn as_str(&self) -> &'static str {
        match self {
            KitSubdir::Agents => "agents",
            KitSubdir::Prompts => "prompts",
        }
    }
}

impl fmt::Display for KitSubdir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared file: the `(subdir, filename)` pair of a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KitFile {
    pub subdir: KitSubdir,
    pub filename: String,
}

impl KitFile {
    pub fn new(subdir: KitSubdir, filename: impl Into<String>) -> Self {
        Self {
            subdir,
            filename: filename.into(),
        }
    }

    /// Path relative to the `.github/` directory, e.g. `agents/foo.agent.md`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.subdir, self.filename)
    }
}

impl fmt::Display for KitFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subdir, self.filename)
    }
}

/// Wire shape of `manifest.json` before validation.
#[derive(Debug, Deserialize)]
struct RawManifest {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    agents: Vec<String>,
    #[serde(default)]
    prompts: Vec<String>,
}

/// A validated kit manifest declaring the files to install.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawManifest")]
pub struct Manifest {
    name: String,
    version: String,
    description: String,
    agents: Vec<String>,
    prompts: Vec<String>,
}

impl TryFrom<RawManifest> for Manifest {
    type Error = ValidationError;

    fn try_from(raw: RawManifest) -> Result<Self, Self::Error> {
        Manifest::new(raw.name, raw.version, raw.description, raw.agents, raw.prompts)
    }
}

impl Manifest {
    /// Build a manifest, rejecting it whole if any field is invalid.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        agents: Vec<String>,
        prompts: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let version = version.into();

        validate_kit_name("name", &name)?;
        if version.is_empty() {
            return Err(ValidationError::new("version", "version must not be empty"));
        }
        for filename in agents.iter().chain(&prompts) {
            if filename.contains(['/', '\\']) || filename.starts_with('.') {
                return Err(ValidationError::new(
                    "files",
                    format!("filename must be a plain file name. Got: '{}'", filename),
                ));
            }
        }
        for filename in &agents {
            if !filename.ends_with(AGENT_SUFFIX) {
                return Err(ValidationError::new(
                    "agents",
                    format!("agent filename must end with '{}'. Got: '{}'", AGENT_SUFFIX, filename),
                ));
            }
        }
        for filename in &prompts {
            if !filename.ends_with(PROMPT_SUFFIX) {
                return Err(ValidationError::new(
                    "prompts",
                    format!(
                        "prompt filename must end with '{}'. Got: '{}'",
                        PROMPT_SUFFIX, filename
                    ),
                ));
            }
        }

        Ok(Self {
            name,
            version,
            description: description.into(),
            agents,
            prompts,
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

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// All declared files: agents first, then prompts, each in manifest order.
    pub fn all_files(&self) -> Vec<KitFile> {
        self.agents
            .iter()
            .map(|f| KitFile::new(KitSubdir::Agents, f.clone()))
            .chain(
                self.prompts
                    .iter()
                    .map(|f| KitFile::new(KitSubdir::Prompts, f.clone())),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.prompts.is_empty()
    }
}
