use async_trait::async_trait;
use multikit::config::{load_config_with_recovery, MultikitConfig, DEFAULT_REGISTRY_URL};
use multikit::console::{Captured, Console};
use multikit::error::ApiError;
use multikit::installer::{ConflictResolver, OverwriteChoice};
use multikit::remote::{HttpResponse, HttpTransport, TransportError};
use multikit::tooling::cli::{CliContext, Commands};
use multikit::tooling::{CommandStatus, KitChoice, KitSelector};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const AGENT: &str = "agents/testkit.testAgent.agent.md";
pub const PROMPT: &str = "prompts/testkit.testPrompt.prompt.md";

/// In-memory registry keyed by path relative to a base URL.
pub struct MockRegistry {
    base: String,
    files: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl MockRegistry {
    pub fn new(base: &str) -> Arc<Self> {
        Arc::new(Self {
            base: base.trim_end_matches('/').to_string(),
            files: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Registry at the default URL serving `testkit` v1.0.0 with one agent and one prompt.
    pub fn with_testkit() -> Arc<Self> {
        let registry = Self::new(DEFAULT_REGISTRY_URL);
        registry.set(
            "registry.json",
            r#"{"kits": [{"name": "testkit", "version": "1.0.0", "description": "Test kit"}]}"#,
        );
        registry.publish_testkit("1.0.0", "agent v1\n", "prompt v1\n");
        registry
    }

    pub fn publish_testkit(&self, version: &str, agent: &str, prompt: &str) {
        self.set(
            "testkit/manifest.json",
            &format!(
                r#"{{"name": "testkit", "version": "{}", "description": "Test kit",
                    "agents": ["testkit.testAgent.agent.md"],
                    "prompts": ["testkit.testPrompt.prompt.md"]}}"#,
                version
            ),
        );
        self.set(&format!("testkit/{}", AGENT), agent);
        self.set(&format!("testkit/{}", PROMPT), prompt);
    }

    pub fn set(&self, path: &str, body: &str) {
        self.files
            .lock()
            .insert(format!("{}/{}", self.base, path), body.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.files.lock().remove(&format!("{}/{}", self.base, path));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for MockRegistry {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(url.to_string());
        Ok(match self.files.lock().get(url) {
            Some(body) => HttpResponse::new(200, body.as_str()),
            None => HttpResponse::new(404, "Not Found"),
        })
    }
}

/// Answers conflict prompts from a script; `SkipAll` once exhausted.
pub struct ScriptedResolver {
    choices: Vec<OverwriteChoice>,
    pub asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedResolver {
    pub fn new(choices: Vec<OverwriteChoice>) -> Self {
        Self {
            choices,
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ConflictResolver for ScriptedResolver {
    fn resolve(&mut self, rel_path: &str) -> OverwriteChoice {
        self.asked.lock().push(rel_path.to_string());
        if self.choices.is_empty() {
            OverwriteChoice::SkipAll
        } else {
            self.choices.remove(0)
        }
    }
}

/// Picks the named kits that are offered, in the order offered.
pub struct ScriptedSelector {
    picks: Vec<String>,
    pub offered: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedSelector {
    pub fn new(picks: &[&str]) -> Self {
        Self {
            picks: picks.iter().map(|p| p.to_string()).collect(),
            offered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn pick(&self, choices: &[KitChoice]) -> Vec<String> {
        self.offered
            .lock()
            .push(choices.iter().map(|c| c.name.clone()).collect());
        choices
            .iter()
            .filter(|c| self.picks.contains(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }
}

impl KitSelector for ScriptedSelector {
    fn select_many(&mut self, _prompt: &str, choices: &[KitChoice]) -> Result<Vec<String>, ApiError> {
        Ok(self.pick(choices))
    }

    fn select_one(
        &mut self,
        _prompt: &str,
        choices: &[KitChoice],
    ) -> Result<Option<String>, ApiError> {
        Ok(self.pick(choices).into_iter().next())
    }
}

/// A temp project wired to a mock registry with a capturing console.
pub struct TestProject {
    pub dir: TempDir,
    pub registry: Arc<MockRegistry>,
}

impl TestProject {
    pub fn new(registry: Arc<MockRegistry>) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            registry,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn context(&self) -> CliContext {
        self.context_with(ScriptedResolver::new(vec![]), ScriptedSelector::new(&[]))
    }

    pub fn context_with(&self, resolver: ScriptedResolver, selector: ScriptedSelector) -> CliContext {
        CliContext::new(self.path().to_path_buf())
            .with_console(Console::capture())
            .with_transport(self.registry.clone())
            .with_resolver(resolver)
            .with_selector(selector)
    }

    /// Run one command on a fresh context, returning status and output.
    pub fn run(&self, command: Commands) -> (CommandStatus, Captured) {
        run_in(&self.context(), command)
    }

    pub fn config(&self) -> MultikitConfig {
        load_config_with_recovery(self.path()).unwrap().config
    }

    pub fn github_file(&self, rel: &str) -> std::path::PathBuf {
        self.path().join(".github").join(rel)
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.github_file(rel)).unwrap()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.github_file(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

pub fn run_in(context: &CliContext, command: Commands) -> (CommandStatus, Captured) {
    let status = context.execute(&command).unwrap();
    (status, context.console().captured())
}

pub fn install(kit: &str) -> Commands {
    Commands::Install {
        kit: Some(kit.to_string()),
        force: false,
        registry: None,
    }
}
