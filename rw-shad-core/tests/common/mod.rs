//! Test helpers shared by the integration tests
//!
//! Fakes for the registry, the process runner and the picker, plus a
//! throwaway Redwood project layout.

#![allow(dead_code)]

use async_trait::async_trait;
use rw_shad_core::add::{Choice, ComponentPicker};
use rw_shad_core::paths::{ProjectPaths, PROJECT_MARKER};
use rw_shad_core::process::{CommandOutput, CommandRunner, CommandSpec};
use rw_shad_core::registry::RegistrySource;
use rw_shad_core::{Result, ShadError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Create a minimal Redwood project and return its paths
pub fn create_test_project(root: &Path, typescript: bool) -> ProjectPaths {
    fs::write(root.join(PROJECT_MARKER), "[web]\n  title = \"Test\"\n").unwrap();
    fs::create_dir_all(root.join("web/src/components")).unwrap();
    fs::create_dir_all(root.join("web/config")).unwrap();
    fs::create_dir_all(root.join("api/src")).unwrap();
    if typescript {
        fs::write(root.join("web/tsconfig.json"), "{}\n").unwrap();
    }
    ProjectPaths::for_project(root)
}

/// Write `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn entry(name: &str, files: &[&str], deps: &[&str]) -> Value {
    json!({
        "name": name,
        "type": "registry:ui",
        "files": files,
        "registryDependencies": deps,
    })
}

/// A registry index with twelve components
pub fn index_payload() -> Value {
    json!([
        entry("accordion", &["ui/accordion.tsx"], &[]),
        entry("alert-dialog", &["ui/alert-dialog.tsx"], &["button"]),
        entry("avatar", &["ui/avatar.tsx"], &[]),
        entry("badge", &["ui/badge.tsx"], &[]),
        entry("button", &["ui/button.tsx"], &[]),
        entry("card", &["ui/card.tsx"], &[]),
        entry("dialog", &["ui/dialog.tsx"], &["button"]),
        entry("input", &["ui/input.tsx"], &[]),
        entry("label", &["ui/label.tsx"], &[]),
        entry("select", &["ui/select.tsx"], &[]),
        entry("tabs", &["ui/tabs.tsx"], &[]),
        entry("toast", &["ui/toast.tsx", "ui/use-toast.ts", "ui/toaster.tsx"], &[]),
    ])
}

/// Registry source serving [`index_payload`] plus extra single items
pub struct FakeRegistry {
    index: Value,
    items: HashMap<String, Value>,
    pub index_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            index: index_payload(),
            items: HashMap::new(),
            index_calls: AtomicUsize::new(0),
            item_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_item(mut self, name: &str, files: &[&str]) -> Self {
        self.items.insert(name.to_string(), entry(name, files, &[]));
        self
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistrySource for FakeRegistry {
    async fn fetch_index(&self) -> Result<Value> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.index.clone())
    }

    async fn fetch_item(&self, name: &str) -> Result<Value> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        self.items
            .get(name)
            .cloned()
            .ok_or_else(|| ShadError::ComponentNotFound(name.to_string()))
    }
}

/// Command runner that records invocations and fakes the installer
///
/// When `npx` is run, every argument naming a known component makes the
/// runner write that component's files under the components directory.
pub struct FakeRunner {
    components_dir: PathBuf,
    installs: HashMap<String, Vec<(String, String)>>,
    installer_output: String,
    fail_lint: bool,
    pub commands: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new(paths: &ProjectPaths) -> Self {
        Self {
            components_dir: paths.web.components.clone(),
            installs: HashMap::new(),
            installer_output: "✔ Done.".to_string(),
            fail_lint: false,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Files the installer creates for `name`, relative to the components dir
    pub fn installs(mut self, name: &str, files: &[(&str, &str)]) -> Self {
        self.installs.insert(
            name.to_string(),
            files
                .iter()
                .map(|(path, content)| (path.to_string(), content.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_installer_output(mut self, output: &str) -> Self {
        self.installer_output = output.to_string();
        self
    }

    pub fn failing_lint(mut self) -> Self {
        self.fail_lint = true;
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    /// Invocations of the installer
    pub fn installer_calls(&self) -> Vec<CommandSpec> {
        self.commands()
            .into_iter()
            .filter(|cmd| cmd.program == "npx")
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.clone());

        if command.program == "npx" {
            for arg in &command.args {
                if let Some(files) = self.installs.get(arg) {
                    for (path, content) in files {
                        write_file(&self.components_dir.join(path), content);
                    }
                }
            }
            return Ok(CommandOutput::new(self.installer_output.clone()));
        }

        if self.fail_lint && command.args.iter().any(|arg| arg == "lint") {
            return Err(ShadError::ExternalProcess {
                message: "`yarn rw lint --fix` failed with exit status: 1".to_string(),
                output: "1 problem (1 error, 0 warnings)".to_string(),
                exit_code: Some(1),
            });
        }

        Ok(CommandOutput::default())
    }
}

/// Picker returning a fixed answer and remembering what it was offered
pub struct FixedPicker {
    answer: Vec<String>,
    pub offered: Mutex<Vec<Choice>>,
}

impl FixedPicker {
    pub fn new(answer: &[&str]) -> Self {
        Self {
            answer: answer.iter().map(|s| s.to_string()).collect(),
            offered: Mutex::new(Vec::new()),
        }
    }
}

impl ComponentPicker for FixedPicker {
    fn pick(&self, choices: &[Choice]) -> Result<Vec<String>> {
        *self.offered.lock().unwrap() = choices.to_vec();
        Ok(self.answer.clone())
    }
}
