//! Steps of the setup pipeline

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::tailwind::{is_stock_config, render_config};
use super::{SetupContext, CN_UTIL_TEMPLATE, COMPONENTS_CONFIG_TEMPLATE, INDEX_CSS_TEMPLATE};
use crate::error::{Result, ShadError};
use crate::pipeline::{Step, StepOutput};
use crate::process::{CommandRunner, CommandSpec};

/// Packages added to the project root
pub const ROOT_PACKAGES: &[&str] = &["rw-shad"];

/// Packages added to the web side
pub const WEB_PACKAGES: &[&str] = &[
    "tailwindcss-animate",
    "class-variance-authority",
    "clsx",
    "tailwind-merge",
    "lucide-react",
];

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ShadError::io(format!("Failed to create {}", parent.display()), parent, e)
        })?;
    }
    fs::write(path, content)
        .map_err(|e| ShadError::io(format!("Failed to write {}", path.display()), path, e))
}

/// Require an existing Tailwind setup
pub struct CheckTailwind;

#[async_trait]
impl Step<SetupContext> for CheckTailwind {
    fn title(&self) -> &str {
        "Check for Tailwind setup..."
    }

    async fn run(&self, ctx: &mut SetupContext, _output: &mut StepOutput) -> Result<()> {
        if !ctx.paths.tailwind_config().is_file() {
            return Err(ShadError::Project(
                "Tailwind has not been set up yet.\nPlease run `yarn rw setup ui tailwind` first."
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Add rw-shad and the component runtime packages
pub struct InstallPackages {
    runner: Arc<dyn CommandRunner>,
}

impl InstallPackages {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Step<SetupContext> for InstallPackages {
    fn title(&self) -> &str {
        "Installing packages..."
    }

    async fn run(&self, ctx: &mut SetupContext, _output: &mut StepOutput) -> Result<()> {
        let root = CommandSpec::new("yarn", &ctx.paths.base)
            .arg("add")
            .args(ROOT_PACKAGES.iter().copied());
        self.runner.run(&root).await?;

        let web = CommandSpec::new("yarn", &ctx.paths.base)
            .args(["workspace", "web", "add"])
            .args(WEB_PACKAGES.iter().copied());
        self.runner.run(&web).await?;
        Ok(())
    }
}

/// Replace the Tailwind config and lint it
pub struct UpdateTailwindConfig {
    runner: Arc<dyn CommandRunner>,
}

impl UpdateTailwindConfig {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Step<SetupContext> for UpdateTailwindConfig {
    fn title(&self) -> &str {
        "Update tailwind config..."
    }

    async fn run(&self, ctx: &mut SetupContext, _output: &mut StepOutput) -> Result<()> {
        let config_path = ctx.paths.tailwind_config();

        if !ctx.force {
            let existing = fs::read_to_string(&config_path).map_err(|e| {
                ShadError::io(format!("Failed to read {}", config_path.display()), &config_path, e)
            })?;

            if !is_stock_config(&existing) {
                return Err(ShadError::file(
                    "Can't merge rw-shad Tailwind config with your existing Tailwind config.\n  \
                     Use --force to overwrite your config",
                ));
            }
        }

        write_file(&config_path, &render_config()?)?;

        let lint = CommandSpec::from_words(&ctx.config.lint_command, &ctx.paths.base)?
            .arg(config_path.display().to_string());
        self.runner.run(&lint).await?;
        Ok(())
    }
}

/// Append the CSS variables to `web/src/index.css`
pub struct UpdateIndexCss;

#[async_trait]
impl Step<SetupContext> for UpdateIndexCss {
    fn title(&self) -> &str {
        "Update index.css..."
    }

    async fn run(&self, ctx: &mut SetupContext, output: &mut StepOutput) -> Result<()> {
        let path = ctx.paths.index_css();
        let existing = fs::read_to_string(&path)
            .map_err(|e| ShadError::io(format!("Failed to read {}", path.display()), &path, e))?;

        if existing.contains("@layer base {") {
            output.write(
                "index.css already contains base styles. Please double check the updated \
                 index.css file for any conflicts",
            );
        }

        write_file(&path, &format!("{existing}{INDEX_CSS_TEMPLATE}"))
    }
}

/// Write the `cn` class name helper
pub struct AddCnUtil;

#[async_trait]
impl Step<SetupContext> for AddCnUtil {
    fn title(&self) -> &str {
        "Adding cn util..."
    }

    async fn run(&self, ctx: &mut SetupContext, _output: &mut StepOutput) -> Result<()> {
        let path = ctx.paths.cn_util();
        if !ctx.force && path.exists() {
            return Err(ShadError::FileOperation {
                message: "utils/cn.ts already exists.\nUse --force to override existing config."
                    .to_string(),
                path: Some(path),
                source: None,
            });
        }

        debug!("Writing {}", path.display());
        write_file(&path, CN_UTIL_TEMPLATE)
    }
}

/// Write `web/config/components.json` for the installer
pub struct AddComponentsConfig;

#[async_trait]
impl Step<SetupContext> for AddComponentsConfig {
    fn title(&self) -> &str {
        "Adding components config..."
    }

    async fn run(&self, ctx: &mut SetupContext, _output: &mut StepOutput) -> Result<()> {
        let path = ctx.paths.components_config();
        if !ctx.force && path.exists() {
            return Err(ShadError::FileOperation {
                message: "Components config already exists.\nUse --force to override existing config."
                    .to_string(),
                path: Some(path),
                source: None,
            });
        }

        let content = if ctx.typescript {
            COMPONENTS_CONFIG_TEMPLATE.to_string()
        } else {
            COMPONENTS_CONFIG_TEMPLATE.replace("\"tsx\": true", "\"tsx\": false")
        };

        debug!("Writing {}", path.display());
        write_file(&path, &content)
    }
}
