//! Steps of the add pipeline

use async_trait::async_trait;
use std::fs;
use std::sync::Arc;
use tracing::{debug, info};

use super::files::{import_map_for, pre_existing_components, rename_plan};
use super::installer::{check_installer_output, installer_command};
use super::{AddContext, Choice, ComponentPicker};
use crate::error::{Result, ShadError};
use crate::expand::expand_selection;
use crate::naming::rewrite_imports;
use crate::pipeline::{Step, StepOutput, StepPolicy};
use crate::process::{CommandRunner, CommandSpec};
use crate::registry::{fetch_components, RegistryCache, RegistrySource};

/// Load the registry through the project cache
pub struct FetchRegistry {
    source: Arc<dyn RegistrySource>,
}

impl FetchRegistry {
    pub fn new(source: Arc<dyn RegistrySource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Step<AddContext> for FetchRegistry {
    fn title(&self) -> &str {
        "Fetching registry..."
    }

    async fn run(&self, ctx: &mut AddContext, _output: &mut StepOutput) -> Result<()> {
        let cache = RegistryCache::for_project(&ctx.paths);
        ctx.registry = cache.load(self.source.as_ref(), ctx.refresh).await?;
        info!("Registry has {} components", ctx.registry.len());
        Ok(())
    }
}

/// Ask the user which components to add
pub struct SelectComponents {
    picker: Arc<dyn ComponentPicker>,
}

impl SelectComponents {
    pub fn new(picker: Arc<dyn ComponentPicker>) -> Self {
        Self { picker }
    }
}

#[async_trait]
impl Step<AddContext> for SelectComponents {
    fn title(&self) -> &str {
        "Component selection..."
    }

    fn enabled(&self, ctx: &AddContext) -> bool {
        ctx.selected.is_empty()
    }

    async fn run(&self, ctx: &mut AddContext, _output: &mut StepOutput) -> Result<()> {
        let choices: Vec<Choice> = ctx
            .registry
            .components()
            .iter()
            .map(Choice::for_component)
            .collect();

        let picker = self.picker.clone();
        let picked = tokio::task::spawn_blocking(move || picker.pick(&choices))
            .await
            .map_err(|e| ShadError::Selection(format!("Component selection failed: {e}")))??;
        if picked.is_empty() {
            return Err(ShadError::Selection(
                "You must choose at least one component.".to_string(),
            ));
        }

        ctx.selected = picked;
        Ok(())
    }
}

/// Resolve the selection and run the installer
pub struct AddComponents {
    source: Arc<dyn RegistrySource>,
    runner: Arc<dyn CommandRunner>,
}

impl AddComponents {
    pub fn new(source: Arc<dyn RegistrySource>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { source, runner }
    }
}

#[async_trait]
impl Step<AddContext> for AddComponents {
    fn title(&self) -> &str {
        "Adding component(s)..."
    }

    async fn run(&self, ctx: &mut AddContext, output: &mut StepOutput) -> Result<()> {
        let missing: Vec<String> = ctx
            .selected
            .iter()
            .filter(|name| !ctx.registry.contains(name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            debug!("Fetching components missing from the index: {:?}", missing);
            for component in fetch_components(self.source.as_ref(), &missing).await? {
                ctx.registry.insert(component);
            }
        }

        ctx.new_components = expand_selection(&ctx.selected, &ctx.registry)?;

        if !ctx.force {
            let existing =
                pre_existing_components(ctx.new_components.values(), &ctx.paths, ctx.typescript);

            for name in &existing {
                ctx.new_components.remove(name);
            }

            if !existing.is_empty() {
                output.write(if existing.len() == 1 {
                    "Skipping existing component:"
                } else {
                    "Skipping existing components:"
                });
                output.write(existing.join(", "));
            }
            ctx.skipped = existing;
        }

        if ctx.new_components.is_empty() {
            return Ok(());
        }

        let command = installer_command(ctx);
        info!("Running {}", command.display());
        let result = self.runner.run(&command).await?;
        debug!("Installer output:\n{}", result.output);

        check_installer_output(&result.output)
    }
}

/// Notice shown when every selected component already exists
pub struct NothingToAdd;

#[async_trait]
impl Step<AddContext> for NothingToAdd {
    // Empty until run so nothing is shown while earlier steps are running
    fn title(&self) -> &str {
        ""
    }

    fn enabled(&self, ctx: &AddContext) -> bool {
        !ctx.has_new_components()
    }

    async fn run(&self, _ctx: &mut AddContext, output: &mut StepOutput) -> Result<()> {
        output.set_title("No new components to add");
        Ok(())
    }
}

/// Run the project linter over the ui components
pub struct FormatSources {
    runner: Arc<dyn CommandRunner>,
}

impl FormatSources {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Step<AddContext> for FormatSources {
    fn title(&self) -> &str {
        "Formatting source(s)..."
    }

    fn enabled(&self, ctx: &AddContext) -> bool {
        ctx.has_new_components()
    }

    fn policy(&self) -> StepPolicy {
        StepPolicy::Advisory
    }

    async fn run(&self, ctx: &mut AddContext, _output: &mut StepOutput) -> Result<()> {
        // TODO: lint only the files of ctx.new_components instead of the whole ui directory
        let command = CommandSpec::from_words(&ctx.config.lint_command, &ctx.paths.base)?
            .arg(ctx.paths.ui_components_dir().display().to_string());
        self.runner.run(&command).await?;
        Ok(())
    }
}

/// Move installed files to their PascalCase names
pub struct RenameFiles;

#[async_trait]
impl Step<AddContext> for RenameFiles {
    fn title(&self) -> &str {
        "Renaming file(s)..."
    }

    fn enabled(&self, ctx: &AddContext) -> bool {
        ctx.has_new_components()
    }

    async fn run(&self, ctx: &mut AddContext, _output: &mut StepOutput) -> Result<()> {
        for op in rename_plan(ctx.new_components.values(), &ctx.paths, ctx.typescript) {
            op.apply(ctx.force)?;
        }
        Ok(())
    }
}

/// Point imports inside the renamed files at the new names
pub struct UpdateImports;

#[async_trait]
impl Step<AddContext> for UpdateImports {
    fn title(&self) -> &str {
        "Updating import(s)..."
    }

    fn enabled(&self, ctx: &AddContext) -> bool {
        ctx.has_new_components()
    }

    async fn run(&self, ctx: &mut AddContext, _output: &mut StepOutput) -> Result<()> {
        let path_map = import_map_for(ctx.new_components.values());

        for op in rename_plan(ctx.new_components.values(), &ctx.paths, ctx.typescript) {
            let source = fs::read_to_string(&op.to)
                .map_err(|e| ShadError::io(format!("Failed to read {}", op.to.display()), &op.to, e))?;

            let rewritten = rewrite_imports(&source, &path_map);
            if rewritten != source {
                debug!("Updated imports in {}", op.to.display());
                fs::write(&op.to, rewritten)
                    .map_err(|e| ShadError::io(format!("Failed to write {}", op.to.display()), &op.to, e))?;
            }
        }
        Ok(())
    }
}
