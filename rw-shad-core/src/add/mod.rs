//! The add workflow
//!
//! Adds shadcn/ui components to a Redwood project:
//!
//! ```text
//! Fetching registry...        cache or network
//! Component selection...      only when no names were given
//! Adding component(s)...      expand, skip existing, run the installer
//! No new components to add    only when everything already exists
//! Formatting source(s)...     lint --fix, failures tolerated
//! Renaming file(s)...         kebab-case -> PascalCase
//! Updating import(s)...       point imports at the renamed files
//! ```

mod files;
mod installer;
mod steps;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ShadConfig;
use crate::error::Result;
use crate::naming::{title_case, to_kebab_case};
use crate::paths::ProjectPaths;
use crate::pipeline::Pipeline;
use crate::process::CommandRunner;
use crate::registry::{Component, Registry, RegistrySource};

pub use files::{import_map_for, pre_existing_components, rename_plan, RenameOp};
pub use installer::{check_installer_output, installer_command};
pub use steps::{
    AddComponents, FetchRegistry, FormatSources, NothingToAdd, RenameFiles, SelectComponents,
    UpdateImports,
};

/// Options of one `rw-shad` add invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Component names as typed by the user
    pub components: Vec<String>,
    /// Overwrite existing components
    pub force: bool,
    /// Ignore the registry cache
    pub refresh: bool,
}

/// One entry offered by a [`ComponentPicker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Registry name, returned when picked
    pub name: String,
    /// Display label
    pub label: String,
}

impl Choice {
    pub fn for_component(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            label: title_case(&component.name),
        }
    }
}

/// Interactive component selection
pub trait ComponentPicker: Send + Sync {
    /// Return the names of the picked choices
    fn pick(&self, choices: &[Choice]) -> Result<Vec<String>>;
}

/// State shared by the add steps
#[derive(Debug, Clone)]
pub struct AddContext {
    pub paths: ProjectPaths,
    pub config: ShadConfig,
    pub force: bool,
    pub refresh: bool,
    pub typescript: bool,
    /// Selected registry names, kebab-case
    pub selected: Vec<String>,
    /// Loaded registry, plus any components fetched individually
    pub registry: Registry,
    /// Components the installer is asked to add
    pub new_components: BTreeMap<String, Component>,
    /// Components dropped because they already exist
    pub skipped: Vec<String>,
}

impl AddContext {
    pub fn new(paths: ProjectPaths, config: ShadConfig, options: AddOptions) -> Self {
        let typescript = paths.is_typescript_project();
        Self {
            paths,
            config,
            force: options.force,
            refresh: options.refresh,
            typescript,
            selected: options.components.iter().map(|name| to_kebab_case(name)).collect(),
            registry: Registry::default(),
            new_components: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    pub fn has_new_components(&self) -> bool {
        !self.new_components.is_empty()
    }
}

/// Collaborators the add steps call out to
#[derive(Clone)]
pub struct AddServices {
    pub source: Arc<dyn RegistrySource>,
    pub runner: Arc<dyn CommandRunner>,
    pub picker: Arc<dyn ComponentPicker>,
}

/// Build the add pipeline
pub fn build_add_pipeline(services: &AddServices) -> Pipeline<AddContext> {
    Pipeline::new()
        .add_step(FetchRegistry::new(services.source.clone()))
        .add_step(SelectComponents::new(services.picker.clone()))
        .add_step(AddComponents::new(services.source.clone(), services.runner.clone()))
        .add_step(NothingToAdd)
        .add_step(FormatSources::new(services.runner.clone()))
        .add_step(RenameFiles)
        .add_step(UpdateImports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentFile;
    use std::path::Path;

    #[test]
    fn test_context_normalizes_names() {
        let paths = ProjectPaths::for_project(Path::new("/project"));
        let options = AddOptions {
            components: vec!["alertDialog".to_string(), "Button".to_string()],
            ..Default::default()
        };

        let ctx = AddContext::new(paths, ShadConfig::default(), options);
        assert_eq!(ctx.selected, vec!["alert-dialog", "button"]);
        assert!(!ctx.has_new_components());
    }

    #[test]
    fn test_choice_label() {
        let component = Component::new("alert-dialog", vec![ComponentFile::new("ui/alert-dialog.tsx")]);
        let choice = Choice::for_component(&component);
        assert_eq!(choice.name, "alert-dialog");
        assert_eq!(choice.label, "Alert Dialog");
    }

    #[test]
    fn test_pipeline_step_order() {
        struct NoPicker;
        impl ComponentPicker for NoPicker {
            fn pick(&self, _choices: &[Choice]) -> Result<Vec<String>> {
                Ok(Vec::new())
            }
        }

        let config = ShadConfig::default();
        let services = AddServices {
            source: Arc::new(crate::registry::HttpRegistry::new(&config).unwrap()),
            runner: Arc::new(crate::process::TokioRunner),
            picker: Arc::new(NoPicker),
        };

        let pipeline = build_add_pipeline(&services);
        assert_eq!(
            pipeline.titles(),
            vec![
                "Fetching registry...",
                "Component selection...",
                "Adding component(s)...",
                "",
                "Formatting source(s)...",
                "Renaming file(s)...",
                "Updating import(s)...",
            ]
        );
    }
}
