//! The setup workflow
//!
//! Prepares a Redwood project with Tailwind for shadcn/ui components: installs
//! the runtime packages, writes the Tailwind theme, appends the CSS variables
//! and adds the files the installer expects (`cn` util, `components.json`).

mod steps;
mod tailwind;

use std::sync::Arc;

use crate::config::ShadConfig;
use crate::paths::ProjectPaths;
use crate::pipeline::Pipeline;
use crate::process::CommandRunner;

pub use steps::{
    AddCnUtil, AddComponentsConfig, CheckTailwind, InstallPackages, UpdateIndexCss,
    UpdateTailwindConfig, ROOT_PACKAGES, WEB_PACKAGES,
};
pub use tailwind::{is_stock_config, render_config, CONTENT_GLOB, STOCK_CONFIG};

pub(crate) const INDEX_CSS_TEMPLATE: &str = include_str!("../../templates/index.css.template");
pub(crate) const CN_UTIL_TEMPLATE: &str = include_str!("../../templates/cn.ts.template");
pub(crate) const COMPONENTS_CONFIG_TEMPLATE: &str =
    include_str!("../../templates/components.json.template");

/// State shared by the setup steps
#[derive(Debug, Clone)]
pub struct SetupContext {
    pub paths: ProjectPaths,
    pub config: ShadConfig,
    /// Overwrite existing config and files
    pub force: bool,
    pub typescript: bool,
}

impl SetupContext {
    pub fn new(paths: ProjectPaths, config: ShadConfig, force: bool) -> Self {
        let typescript = paths.is_typescript_project();
        Self {
            paths,
            config,
            force,
            typescript,
        }
    }
}

/// Build the setup pipeline
pub fn build_setup_pipeline(runner: Arc<dyn CommandRunner>) -> Pipeline<SetupContext> {
    Pipeline::new()
        .add_step(CheckTailwind)
        .add_step(InstallPackages::new(runner.clone()))
        .add_step(UpdateTailwindConfig::new(runner))
        .add_step(UpdateIndexCss)
        .add_step(AddCnUtil)
        .add_step(AddComponentsConfig)
}
