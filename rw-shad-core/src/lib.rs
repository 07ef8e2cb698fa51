//! rw-shad core library
//!
//! Adds shadcn/ui components to Redwood projects. A command is a pipeline of
//! steps over a shared context:
//! - [`add`] fetches the component registry, runs the installer for the
//!   selected components and renames the results to PascalCase
//! - [`setup`] prepares a project (packages, Tailwind theme, installer config)
//!
//! The building blocks are usable on their own: [`registry`] (fetching and
//! caching), [`expand`] (registry dependency expansion), [`naming`] (file and
//! import renaming) and [`pipeline`] (the step executor).

pub mod add;
pub mod config;
pub mod error;
pub mod expand;
pub mod naming;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod setup;

pub use error::{Result, ShadError};
