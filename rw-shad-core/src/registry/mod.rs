//! Component registry
//!
//! # Overview
//!
//! ```text
//! Registry (ui.shadcn.com/registry)
//!     │
//!     ├── index.json                  ← every component, with file lists
//!     └── styles/<style>/<name>.json  ← single components
//!            │
//!            ▼
//!     .redwood/shadcn/registry.json   ← cached index (5 min)
//!     .redwood/shadcn/metadata.json   ← fetch timestamp
//! ```

mod cache;
mod client;
mod component;

pub use cache::{CacheMetadata, RegistryCache, FRESHNESS_WINDOW_SECS};
pub use client::{fetch_components, HttpRegistry, RegistrySource};
pub use component::{
    validate_index, validate_item, Component, ComponentFile, ComponentKind, Registry,
    MIN_REGISTRY_LEN,
};
