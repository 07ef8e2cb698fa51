//! Expansion of selected components with their registry dependencies

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, ShadError};
use crate::registry::{Component, Registry};

/// Resolve selected names and add their direct registry dependencies
///
/// Every selected name must exist in `registry`. Dependencies are best effort:
/// a dependency that is not in the registry is skipped. Only one level is
/// expanded, dependencies of dependencies are not followed.
pub fn expand_selection<S: AsRef<str>>(
    selected: &[S],
    registry: &Registry,
) -> Result<BTreeMap<String, Component>> {
    let mut expanded = BTreeMap::new();

    for name in selected {
        let name = name.as_ref();
        let component = registry
            .get(name)
            .ok_or_else(|| ShadError::ComponentNotFound(name.to_string()))?;

        expanded.insert(component.name.clone(), component.clone());

        for dep_name in &component.registry_dependencies {
            match registry.get(dep_name) {
                Some(dep) => {
                    expanded.insert(dep.name.clone(), dep.clone());
                }
                None => {
                    debug!(
                        "Ignoring unknown registry dependency '{}' of '{}'",
                        dep_name,
                        name
                    );
                }
            }
        }
    }

    Ok(expanded)
}
