//! Registry data model and payload shape validation
//!
//! The registry index (`index.json`) is a JSON array of components. Only a
//! shallow shape check is done before decoding: the payload must be an array
//! of more than ten entries, each with a string `name` and an array `files`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::{Result, ShadError};

/// Minimum number of entries a registry index must have to be trusted
pub const MIN_REGISTRY_LEN: usize = 10;

/// Placement tag of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentKind {
    #[default]
    Ui,
    Hook,
    Lib,
    Page,
    Block,
    Theme,
    Example,
    /// A tag this version doesn't know about
    Unknown,
}

impl ComponentKind {
    /// Parse a tag, ignoring a `registry:` or `components:` namespace prefix
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.rsplit(':').next().unwrap_or(tag);
        match tag {
            "ui" => ComponentKind::Ui,
            "hook" => ComponentKind::Hook,
            "lib" => ComponentKind::Lib,
            "page" => ComponentKind::Page,
            "block" => ComponentKind::Block,
            "theme" => ComponentKind::Theme,
            "example" => ComponentKind::Example,
            _ => ComponentKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Ui => "ui",
            ComponentKind::Hook => "hook",
            ComponentKind::Lib => "lib",
            ComponentKind::Page => "page",
            ComponentKind::Block => "block",
            ComponentKind::Theme => "theme",
            ComponentKind::Example => "example",
            ComponentKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("registry:{}", self.as_str()))
    }
}

impl<'de> Deserialize<'de> for ComponentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ComponentKind::from_tag(&tag))
    }
}

/// One file belonging to a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentFile {
    /// Path relative to the components directory (e.g. `ui/button.tsx`)
    pub path: String,

    /// Placement tag of this file
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentKind>,

    /// Target path override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ComponentFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            target: None,
        }
    }

    /// Path the file is materialized at, relative to the components directory
    pub fn relative_path(&self) -> &str {
        match &self.target {
            Some(target) if !target.is_empty() => target,
            _ => &self.path,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawComponentFile {
    Path(String),
    Descriptor {
        path: String,
        #[serde(rename = "type", default)]
        kind: Option<ComponentKind>,
        #[serde(default)]
        target: Option<String>,
    },
}

impl<'de> Deserialize<'de> for ComponentFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawComponentFile::deserialize(deserializer)? {
            RawComponentFile::Path(path) => ComponentFile::new(path),
            RawComponentFile::Descriptor { path, kind, target } => ComponentFile { path, kind, target },
        })
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Unique kebab-case identifier
    pub name: String,

    /// Placement tag
    #[serde(rename = "type", default)]
    pub kind: ComponentKind,

    /// Files, in registry order
    pub files: Vec<ComponentFile>,

    /// External npm packages (informational)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Other registry components this one needs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
}

impl Component {
    pub fn new(name: impl Into<String>, files: Vec<ComponentFile>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Ui,
            files,
            dependencies: Vec::new(),
            registry_dependencies: Vec::new(),
        }
    }

    pub fn with_registry_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry_dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}

/// An ordered registry snapshot, looked up by component name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    components: Vec<Component>,
}

impl Registry {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Find a component by exact name
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Add or replace a component
    pub fn insert(&mut self, component: Component) {
        match self.components.iter_mut().find(|c| c.name == component.name) {
            Some(existing) => *existing = component,
            None => self.components.push(component),
        }
    }
}

/// Shape check a raw registry payload and decode it
///
/// Fails with [`ShadError::RegistryFetch`] when the payload is not an array of
/// more than ten entries that all carry a string `name` and an array `files`.
pub fn validate_index(payload: &Value) -> Result<Registry> {
    let entries = payload
        .as_array()
        .ok_or_else(|| invalid_response("expected a JSON array", payload))?;

    if entries.len() <= MIN_REGISTRY_LEN {
        return Err(invalid_response(
            &format!("expected more than {MIN_REGISTRY_LEN} components, got {}", entries.len()),
            payload,
        ));
    }

    if let Some(bad) = entries.iter().find(|entry| !has_component_shape(entry)) {
        return Err(invalid_response(
            "every component needs a string `name` and an array `files`",
            bad,
        ));
    }

    let components = serde_json::from_value::<Vec<Component>>(payload.clone())
        .map_err(|e| ShadError::RegistryFetch(format!("Invalid registry response: {e}")))?;

    Ok(Registry::new(components))
}

/// Shape check and decode a single registry item
pub fn validate_item(payload: &Value) -> Result<Component> {
    if !has_component_shape(payload) {
        return Err(invalid_response(
            "a component needs a string `name` and an array `files`",
            payload,
        ));
    }

    serde_json::from_value(payload.clone())
        .map_err(|e| ShadError::RegistryFetch(format!("Invalid registry item: {e}")))
}

fn has_component_shape(entry: &Value) -> bool {
    entry.get("name").map(Value::is_string).unwrap_or(false)
        && entry.get("files").map(Value::is_array).unwrap_or(false)
}

fn invalid_response(reason: &str, payload: &Value) -> ShadError {
    let mut shown = serde_json::to_string_pretty(payload).unwrap_or_default();
    if shown.len() > 500 {
        let mut cut = 500;
        while !shown.is_char_boundary(cut) {
            cut -= 1;
        }
        shown.truncate(cut);
        shown.push_str("\n...");
    }
    ShadError::RegistryFetch(format!("Invalid registry response ({reason}):\n{shown}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index_of(len: usize) -> Value {
        Value::Array(
            (0..len)
                .map(|i| json!({ "name": format!("component-{i}"), "type": "registry:ui", "files": [format!("ui/component-{i}.tsx")] }))
                .collect(),
        )
    }

    #[test]
    fn test_validate_accepts_eleven_components() {
        let registry = validate_index(&index_of(11)).unwrap();
        assert_eq!(registry.len(), 11);
        assert!(registry.contains("component-0"));
    }

    #[test]
    fn test_validate_rejects_small_or_non_array_payloads() {
        assert!(matches!(validate_index(&index_of(10)), Err(ShadError::RegistryFetch(_))));
        assert!(matches!(validate_index(&json!({"name": "x"})), Err(ShadError::RegistryFetch(_))));
    }

    #[test]
    fn test_validate_rejects_entry_without_files() {
        let mut payload = index_of(12);
        payload.as_array_mut().unwrap().push(json!({ "name": "broken" }));

        let err = validate_index(&payload).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_decodes_both_file_formats() {
        let component: Component = serde_json::from_value(json!({
            "name": "toast",
            "type": "registry:ui",
            "dependencies": ["@radix-ui/react-toast"],
            "registryDependencies": ["button"],
            "files": [
                "ui/toast.tsx",
                { "path": "ui/use-toast.ts", "type": "registry:hook" },
                { "path": "ui/toaster.tsx", "type": "registry:ui", "target": "ui/custom/toaster.tsx" }
            ]
        }))
        .unwrap();

        assert_eq!(component.kind, ComponentKind::Ui);
        assert_eq!(component.registry_dependencies, vec!["button"]);
        assert_eq!(component.files[0].relative_path(), "ui/toast.tsx");
        assert_eq!(component.files[1].kind, Some(ComponentKind::Hook));
        assert_eq!(component.files[2].relative_path(), "ui/custom/toaster.tsx");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ComponentKind::from_tag("components:ui"), ComponentKind::Ui);
        assert_eq!(ComponentKind::from_tag("lib"), ComponentKind::Lib);
        assert_eq!(ComponentKind::from_tag("registry:style"), ComponentKind::Unknown);
    }

    #[test]
    fn test_registry_insert_replaces_by_name() {
        let mut registry = Registry::new(vec![Component::new("button", vec![])]);
        registry.insert(Component::new("button", vec![ComponentFile::new("ui/button.tsx")]));
        registry.insert(Component::new("card", vec![]));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("button").unwrap().files.len(), 1);
    }
}
