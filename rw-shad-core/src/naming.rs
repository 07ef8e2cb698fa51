//! Naming transforms for component names, file names and import paths
//!
//! The registry uses kebab-case everywhere (`alert-dialog`, `ui/alert-dialog.tsx`)
//! while Redwood projects use PascalCase component files
//! (`ui/AlertDialog.tsx`). These functions convert between the two and
//! rewrite the import statements that refer to renamed files.
//!
//! All functions are total. Malformed input produces malformed output rather
//! than an error.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use tracing::warn;

/// Prefix used for component imports inside a Redwood web side
pub const COMPONENTS_IMPORT_PREFIX: &str = "src/components/";

static CASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("static regex is valid"));

/// Source extensions stripped from file names, longest first
const SOURCE_EXTENSIONS: [&str; 4] = [".tsx", ".ts", ".jsx", ".js"];

/// Normalize a user supplied component name to its registry key
///
/// `alertDialog` and `AlertDialog` both become `alert-dialog`.
pub fn to_kebab_case(name: &str) -> String {
    CASE_BOUNDARY
        .replace_all(name, "$1-$2")
        .to_lowercase()
}

/// Convert a word list separated by `-`, `_`, `.` or whitespace to PascalCase
///
/// Existing capitals inside a word are kept, so the conversion is idempotent.
pub fn to_pascal_case(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Human readable label for a component name (`alert-dialog` -> `Alert Dialog`)
pub fn title_case(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip a `.ts`, `.tsx`, `.js` or `.jsx` extension from a file name or path
pub fn strip_source_extension(path: &str) -> &str {
    SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

/// Replace the source extension of a registry path with `extension`
///
/// `ui/button.tsx` with `.jsx` becomes `ui/button.jsx`.
pub fn with_extension(relative_path: &str, extension: &str) -> String {
    format!("{}{}", strip_source_extension(relative_path), extension)
}

/// Convert the final segment of a `/` separated path to a PascalCase file name
///
/// Directory parts are kept verbatim, the base name of the last segment is
/// converted and `extension` is appended (pass `""` for an import path).
pub fn to_pascal_file_name(relative_path: &str, extension: &str) -> String {
    let (dir, file_name) = match relative_path.rsplit_once('/') {
        Some((dir, file_name)) => (dir, file_name),
        None => ("", relative_path),
    };

    let pascal = format!(
        "{}{}",
        to_pascal_case(strip_source_extension(file_name)),
        extension
    );

    if dir.is_empty() {
        pascal
    } else {
        format!("{dir}/{pascal}")
    }
}

/// Extension a registry file ends up with in the project
///
/// TypeScript projects keep `.tsx`/`.ts`. In JavaScript projects the installer
/// converts sources, so JSX files become `.jsx` and everything else `.js`.
pub fn project_extension(registry_path: &str, typescript: bool) -> &'static str {
    let is_jsx = registry_path.ends_with(".tsx") || registry_path.ends_with(".jsx");
    match (typescript, is_jsx) {
        (true, true) => ".tsx",
        (true, false) => ".ts",
        (false, true) => ".jsx",
        (false, false) => ".js",
    }
}

/// Build the kebab-case to PascalCase import path map for a set of registry files
///
/// `ui/alert-dialog.tsx` maps `src/components/ui/alert-dialog` to
/// `src/components/ui/AlertDialog`.
pub fn import_path_map<'a>(registry_paths: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, String> {
    registry_paths
        .into_iter()
        .map(|path| {
            (
                format!("{COMPONENTS_IMPORT_PREFIX}{}", strip_source_extension(path)),
                format!("{COMPONENTS_IMPORT_PREFIX}{}", to_pascal_file_name(path, "")),
            )
        })
        .collect()
}

/// Rewrite import statements whose quoted path exactly matches a key of `path_map`
///
/// Two line-anchored forms are rewritten:
/// - `import <bindings> from '<path>'`
/// - `} from '<path>'` (closing line of a multi-line import)
///
/// Lines may end in `\n` or `\r\n`. Everything else in the text is left
/// byte-identical.
pub fn rewrite_imports(source: &str, path_map: &BTreeMap<String, String>) -> String {
    let mut result = source.to_string();

    for (from, to) in path_map {
        let escaped = regex::escape(from);

        let single_line = match Regex::new(&format!(r"(?mR)^import (.+) from '{escaped}'$")) {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping import rewrite for '{}': {}", from, e);
                continue;
            }
        };
        result = single_line
            .replace_all(&result, |caps: &Captures| {
                format!("import {} from '{}'", &caps[1], to)
            })
            .into_owned();

        if let Ok(multi_line) = Regex::new(&format!(r"(?mR)^\}} from '{escaped}'$")) {
            result = multi_line
                .replace_all(&result, |_: &Captures| format!("}} from '{to}'"))
                .into_owned();
        }
    }

    result
}
