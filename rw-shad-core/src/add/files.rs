//! File operations on installed components

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ShadError};
use crate::naming::{import_path_map, project_extension, to_pascal_file_name, with_extension};
use crate::paths::ProjectPaths;
use crate::registry::Component;

/// One kebab-case file to move to its PascalCase name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOp {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RenameOp {
    /// Move the file, refusing to replace a different file unless `force` is set
    pub fn apply(&self, force: bool) -> Result<()> {
        if self.from == self.to {
            return Ok(());
        }

        if !self.from.is_file() {
            return Err(ShadError::FileOperation {
                message: format!(
                    "Expected the installer to create {}, but it doesn't exist",
                    self.from.display()
                ),
                path: Some(self.from.clone()),
                source: None,
            });
        }

        if self.to.exists() && !force && !same_file(&self.from, &self.to) {
            return Err(ShadError::FileOperation {
                message: format!(
                    "{} already exists. Use --force to overwrite",
                    self.to.display()
                ),
                path: Some(self.to.clone()),
                source: None,
            });
        }

        debug!("Renaming {} -> {}", self.from.display(), self.to.display());
        fs::rename(&self.from, &self.to).map_err(|e| {
            ShadError::io(
                format!("Failed to rename {} to {}", self.from.display(), self.to.display()),
                &self.from,
                e,
            )
        })
    }
}

// Case-insensitive filesystems report the PascalCase target as existing
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Components whose first file already exists under its PascalCase name
pub fn pre_existing_components<'a>(
    components: impl IntoIterator<Item = &'a Component>,
    paths: &ProjectPaths,
    typescript: bool,
) -> Vec<String> {
    components
        .into_iter()
        .filter(|component| {
            let Some(first) = component.files.first() else {
                return false;
            };
            let relative = first.relative_path();
            let ext = project_extension(relative, typescript);
            paths
                .component_file(&to_pascal_file_name(relative, ext))
                .exists()
        })
        .map(|component| component.name.clone())
        .collect()
}

/// Renames for every file of every component, in component order
pub fn rename_plan<'a>(
    components: impl IntoIterator<Item = &'a Component>,
    paths: &ProjectPaths,
    typescript: bool,
) -> Vec<RenameOp> {
    components
        .into_iter()
        .flat_map(|component| component.files.iter())
        .map(|file| {
            let relative = file.relative_path();
            let ext = project_extension(relative, typescript);
            RenameOp {
                from: paths.component_file(&with_extension(relative, ext)),
                to: paths.component_file(&to_pascal_file_name(relative, ext)),
            }
        })
        .collect()
}

/// Import path map covering every file of `components`
pub fn import_map_for<'a>(
    components: impl IntoIterator<Item = &'a Component>,
) -> BTreeMap<String, String> {
    import_path_map(
        components
            .into_iter()
            .flat_map(|component| component.files.iter())
            .map(|file| file.relative_path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentFile;
    use tempfile::TempDir;

    fn component(name: &str, files: &[&str]) -> Component {
        Component::new(name, files.iter().map(|f| ComponentFile::new(*f)).collect())
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_rename_plan_uses_project_extension() {
        let paths = ProjectPaths::for_project(Path::new("/p"));
        let components = [component("use-toast", &["ui/use-toast.ts", "ui/toast.tsx"])];

        let ts = rename_plan(&components, &paths, true);
        assert_eq!(ts[0].from, Path::new("/p/web/src/components/ui/use-toast.ts"));
        assert_eq!(ts[0].to, Path::new("/p/web/src/components/ui/UseToast.ts"));
        assert_eq!(ts[1].to, Path::new("/p/web/src/components/ui/Toast.tsx"));

        let js = rename_plan(&components, &paths, false);
        assert_eq!(js[0].from, Path::new("/p/web/src/components/ui/use-toast.js"));
        assert_eq!(js[1].from, Path::new("/p/web/src/components/ui/toast.jsx"));
        assert_eq!(js[1].to, Path::new("/p/web/src/components/ui/Toast.jsx"));
    }

    #[test]
    fn test_pre_existing_checks_first_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::for_project(temp_dir.path());
        write(&paths.component_file("ui/Button.tsx"), "export {}");

        let components = [
            component("button", &["ui/button.tsx"]),
            component("dialog", &["ui/dialog.tsx"]),
            component("empty", &[]),
        ];

        assert_eq!(pre_existing_components(&components, &paths, true), vec!["button"]);
        assert!(pre_existing_components(&components, &paths, false).is_empty());
    }

    #[test]
    fn test_rename_moves_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::for_project(temp_dir.path());
        write(&paths.component_file("ui/alert-dialog.tsx"), "content");

        let plan = rename_plan(&[component("alert-dialog", &["ui/alert-dialog.tsx"])], &paths, true);
        plan[0].apply(false).unwrap();

        assert!(!plan[0].from.exists());
        assert_eq!(fs::read_to_string(&plan[0].to).unwrap(), "content");
    }

    #[test]
    fn test_rename_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::for_project(temp_dir.path());

        let plan = rename_plan(&[component("button", &["ui/button.tsx"])], &paths, true);
        let err = plan[0].apply(false).unwrap_err();
        assert!(matches!(err, ShadError::FileOperation { .. }));
        assert!(err.to_string().contains("button.tsx"));
    }

    #[test]
    fn test_rename_refuses_to_replace_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::for_project(temp_dir.path());
        let plan = rename_plan(&[component("alert-dialog", &["ui/alert-dialog.tsx"])], &paths, true);
        write(&plan[0].from, "new");
        write(&plan[0].to, "old");

        assert!(plan[0].apply(false).is_err());
        assert_eq!(fs::read_to_string(&plan[0].to).unwrap(), "old");

        plan[0].apply(true).unwrap();
        assert_eq!(fs::read_to_string(&plan[0].to).unwrap(), "new");
    }

    #[test]
    fn test_import_map_covers_all_files() {
        let components = [
            component("alert-dialog", &["ui/alert-dialog.tsx"]),
            component("button", &["ui/button.tsx"]),
        ];
        let map = import_map_for(&components);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("src/components/ui/alert-dialog").map(String::as_str),
            Some("src/components/ui/AlertDialog")
        );
    }
}
