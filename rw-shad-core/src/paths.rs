//! Redwood project layout
//!
//! Resolves the project root (the directory holding `redwood.toml`) and the
//! well-known directories rw-shad reads from and writes to.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ShadError};

/// File that marks the root of a Redwood project
pub const PROJECT_MARKER: &str = "redwood.toml";

/// Environment variable Redwood tooling uses to pin the project directory
pub const CWD_ENV_VAR: &str = "RWJS_CWD";

/// Web side directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPaths {
    /// `web/`
    pub base: PathBuf,
    /// `web/config/`
    pub config: PathBuf,
    /// `web/src/`
    pub src: PathBuf,
    /// `web/src/components/`
    pub components: PathBuf,
}

/// Path management for a Redwood project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Project root (contains `redwood.toml`)
    pub base: PathBuf,
    /// Web side directories
    pub web: WebPaths,
    /// Generated output directory (`.redwood/`)
    pub generated: PathBuf,
}

impl ProjectPaths {
    /// Paths for a project rooted at `base` (no existence checks)
    pub fn for_project(base: &Path) -> Self {
        let web_base = base.join("web");
        let web_src = web_base.join("src");
        Self {
            base: base.to_path_buf(),
            web: WebPaths {
                config: web_base.join("config"),
                components: web_src.join("components"),
                src: web_src,
                base: web_base,
            },
            generated: base.join(".redwood"),
        }
    }

    /// Locate the project root
    ///
    /// When `cwd` is given (from `--cwd` or `RWJS_CWD`) the marker file must be
    /// in that directory. Otherwise it is searched for upwards from `start`.
    pub fn discover(cwd: Option<&Path>, start: &Path) -> Result<Self> {
        match cwd {
            Some(dir) => {
                if !dir.join(PROJECT_MARKER).is_file() {
                    return Err(ShadError::Project(format!(
                        "Couldn't find a \"{PROJECT_MARKER}\" file in {}",
                        dir.display()
                    )));
                }
                Ok(Self::for_project(dir))
            }
            None => {
                let root = start
                    .ancestors()
                    .find(|dir| dir.join(PROJECT_MARKER).is_file())
                    .ok_or_else(|| {
                        ShadError::Project(format!(
                            "Couldn't find up a \"{PROJECT_MARKER}\" file from {}",
                            start.display()
                        ))
                    })?;
                debug!("Found project root at {}", root.display());
                Ok(Self::for_project(root))
            }
        }
    }

    /// Directory holding the registry cache files
    pub fn registry_cache_dir(&self) -> PathBuf {
        self.generated.join("shadcn")
    }

    /// Directory the installer writes `ui` components to
    pub fn ui_components_dir(&self) -> PathBuf {
        self.web.components.join("ui")
    }

    /// Tailwind configuration file
    pub fn tailwind_config(&self) -> PathBuf {
        self.web.config.join("tailwind.config.js")
    }

    pub fn index_css(&self) -> PathBuf {
        self.web.src.join("index.css")
    }

    pub fn cn_util(&self) -> PathBuf {
        self.web.src.join("utils").join("cn.ts")
    }

    /// Installer configuration (`components.json`)
    pub fn components_config(&self) -> PathBuf {
        self.web.config.join("components.json")
    }

    /// Project configuration file for rw-shad
    pub fn project_config_file(&self) -> PathBuf {
        self.web.config.join("rw-shad.yaml")
    }

    /// Whether the project uses TypeScript
    pub fn is_typescript_project(&self) -> bool {
        self.web.base.join("tsconfig.json").is_file()
            || self.base.join("api").join("tsconfig.json").is_file()
    }

    /// Absolute path of a registry file inside the components directory
    pub fn component_file(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.web.components.clone(), |path, part| path.join(part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(PROJECT_MARKER), "[web]\n").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("web/src/components")).unwrap();
        temp_dir
    }

    #[test]
    fn test_layout() {
        let paths = ProjectPaths::for_project(Path::new("/app"));
        assert_eq!(paths.web.config, PathBuf::from("/app/web/config"));
        assert_eq!(paths.web.components, PathBuf::from("/app/web/src/components"));
        assert_eq!(paths.registry_cache_dir(), PathBuf::from("/app/.redwood/shadcn"));
        assert_eq!(
            paths.component_file("ui/Button.tsx"),
            PathBuf::from("/app/web/src/components/ui/Button.tsx")
        );
    }

    #[test]
    fn test_discover_finds_root_from_subdirectory() {
        let project = make_project();
        let start = project.path().join("web/src/components");

        let paths = ProjectPaths::discover(None, &start).unwrap();
        assert_eq!(paths.base, project.path());
    }

    #[test]
    fn test_discover_with_cwd_requires_marker_in_that_dir() {
        let project = make_project();
        let sub = project.path().join("web");

        let err = ProjectPaths::discover(Some(&sub), &sub).unwrap_err();
        assert!(err.to_string().contains("Couldn't find a \"redwood.toml\""));

        assert!(ProjectPaths::discover(Some(project.path()), &sub).is_ok());
    }

    #[test]
    fn test_discover_outside_project_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = ProjectPaths::discover(None, temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("Couldn't find up"));
    }

    #[test]
    fn test_typescript_detection() {
        let project = make_project();
        let paths = ProjectPaths::for_project(project.path());
        assert!(!paths.is_typescript_project());

        std::fs::write(project.path().join("web/tsconfig.json"), "{}").unwrap();
        assert!(paths.is_typescript_project());
    }
}
