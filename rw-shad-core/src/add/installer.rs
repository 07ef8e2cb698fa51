//! Installer invocation

use std::path::Path;

use super::AddContext;
use crate::error::{Result, ShadError};
use crate::process::CommandSpec;

/// Build the `npx` command that adds `ctx.new_components`
///
/// ```text
/// npx --yes <installer> add --cwd <web> --config-dir <config> [--overwrite] <names...>
/// ```
///
/// `--cwd` is the web side (where the installer looks for `package.json`) and
/// `--config-dir` is the web config directory relative to it (where
/// `components.json` lives). The command runs in the project root.
pub fn installer_command(ctx: &AddContext) -> CommandSpec {
    let web = &ctx.paths.web;
    let config_dir = relative_to(&web.config, &web.base);

    let mut command = CommandSpec::new("npx", &ctx.paths.base)
        .args(["--yes", ctx.config.installer.as_str(), "add"])
        .arg("--cwd")
        .arg(web.base.display().to_string())
        .arg("--config-dir")
        .arg(config_dir);

    if ctx.force {
        command = command.arg("--overwrite");
    }

    command.args(ctx.new_components.keys().cloned())
}

/// Fail when the installer asks for `--overwrite`
///
/// The installer exits successfully after refusing to replace a file, the
/// only sign is its suggestion to pass `--overwrite`.
pub fn check_installer_output(output: &str) -> Result<()> {
    if output.contains("--overwrite") {
        return Err(ShadError::file(
            "Component already exists. Use --force to overwrite",
        ));
    }
    Ok(())
}

fn relative_to(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add::AddOptions;
    use crate::config::ShadConfig;
    use crate::paths::ProjectPaths;
    use crate::registry::{Component, ComponentFile};

    fn context(force: bool, names: &[&str]) -> AddContext {
        let paths = ProjectPaths::for_project(Path::new("/project"));
        let mut ctx = AddContext::new(
            paths,
            ShadConfig::default(),
            AddOptions {
                force,
                ..Default::default()
            },
        );
        for name in names {
            ctx.new_components.insert(
                name.to_string(),
                Component::new(*name, vec![ComponentFile::new(format!("ui/{name}.tsx"))]),
            );
        }
        ctx
    }

    #[test]
    fn test_installer_arguments() {
        let ctx = context(false, &["dialog", "button"]);
        let command = installer_command(&ctx);

        assert_eq!(command.program, "npx");
        assert_eq!(command.cwd, Path::new("/project"));
        assert_eq!(
            command.args,
            vec![
                "--yes",
                crate::config::DEFAULT_INSTALLER,
                "add",
                "--cwd",
                "/project/web",
                "--config-dir",
                "config",
                "button",
                "dialog",
            ]
        );
    }

    #[test]
    fn test_overwrite_only_with_force() {
        let without = installer_command(&context(false, &["button"]));
        assert!(!without.args.iter().any(|arg| arg == "--overwrite"));

        let with = installer_command(&context(true, &["button"]));
        let overwrite = with.args.iter().position(|arg| arg == "--overwrite").unwrap();
        let name = with.args.iter().position(|arg| arg == "button").unwrap();
        assert!(overwrite < name);
    }

    #[test]
    fn test_overwrite_suggestion_is_an_error() {
        let output = "The file button.tsx already exists. Use --overwrite to overwrite.";
        let err = check_installer_output(output).unwrap_err();
        assert_eq!(err.to_string(), "Component already exists. Use --force to overwrite");

        assert!(check_installer_output("✔ Done.").is_ok());
    }
}
