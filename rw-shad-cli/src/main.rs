//! rw-shad - shadcn/ui components for Redwood projects
//!
//! `rw-shad [COMPONENTS]...` adds components, `rw-shad setup` prepares the
//! project and `rw-shad cache clear` drops the local registry cache.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rw_shad_core::add::{build_add_pipeline, AddContext, AddOptions, AddServices};
use rw_shad_core::config::ShadConfig;
use rw_shad_core::paths::ProjectPaths;
use rw_shad_core::pipeline::PipelineError;
use rw_shad_core::process::{
    ensure_supported_yarn, watch_interrupts, TokioRunner, INTERRUPTED_EXIT_CODE,
};
use rw_shad_core::registry::{HttpRegistry, RegistryCache};
use rw_shad_core::setup::{build_setup_pipeline, SetupContext};
use rw_shad_core::ShadError;

mod picker;
mod render;

use picker::TerminalPicker;
use render::TerminalRenderer;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "rw-shad",
    about = "Add shadcn/ui components to your Redwood project",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// Components to add (e.g. `button alertDialog`). Prompts when empty
    components: Vec<String>,

    /// Overwrite existing components
    #[clap(short, long)]
    force: bool,

    /// Refetch the component registry even if the cache is fresh
    #[clap(long)]
    refresh: bool,

    /// Working directory to use (where `redwood.toml` is located)
    #[clap(long, env = "RWJS_CWD", global = true)]
    cwd: Option<PathBuf>,

    /// Set log level
    #[clap(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Set up shadcn/ui in the project (Tailwind theme, packages, config)
    Setup {
        /// Overwrite existing Tailwind config and generated files
        #[clap(short, long)]
        force: bool,
    },

    /// Manage the local component registry cache
    Cache {
        #[clap(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Parser, Debug)]
enum CacheCommand {
    /// Remove the cached registry
    Clear,
}

fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    // Child runs install a SIGINT listener, Ctrl-C must still end the program
    tokio::spawn(watch_interrupts(|| {
        eprintln!();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }));

    if let Err(e) = run(cli).await {
        eprintln!("{}", e.to_string().red());
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let start = std::env::current_dir().context("Failed to read the current directory")?;
    let paths = ProjectPaths::discover(cli.cwd.as_deref(), &start)?;
    debug!("Using project at {}", paths.base.display());

    let config = ShadConfig::load(&paths)?;

    match cli.command {
        Some(Command::Cache {
            command: CacheCommand::Clear,
        }) => cache_clear_command(&paths),
        Some(Command::Setup { force }) => setup_command(paths, config, force).await,
        None => {
            let options = AddOptions {
                components: cli.components,
                force: cli.force,
                refresh: cli.refresh,
            };
            add_command(paths, config, options).await
        }
    }
}

async fn add_command(paths: ProjectPaths, config: ShadConfig, options: AddOptions) -> Result<()> {
    let runner = Arc::new(TokioRunner);
    ensure_supported_yarn(runner.as_ref(), &paths.base).await?;

    let services = AddServices {
        source: Arc::new(HttpRegistry::new(&config)?),
        runner,
        picker: Arc::new(TerminalPicker),
    };

    let ctx = AddContext::new(paths, config, options);
    build_add_pipeline(&services)
        .run_with_observer(ctx, &mut TerminalRenderer::default())
        .await?;
    Ok(())
}

async fn setup_command(paths: ProjectPaths, config: ShadConfig, force: bool) -> Result<()> {
    let runner = Arc::new(TokioRunner);
    ensure_supported_yarn(runner.as_ref(), &paths.base).await?;

    let ctx = SetupContext::new(paths, config, force);
    build_setup_pipeline(runner)
        .run_with_observer(ctx, &mut TerminalRenderer::default())
        .await?;

    println!();
    println!(
        "{}",
        "Now try `yarn rw-shad button` to generate your first component".cyan()
    );
    println!();
    Ok(())
}

fn cache_clear_command(paths: &ProjectPaths) -> Result<()> {
    let cache = RegistryCache::for_project(paths);
    cache
        .clear()
        .with_context(|| format!("Failed to clear {}", paths.registry_cache_dir().display()))?;
    println!("{} Registry cache cleared", "✔".green());
    Ok(())
}

/// Exit code carried by a failed external process, else 1
fn exit_code(error: &anyhow::Error) -> i32 {
    let code = if let Some(e) = error.downcast_ref::<PipelineError>() {
        e.exit_code()
    } else if let Some(e) = error.downcast_ref::<ShadError>() {
        e.exit_code()
    } else {
        None
    };

    match code {
        Some(code) if code != 0 => code,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let cli = Cli::try_parse_from(["rw-shad", "button", "alertDialog", "--force"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.components, vec!["button", "alertDialog"]);
        assert!(cli.force);
        assert!(!cli.refresh);
    }

    #[test]
    fn test_parse_setup() {
        let cli = Cli::try_parse_from(["rw-shad", "setup", "-f"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Setup { force: true })));
        assert!(cli.components.is_empty());
    }

    #[test]
    fn test_parse_cache_clear_with_cwd() {
        let cli = Cli::try_parse_from(["rw-shad", "cache", "clear", "--cwd", "/app"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Cache {
                command: CacheCommand::Clear
            })
        ));
        assert_eq!(cli.cwd, Some(PathBuf::from("/app")));
    }

    #[test]
    fn test_default_log_level() {
        let cli = Cli::try_parse_from(["rw-shad"]).unwrap();
        assert!(matches!(cli.log_level, LogLevel::Warn));
        assert!(cli.components.is_empty());
    }

    #[test]
    fn test_exit_code_from_pipeline_error() {
        let error = anyhow::Error::new(PipelineError {
            index: 2,
            title: "Adding component(s)...".to_string(),
            source: ShadError::ExternalProcess {
                message: "`npx` failed".to_string(),
                output: String::new(),
                exit_code: Some(7),
            },
            reports: Vec::new(),
        });
        assert_eq!(exit_code(&error), 7);

        let error = anyhow::Error::new(ShadError::ComponentNotFound("x".to_string()));
        assert_eq!(exit_code(&error), 1);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
