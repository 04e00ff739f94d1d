//! pyforge - Python project scaffolder
//!
//! CLI front end that drives the scaffolding worker and renders its
//! event stream.

mod cli;
mod display;
mod error;
mod events;

use crate::cli::{Cli, Commands, NewArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use pyforge_config::Config;
use pyforge_errors::Error;
use pyforge_scaffold::{Facilities, ProjectWorker, RunOutcome};
use pyforge_types::{ColorChoice, PackageSpec, ProjectOptions, ProjectSpec};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("application error: {e}");
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic; returns the process exit code.
async fn run(cli: Cli) -> Result<i32, CliError> {
    info!("starting pyforge v{}", env!("CARGO_PKG_VERSION"));

    // Configuration precedence: file, then environment, then CLI flags.
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);

    match cli.command {
        Commands::Presets => {
            renderer.render_presets(&config)?;
            Ok(0)
        }
        Commands::New(args) => {
            let handler = EventHandler::new(cli.global.json, colors_enabled);
            run_new(&args, &config, &renderer, &handler).await
        }
    }
}

/// Create a project, streaming worker events until the run finishes.
async fn run_new(
    args: &NewArgs,
    config: &Config,
    renderer: &OutputRenderer,
    handler: &EventHandler,
) -> Result<i32, CliError> {
    let spec = build_spec(args, config)?;

    let worker = ProjectWorker::new();
    let mut handle = worker.start(spec, Facilities::production())?;
    info!("run {} started", handle.run_id());

    let mut interrupted = false;
    loop {
        select! {
            event = handle.recv() => match event {
                Some(event) => handler.handle_event(&event),
                None => break,
            },
            result = tokio::signal::ctrl_c(), if !interrupted => {
                if let Err(e) = result {
                    error!("failed to listen for interrupt: {e}");
                }
                interrupted = true;
                handler.notify_interrupt();
                handle.cancel();
            }
        }
    }

    match handle.wait().await? {
        RunOutcome::Completed(summary) => {
            renderer.render_summary(&summary);
            info!("run completed");
            Ok(0)
        }
        RunOutcome::Failed {
            failure,
            cleanup_performed,
            ..
        } => {
            renderer.render_failure(&failure, cleanup_performed);
            Ok(1)
        }
        RunOutcome::Cancelled {
            cleanup_performed, ..
        } => {
            renderer.render_cancelled(cleanup_performed);
            Ok(130)
        }
    }
}

/// Assemble the project spec from CLI arguments and configuration.
fn build_spec(args: &NewArgs, config: &Config) -> Result<ProjectSpec, CliError> {
    let mut raw: Vec<String> = Vec::new();

    let preset = if args.no_preset {
        None
    } else {
        args.preset
            .as_deref()
            .or(config.project.default_preset.as_deref())
    };
    if let Some(name) = preset {
        let packages = config
            .resolve_preset(name)
            .ok_or_else(|| CliError::InvalidArguments(format!("unknown preset '{name}'")))?;
        raw.extend(packages);
    }
    raw.extend(args.packages.iter().cloned());

    let mut packages = Vec::with_capacity(raw.len());
    for spec in &raw {
        packages.push(PackageSpec::parse(spec).map_err(Error::from)?);
    }

    let target = match &args.target {
        Some(dir) => dir.clone(),
        None => match &config.paths.default_target {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        },
    };

    let options = ProjectOptions {
        create_readme: resolve_flag(args.readme, args.no_readme, config.project.create_readme),
        init_git: resolve_flag(args.git, args.no_git, config.project.init_git),
        cleanup_on_failure: if args.keep_on_failure {
            false
        } else {
            config.project.cleanup_on_failure
        },
        dedup: config.project.dedup,
    };

    Ok(ProjectSpec {
        name: args.name.clone(),
        target,
        packages,
        options,
    })
}

/// Tri-state CLI flag pair over a configured default.
fn resolve_flag(yes: bool, no: bool, default: bool) -> bool {
    if yes {
        true
    } else if no {
        false
    } else {
        default
    }
}

/// Initialize tracing. JSON mode suppresses log output entirely so the
/// event stream on stdout stays machine-readable.
fn init_tracing(json_mode: bool, debug: bool) {
    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
        return;
    }

    let default = if debug { "info,pyforge=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(name: &str) -> NewArgs {
        NewArgs {
            name: name.to_string(),
            target: Some(std::path::PathBuf::from("/tmp")),
            packages: Vec::new(),
            preset: None,
            no_preset: false,
            readme: false,
            no_readme: false,
            git: false,
            no_git: false,
            keep_on_failure: false,
        }
    }

    #[test]
    fn cli_flags_override_configured_defaults() {
        let config = Config::default();
        let mut new_args = args("demo");
        new_args.no_readme = true;
        new_args.git = true;
        new_args.keep_on_failure = true;

        let spec = build_spec(&new_args, &config).unwrap();
        assert!(!spec.options.create_readme);
        assert!(spec.options.init_git);
        assert!(!spec.options.cleanup_on_failure);
    }

    #[test]
    fn preset_packages_come_before_explicit_ones() {
        let config = Config::default();
        let mut new_args = args("demo");
        new_args.preset = Some("flask".to_string());
        new_args.packages = vec!["rich".to_string()];

        let spec = build_spec(&new_args, &config).unwrap();
        assert!(spec.packages.len() > 1);
        assert_eq!(spec.packages.last().map(ToString::to_string).as_deref(), Some("rich"));
        assert_eq!(spec.packages[0].name, "flask");
    }

    #[test]
    fn unknown_preset_is_an_argument_error() {
        let config = Config::default();
        let mut new_args = args("demo");
        new_args.preset = Some("no-such-preset".to_string());

        assert!(matches!(
            build_spec(&new_args, &config),
            Err(CliError::InvalidArguments(_))
        ));
    }

    #[test]
    fn bad_package_specifier_is_a_validation_error() {
        let config = Config::default();
        let mut new_args = args("demo");
        new_args.packages = vec!["requests; rm -rf /".to_string()];

        assert!(matches!(
            build_spec(&new_args, &config),
            Err(CliError::Run(Error::Validation(_)))
        ));
    }
}
