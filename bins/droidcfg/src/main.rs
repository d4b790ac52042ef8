//! droidcfg CLI
//!
//! Resolves and validates the configuration of an Android build variant.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use droidcfg_android::gradle;
use droidcfg_android::{
    BuildConfigResolver, BuildDeclaration, FlutterToolkit, ResolvedBuild, SigningRegistry,
};
use droidcfg_cli::output::{format_count, format_table, Status};
use droidcfg_core::config::Config;
use droidcfg_core::error::exit_codes;
use droidcfg_telemetry::{level_for, TelemetryConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidcfg")]
#[command(about = "Resolve and validate Android build variant configuration")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Resolve {
        #[command(flatten)]
        inputs: Inputs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve and report whether the configuration is valid
    Validate {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Print the Gradle command for a build type
    #[command(name = "gradle-args")]
    GradleArgs {
        #[command(flatten)]
        inputs: Inputs,
        /// Build type to build
        #[arg(long, default_value = "release")]
        build_type: String,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
    },
}

#[derive(Args)]
struct Inputs {
    /// Build declaration (defaults to general.manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Flutter local.properties (defaults to the flutter.source project)
    #[arg(long)]
    local_properties: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::failure(&e);
            std::process::exit(exit_codes::for_error(&e));
        }
    };

    droidcfg_telemetry::init_with_config(TelemetryConfig {
        json: cli.log_json,
        ansi: !cli.no_color,
        ..TelemetryConfig::with_level(level_for(
            &config.schema.logging.level,
            cli.verbose,
            cli.quiet,
        ))
    })?;

    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let exit_code = match cli.command {
        Commands::Resolve { inputs, json } => run_resolve(&config, &inputs, json)?,
        Commands::Validate { inputs } => run_validate(&config, &inputs),
        Commands::GradleArgs {
            inputs,
            build_type,
            bundle,
        } => run_gradle_args(&config, &inputs, &build_type, bundle),
    };

    std::process::exit(exit_code);
}

fn resolve(config: &Config, inputs: &Inputs) -> droidcfg_core::Result<ResolvedBuild> {
    let manifest_path = inputs
        .manifest
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.schema.general.manifest));
    let declaration = BuildDeclaration::load(&manifest_path)?;
    let registry = SigningRegistry::from_config(&config.schema.signing)?;

    let toolkit = match &inputs.local_properties {
        Some(path) => Some(FlutterToolkit::load(path)?),
        None => {
            let module_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
            let derived = declaration
                .local_properties_path(module_dir)
                .unwrap_or_else(|| PathBuf::from(&config.schema.general.local_properties));
            load_derived_toolkit(&derived)?
        }
    };

    let mut resolver = BuildConfigResolver::new(&registry);
    if let Some(toolkit) = &toolkit {
        resolver = resolver.with_toolkit(toolkit);
    }
    resolver.resolve(&declaration)
}

/// A missing derived `local.properties` leaves the toolkit unbound
fn load_derived_toolkit(properties_path: &Path) -> droidcfg_core::Result<Option<FlutterToolkit>> {
    if properties_path.exists() {
        Ok(Some(FlutterToolkit::load(properties_path)?))
    } else {
        tracing::warn!(
            path = %properties_path.display(),
            "local.properties not found, toolkit is unbound"
        );
        Ok(None)
    }
}

fn run_resolve(config: &Config, inputs: &Inputs, json: bool) -> Result<i32> {
    let resolved = match resolve(config, inputs) {
        Ok(resolved) => resolved,
        Err(e) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&e.to_report())?);
            } else {
                Status::failure(&e);
            }
            return Ok(exit_codes::for_error(&e));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header("Plugins");
    for plugin in resolved.plugins.iter() {
        println!("{}", plugin);
    }

    Status::header("Configuration");
    let rows: Vec<(String, String, String)> = resolved
        .config
        .iter()
        .map(|(key, entry)| {
            (
                key.to_string(),
                entry.value.to_string(),
                entry.origin.to_string(),
            )
        })
        .collect();
    for line in format_table(&rows) {
        println!("{}", line);
    }

    Status::header("Build types");
    let rows: Vec<(String, String, String)> = resolved
        .build_types
        .values()
        .map(|profile| {
            (
                profile.build_type.clone(),
                profile
                    .signing_profile
                    .clone()
                    .unwrap_or_else(|| "unsigned".to_string()),
                String::new(),
            )
        })
        .collect();
    for line in format_table(&rows) {
        println!("{}", line);
    }

    print_warnings(&resolved);
    Ok(exit_codes::SUCCESS)
}

fn run_validate(config: &Config, inputs: &Inputs) -> i32 {
    match resolve(config, inputs) {
        Ok(resolved) => {
            print_warnings(&resolved);
            Status::success(&format!(
                "Configuration is valid ({})",
                format_count(resolved.warnings.len(), "warning", "warnings")
            ));
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::failure(&e);
            exit_codes::for_error(&e)
        }
    }
}

fn run_gradle_args(config: &Config, inputs: &Inputs, build_type: &str, bundle: bool) -> i32 {
    let args = resolve(config, inputs)
        .and_then(|resolved| gradle::gradle_args(&resolved, build_type, bundle));

    match args {
        Ok(args) => {
            println!("{} {}", gradle::wrapper(), args.join(" "));
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::failure(&e);
            exit_codes::for_error(&e)
        }
    }
}

fn print_warnings(resolved: &ResolvedBuild) {
    for warning in &resolved.warnings {
        Status::warning(&warning.to_string());
    }
}
