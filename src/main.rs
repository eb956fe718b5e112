use barrelgen::{
    BarrelDefinition, BarrelError, ProcessingOptions, Result, generate_barrel, load_config,
    sample_config, write_output,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const LONG_HELP: &str = r#"
Template reference:
  {name}                      - placeholder, pascal-cased by default
  {name:raw}                  - placeholder with a transform
  {name:trimPrefix:ops-|pascal} - chained, parameterized transforms

Transforms:
  raw, camel, pascal, kebab, singular, plural, trimPrefix, trimSuffix,
  addPrefix, addSuffix, replace, uppercase, lowercase, capitalize,
  uncapitalize

Examples:
  # Create a starting-point configuration
  barrelgen init
  # Generate all barrels from barrel.config.json
  barrelgen generate
  # Generate only the named barrels
  barrelgen generate --task handlers,modules
  # Preview without writing anything
  barrelgen generate --dry-run
  # Check a configuration file
  barrelgen validate -c barrel.config.json

Configuration example:
  {
    "version": "1.0",
    "barrels": [
      {
        "name": "handlers",
        "output": "./src/index.ts",
        "template": {
          "name": "variable-template",
          "export": "export * from './handlers/{name}/index.js'"
        }
      }
    ]
  }
"#;

/// Barrel file generation from variable templates.
#[derive(Parser, Debug)]
#[command(
    name = "barrelgen",
    version,
    about = "Generate barrel files from variable templates.",
    after_long_help = LONG_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate barrel files based on configuration
    Generate {
        /// Path to configuration file
        #[arg(
            short,
            long,
            value_name = "PATH",
            default_value = "barrel.config.json",
            env = "BARRELGEN_CONFIG"
        )]
        config: PathBuf,

        /// Show what would be generated without writing files
        #[arg(short = 'd', long)]
        dry_run: bool,

        /// Comma-separated list of barrel names to generate (default: all)
        #[arg(short, long, value_name = "NAMES")]
        task: Option<String>,
    },

    /// Create a sample configuration file
    Init {
        /// Overwrite existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(
            short,
            long,
            value_name = "PATH",
            default_value = "barrel.config.json",
            env = "BARRELGEN_CONFIG"
        )]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => LogLevel::Error,
        (false, 0) => LogLevel::Warn,
        (false, 1) => LogLevel::Info,
        (false, 2) => LogLevel::Debug,
        (false, _) => LogLevel::Trace,
    };

    let result = match &cli.command {
        Command::Generate {
            config,
            dry_run,
            task,
        } => generate(config, *dry_run, task.as_deref(), log_level),
        Command::Init { force } => init(*force, log_level),
        Command::Validate { config } => validate(config, log_level),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn generate(
    config_path: &Path,
    dry_run: bool,
    task: Option<&str>,
    log_level: LogLevel,
) -> Result<()> {
    log(
        log_level,
        LogLevel::Info,
        &format!("Loading configuration from {}", config_path.display()),
    );
    let config = load_config(config_path)?;

    let mut barrels: Vec<&BarrelDefinition> = config.barrels.iter().collect();
    if let Some(task) = task {
        let names: Vec<&str> = task.split(',').map(str::trim).collect();
        barrels.retain(|barrel| names.contains(&barrel.name.as_str()));
        if barrels.is_empty() {
            let available = config
                .barrels
                .iter()
                .map(|barrel| barrel.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(BarrelError::ConfigValidation {
                message: format!("no barrels match task names '{task}'; available: {available}"),
            });
        }
        log(
            log_level,
            LogLevel::Info,
            &format!(
                "Selected {} of {} barrels",
                barrels.len(),
                config.barrels.len()
            ),
        );
    }

    // Barrels run strictly in listed order; the first fatal error aborts the
    // rest of the run and already-written files stay in place.
    for definition in barrels {
        log(
            log_level,
            LogLevel::Info,
            &format!("Generating barrel '{}'", definition.name),
        );
        let result = generate_barrel(definition, config.global_options.as_ref())?;
        for warning in &result.warnings {
            log(log_level, LogLevel::Warn, warning);
        }

        if effective_dry_run(dry_run, definition, config.global_options.as_ref()) {
            println!("--- {} -> {} (dry run)", result.name, result.output.display());
            print!("{}", result.content);
        } else {
            write_output(&result, definition.template.mode)?;
            log(
                log_level,
                LogLevel::Info,
                &format!("Wrote {}", result.output.display()),
            );
        }
    }

    log(log_level, LogLevel::Info, "Barrel generation complete");
    Ok(())
}

/// A barrel is previewed instead of written if any of the CLI flag, its own
/// options, or the global options ask for a dry run.
fn effective_dry_run(
    cli_flag: bool,
    definition: &BarrelDefinition,
    global_options: Option<&ProcessingOptions>,
) -> bool {
    cli_flag
        || definition
            .options
            .as_ref()
            .is_some_and(|options| options.dry_run)
        || global_options.is_some_and(|options| options.dry_run)
}

fn init(force: bool, log_level: LogLevel) -> Result<()> {
    let config_path = Path::new("barrel.config.json");
    if config_path.exists() && !force {
        return Err(BarrelError::ConfigValidation {
            message: format!(
                "{} already exists; use --force to overwrite",
                config_path.display()
            ),
        });
    }

    let sample = sample_config();
    let mut content = serde_json::to_string_pretty(&sample)?;
    content.push('\n');
    std::fs::write(config_path, content)?;

    log(
        log_level,
        LogLevel::Info,
        "Edit the configuration to match your project structure",
    );
    println!("Created configuration file: {}", config_path.display());
    Ok(())
}

fn validate(config_path: &Path, log_level: LogLevel) -> Result<()> {
    log(
        log_level,
        LogLevel::Info,
        &format!("Validating configuration {}", config_path.display()),
    );
    let config = load_config(config_path)?;

    println!("Configuration is valid");
    println!("  Version: {}", config.version);
    println!("  Barrels: {}", config.barrels.len());
    for barrel in &config.barrels {
        println!(
            "  - {}: {} -> {}",
            barrel.name,
            barrel.template.name,
            barrel.output.display()
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

fn log(current_level: LogLevel, message_level: LogLevel, message: &str) {
    if message_level >= current_level {
        eprintln!(
            "[{}] {}",
            match message_level {
                LogLevel::Trace => "TRACE",
                LogLevel::Debug => "DEBUG",
                LogLevel::Info => "INFO",
                LogLevel::Warn => "WARN",
                LogLevel::Error => "ERROR",
            },
            message
        );
    }
}
