//! cklb-sync: STIG checklist import, merge and diff tool
//!
//! Converts XCCDF benchmarks to CKLB checklists and carries findings forward
//! across benchmark releases.

#![allow(
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::needless_pass_by_value
)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use cklb_sync::{
    cli,
    config::{
        self, AppConfig, BatchMergeConfig, DiffConfig, DiffPaths, MergeConfig, ParseConfig,
        Validatable, ValidateConfig,
    },
    error::CklbError,
    pipeline::{exit_code_for, exit_codes},
    reports::ReportFormat,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported Inputs:",
        "\n  XCCDF:     1.1 Benchmark (DISA STIG manual benchmarks)",
        "\n  Checklist: CKLB JSON (STIG Viewer 3)",
        "\n\nOutput Formats:",
        "\n  summary, json"
    )
}

#[derive(Parser)]
#[command(name = "cklb-sync")]
#[command(version, long_version = build_long_version())]
#[command(about = "Import, merge and diff STIG checklists", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (no differences, or --fail-on-change not set)
    1  Differences detected (diff --fail-on-change)
    3  Error occurred
    4  STIG identity mismatch (merge without --force)

EXAMPLES:
    # Build a blank checklist from a new benchmark release
    cklb-sync parse U_RHEL_8_STIG_V1R12_Manual-xccdf.xml RHEL_8_V1R12.cklb

    # Carry findings from last quarter's checklist into the new release
    cklb-sync merge web01_RHEL_8_V1R11.cklb RHEL_8_V1R12.cklb --output-dir merged/

    # Merge a whole fleet in parallel
    cklb-sync batch-merge RHEL_8_V1R12.cklb old/*.cklb --output-dir merged/

    # CI check: fail when two checklists disagree
    cklb-sync diff before.cklb after.cklb --fail-on-change -o json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "CKLB_SYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `parse` subcommand
#[derive(Parser)]
struct ParseArgs {
    /// Path to the XCCDF benchmark
    input: PathBuf,

    /// Path of the checklist to write
    output: PathBuf,

    /// Report format
    #[arg(long)]
    format: Option<ReportFormat>,
}

/// Arguments for the `merge` subcommand
#[derive(Parser)]
struct MergeArgs {
    /// Path to the reviewed checklist of the previous release
    old: PathBuf,

    /// Path to the blank checklist of the new release
    new: PathBuf,

    /// Merge even when the STIG ids differ
    #[arg(long)]
    force: bool,

    /// Identifier used when the old checklist has no host name
    #[arg(long)]
    prefix: Option<String>,

    /// Write the merged checklist to this exact path
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for the generated file name (default: current directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Report format
    #[arg(long)]
    format: Option<ReportFormat>,
}

/// Arguments for the `batch-merge` subcommand
#[derive(Parser)]
struct BatchMergeArgs {
    /// Path to the blank checklist of the new release
    template: PathBuf,

    /// Reviewed checklists of the previous release
    #[arg(required = true)]
    old: Vec<PathBuf>,

    /// Directory the merged checklists are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Identifier used when an old checklist has no host name
    #[arg(long)]
    prefix: Option<String>,

    /// Merge even when the STIG ids differ
    #[arg(long)]
    force: bool,

    /// Number of worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Report format
    #[arg(long)]
    format: Option<ReportFormat>,
}

/// Arguments for the `diff` subcommand
#[derive(Parser)]
struct DiffArgs {
    /// Path to checklist A
    a: PathBuf,

    /// Path to checklist B
    b: PathBuf,

    /// Report format
    #[arg(short, long, visible_alias = "format")]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Exit with code 1 if any rule or finding differs
    #[arg(long)]
    fail_on_change: bool,
}

/// Arguments for the `validate` subcommand
#[derive(Parser)]
struct ValidateArgs {
    /// Checklists to validate
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Report format
    #[arg(long)]
    format: Option<ReportFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an XCCDF benchmark into a blank checklist
    Parse(ParseArgs),

    /// Carry findings from an old checklist into a new release
    Merge(MergeArgs),

    /// Merge many old checklists into one new release
    BatchMerge(BatchMergeArgs),

    /// Compare two checklists rule by rule
    Diff(DiffArgs),

    /// Check checklists for structural problems
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .cklb-sync.yaml in the current directory
    Init,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

/// Load the config file and layer the global flags over it.
fn effective_config(cli: &Cli) -> Result<AppConfig> {
    let overrides = AppConfig::builder().no_color(cli.no_color).build();
    let (config, loaded_from) =
        AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides)
            .map_err(|e| CklbError::config(e.to_string()))?;
    if let Some(path) = &loaded_from {
        tracing::debug!("Using config file {}", path.display());
    }
    Ok(config)
}

/// Validate a config after command-line overrides were applied.
fn checked(config: AppConfig) -> Result<AppConfig> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(config);
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(CklbError::config(message).into())
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Parse(ref args) => {
            let mut app = effective_config(&cli)?;
            if let Some(format) = args.format {
                app.output.format = format;
            }
            let app = checked(app)?;
            cli::run_parse(ParseConfig {
                input: args.input.clone(),
                output_path: args.output.clone(),
                output: app.output,
                quiet: cli.quiet,
            })
        }

        Commands::Merge(ref args) => {
            let mut app = effective_config(&cli)?;
            app.merge(
                &AppConfig::builder()
                    .prefix(args.prefix.clone())
                    .output_dir(args.output_dir.clone())
                    .build(),
            );
            if let Some(format) = args.format {
                app.output.format = format;
            }
            let app = checked(app)?;
            cli::run_merge(MergeConfig {
                old: args.old.clone(),
                template: args.new.clone(),
                output_file: args.output.clone(),
                output_dir: app.naming.output_dir.unwrap_or_else(|| PathBuf::from(".")),
                max_suffix: app.naming.max_suffix,
                prefix: app.merge.prefix,
                force: args.force,
                output: app.output,
                quiet: cli.quiet,
            })
        }

        Commands::BatchMerge(ref args) => {
            let mut app = effective_config(&cli)?;
            app.merge(
                &AppConfig::builder()
                    .prefix(args.prefix.clone())
                    .threads(args.threads)
                    .output_dir(args.output_dir.clone())
                    .build(),
            );
            if let Some(format) = args.format {
                app.output.format = format;
            }
            let app = checked(app)?;
            cli::run_batch_merge(BatchMergeConfig {
                template: args.template.clone(),
                old: args.old.clone(),
                output_dir: app.naming.output_dir.unwrap_or_else(|| PathBuf::from(".")),
                max_suffix: app.naming.max_suffix,
                prefix: app.merge.prefix,
                force: args.force,
                threads: app.merge.threads,
                output: app.output,
                quiet: cli.quiet,
            })
        }

        Commands::Diff(ref args) => {
            let mut app = effective_config(&cli)?;
            app.merge(&AppConfig::builder().fail_on_change(args.fail_on_change).build());
            if let Some(format) = args.output {
                app.output.format = format;
            }
            let app = checked(app)?;
            cli::run_diff(DiffConfig {
                paths: DiffPaths {
                    a: args.a.clone(),
                    b: args.b.clone(),
                },
                output: app.output,
                output_file: args.output_file.clone(),
                fail_on_change: app.diff.fail_on_change,
                quiet: cli.quiet,
            })
        }

        Commands::Validate(ref args) => {
            let mut app = effective_config(&cli)?;
            if let Some(format) = args.format {
                app.output.format = format;
            }
            let app = checked(app)?;
            cli::run_validate(ValidateConfig {
                paths: args.files.clone(),
                output: app.output,
                quiet: cli.quiet,
            })
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "cklb-sync", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { ref output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { ref action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = config::load_or_default(cli.config.as_deref())
                    .map_err(|e| CklbError::config(e.to_string()))?;
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for dir in config::file::search_dirs() {
                    eprintln!("  {}", dir.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".cklb-sync.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
