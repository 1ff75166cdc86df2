//! README catalog CLI
//!
//! Parses the server listing into `catalogItems.jsonl` and fetches icons.

use std::path::PathBuf;

use clap::{Command as ClapCommand, CommandFactory, Parser, Subcommand};
use readme_catalog::{
    error::Result,
    models::Config,
    pipeline::{self, IconOptions, ParseOptions},
    services::HttpAssetFetcher,
};

/// README catalog extractor
#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    version,
    about = "Extract a validated server catalog from a markdown README"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "catalog.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and validate catalog records into JSONL
    Parse {
        /// Source README (default: paths.input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// JSONL destination (default: paths.output)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Failure log destination (default: paths.log)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Abort on the first validation failure
        #[arg(long)]
        strict: bool,

        /// Text marking the start of the catalog scope
        #[arg(long)]
        start_anchor: Option<String>,
    },

    /// Download the first icon of every record
    FetchIcons {
        /// JSONL catalog (default: paths.icons_input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Icon directory (default: paths.icons_dir)
        #[arg(long = "outDir", alias = "out-dir")]
        out_dir: Option<PathBuf>,

        /// Stop after this many saved or skipped records
        #[arg(long)]
        limit: Option<usize>,

        /// Replace icons that already exist
        #[arg(long)]
        overwrite: bool,

        /// Downloads in flight (default: fetcher.concurrency)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Validate the configuration file
    Validate,

    /// Show source fingerprint and catalog counts
    Info {
        /// Source README (default: paths.input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// JSONL catalog (default: paths.output)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Split argv into the tokens the CLI defines and the unknown flags dropped.
///
/// An unknown `--name` also drops the following token when that token is a
/// value rather than another flag or a subcommand.
fn known_args(args: impl IntoIterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let mut root = Cli::command();
    root.build();

    let mut args = args.into_iter().peekable();
    let mut kept: Vec<String> = args.next().into_iter().collect();
    let mut ignored = Vec::new();
    let mut subcommand: Option<ClapCommand> = None;

    while let Some(arg) = args.next() {
        if arg == "--" {
            kept.push(arg);
            kept.extend(args);
            break;
        }
        if !arg.starts_with('-') || arg == "-" {
            if subcommand.is_none() {
                subcommand = root.find_subcommand(&arg).cloned();
            }
            kept.push(arg);
            continue;
        }

        let known = subcommand
            .as_ref()
            .and_then(|sub| flag_takes_value(sub, &arg))
            .or_else(|| flag_takes_value(&root, &arg));
        match known {
            Some(takes_value) => {
                let value = (takes_value && !arg.contains('=')).then(|| args.next());
                kept.push(arg);
                kept.extend(value.flatten());
            }
            None => {
                let next_is_value = !arg.contains('=')
                    && args.peek().is_some_and(|next| {
                        !next.starts_with('-')
                            && (subcommand.is_some() || root.find_subcommand(next).is_none())
                    });
                if next_is_value {
                    args.next();
                }
                ignored.push(arg);
            }
        }
    }

    (kept, ignored)
}

/// Whether `token` names an argument of `command`, and if so whether it takes a value.
fn flag_takes_value(command: &ClapCommand, token: &str) -> Option<bool> {
    let name = token.split_once('=').map_or(token, |(name, _)| name);
    let arg = match name.strip_prefix("--") {
        Some(long) => command.get_arguments().find(|arg| {
            arg.get_long() == Some(long)
                || arg.get_aliases().is_some_and(|aliases| aliases.contains(&long))
        }),
        None => {
            let mut chars = name.chars().skip(1);
            let short = chars.next().filter(|_| chars.next().is_none())?;
            command
                .get_arguments()
                .find(|arg| arg.get_short() == Some(short))
        }
    }?;
    Some(arg.get_action().takes_values())
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let (args, ignored) = known_args(std::env::args());
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);
    for flag in &ignored {
        log::warn!("Ignoring unrecognized flag {flag}");
    }

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Parse {
            input,
            output,
            log,
            strict,
            start_anchor,
        } => {
            if let Some(anchor) = start_anchor {
                config.parser.start_anchor = anchor;
            }
            let input = input.unwrap_or_else(|| config.paths.input.clone().into());
            let output = output.unwrap_or_else(|| config.paths.output.clone().into());
            let options = ParseOptions {
                strict,
                log_path: log.unwrap_or_else(|| config.paths.log.clone().into()),
                parser: config.parser,
            };

            let report = pipeline::run_parse(&input, &output, &options)?;
            log::info!(
                "Wrote {} records to {} ({} failed)",
                report.written,
                output.display(),
                report.failed
            );
        }

        Command::FetchIcons {
            input,
            out_dir,
            limit,
            overwrite,
            concurrency,
        } => {
            if let Some(concurrency) = concurrency {
                config.fetcher.concurrency = concurrency;
            }
            config.validate()?;

            let input = input.unwrap_or_else(|| config.paths.icons_input.clone().into());
            let out_dir = out_dir.unwrap_or_else(|| config.paths.icons_dir.clone().into());
            let options = IconOptions {
                limit,
                overwrite,
                ..IconOptions::from(&config.fetcher)
            };

            let fetcher = HttpAssetFetcher::new(&config.fetcher)?;
            let report = pipeline::run_fetch_icons(&input, &out_dir, &options, fetcher).await?;
            log::info!(
                "Icons: {} saved, {} skipped, {} failed",
                report.saved,
                report.skipped,
                report.failed
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if !cli.config.exists() {
                log::warn!("{} not found; checking defaults", cli.config.display());
            } else {
                config = Config::load(&cli.config).inspect_err(|e| {
                    log::error!("Config load failed: {}", e);
                })?;
            }

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("    start anchor: {}", config.parser.start_anchor);
            log::info!("    concurrency: {}", config.fetcher.concurrency);
            log::info!("    timeout: {}s", config.fetcher.timeout_secs);
        }

        Command::Info { input, output } => {
            let input = input.unwrap_or_else(|| config.paths.input.clone().into());
            let output = output.unwrap_or_else(|| config.paths.output.clone().into());
            pipeline::run_info(&input, &output)?;
        }
    }

    log::info!("Done!");

    Ok(())
}
