//! regxplore - container registry explorer CLI.
//!
//! Thin wrapper over `regxplore-core`: every subcommand builds a driver for
//! one registry host and either drains its catalog, lists a repository's
//! tags, or resolves the newest tag per repository.

use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod config;
mod context;
mod format;

use commands::args::RegistryArgs;
use context::{AppContext, VerbosityLevel};
use format::{ColorChoice, OutputFormat};

/// regxplore - Container Registry Explorer
#[derive(Parser, Debug)]
#[command(name = "regxplore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// List every repository in a registry
    Catalog {
        #[command(flatten)]
        registry: RegistryArgs,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// List every tag for a repository
    ListTags {
        #[command(flatten)]
        registry: RegistryArgs,
        /// Repository path, e.g. `library/alpine`
        repo: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Resolve the newest tag (or tag group, for shared digests) per repository
    LatestTags {
        #[command(flatten)]
        registry: RegistryArgs,
        /// Repository path, e.g. `library/alpine`
        repo: String,
        /// How many distinct-digest groups to return, newest first
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Resolve the newest tag for every repository in the registry (or a
    /// given subset) and print `repository:tag` pairs
    Scan {
        #[command(flatten)]
        registry: RegistryArgs,
        /// Restrict the scan to these repositories; omit to scan the whole catalog
        repos: Vec<String>,
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let color = ColorChoice::from(cli.color.as_str());
    let verbosity = VerbosityLevel::from_count(cli.verbose);
    let ctx = AppContext::build(color, verbosity);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.tracing_filter())),
        )
        .init();

    let ok = match cli.command {
        Commands::Version => {
            commands::version::print_version();
            true
        }
        Commands::Catalog { mut registry, format } => {
            registry.host = ctx.resolve_host(&registry.host);
            commands::registry::handle_catalog(&registry, OutputFormat::from(format.as_str()), ctx.color)
                .await
        }
        Commands::ListTags {
            mut registry,
            repo,
            format,
        } => {
            registry.host = ctx.resolve_host(&registry.host);
            commands::registry::handle_list_tags(
                &registry,
                &repo,
                OutputFormat::from(format.as_str()),
                ctx.color,
            )
            .await
        }
        Commands::LatestTags {
            mut registry,
            repo,
            depth,
            format,
        } => {
            registry.host = ctx.resolve_host(&registry.host);
            commands::registry::handle_latest_tags(
                &registry,
                &repo,
                depth,
                OutputFormat::from(format.as_str()),
                ctx.color,
            )
            .await
        }
        Commands::Scan {
            mut registry,
            repos,
            format,
        } => {
            registry.host = ctx.resolve_host(&registry.host);
            commands::registry::handle_scan(
                &registry,
                &repos,
                OutputFormat::from(format.as_str()),
                ctx.color,
            )
            .await
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            true
        }
    };

    if ok {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    }
}
