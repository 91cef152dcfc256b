//! Atlas CLI - render a declared cluster state into plain manifests

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;
mod exit_codes;
mod logging;
mod settings;

use error::CliError;
use settings::GlobalArgs;

#[derive(Parser)]
#[command(name = "atlas")]
#[command(author = "Atlas Contributors")]
#[command(version)]
#[command(about = "Render helm charts, kustomizations and raw manifests into per-cluster release directories", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init {
        /// Directory to create the config in (default: the --config path)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Scaffold package directories and print a config snippet for new ones
    #[command(disable_version_flag = true)]
    Add {
        /// Release names
        #[arg(required = true)]
        names: Vec<String>,

        /// Chart reference for the new releases
        #[arg(long)]
        chart: Option<String>,

        /// Chart version for the new releases
        #[arg(long)]
        version: Option<String>,

        /// Namespace for the new releases
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Download a release's chart into its package
    #[command(disable_version_flag = true)]
    Fetch {
        /// Release name
        name: String,

        /// Fetch this chart instead of the configured one
        #[arg(long)]
        chart: Option<String>,

        /// Fetch this version instead of the configured one
        #[arg(long)]
        version: Option<String>,

        /// Overwrite a chart marked dirty
        #[arg(long)]
        force: bool,
    },

    /// Render releases into the release path
    Render {
        /// Release names
        #[arg(conflicts_with = "all")]
        names: Vec<String>,

        /// Render every declared release
        #[arg(long)]
        all: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List declared releases with their resolved paths
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register the configured chart repositories with helm
    Repos,
}

fn main() -> ExitCode {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and succeed
            if !e.use_stderr() {
                e.exit();
            }
            let _ = e.print();
            return ExitCode::from(exit_codes::USAGE_ERROR);
        }
    };

    logging::init(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let global = &cli.global;

    match cli.command {
        Commands::Init { dir } => commands::init::run(global, dir.as_deref()),

        Commands::Add {
            names,
            chart,
            version,
            namespace,
        } => commands::add::run(
            global,
            &names,
            chart.as_deref(),
            version.as_deref(),
            namespace.as_deref(),
        ),

        Commands::Fetch {
            name,
            chart,
            version,
            force,
        } => commands::fetch::run(global, &name, chart.as_deref(), version.as_deref(), force),

        Commands::Render { names, all, json } => commands::render::run(global, &names, all, json),

        Commands::List { json } => commands::list::run(global, json),

        Commands::Repos => commands::repos::run(global),
    }
}
