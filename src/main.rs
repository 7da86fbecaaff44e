use clap::{Parser, Subcommand};
use git_fleet::commands::*;
use git_fleet::core::{error::Result, print_error};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-fleet")]
#[command(about = "Keep track of every git repository under your project folders")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rediscover all roots and fetch every repository
    Scan,
    /// Show the cached tree brought up to date with a light refresh
    Refresh,
    /// Manage monitored root paths
    Roots {
        #[command(subcommand)]
        action: RootsAction,
    },
    /// Exclude a path from discovery
    Ignore {
        /// Folder or repository to ignore
        path: PathBuf,
    },
    /// Switch a repository to another branch
    Switch {
        /// Repository path
        repo: PathBuf,
        /// Branch to check out
        branch: String,
    },
}

#[derive(Subcommand)]
enum RootsAction {
    /// List monitored roots and ignored paths
    List,
    /// Start monitoring a folder
    Add { path: PathBuf },
    /// Stop monitoring a folder
    Remove { path: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger(cli.debug).init();

    if let Err(e) = run(cli.command).await {
        log::debug!("Command failed: {e:?}");
        if e.is_user_actionable() {
            print_error(&e.to_string());
        } else {
            print_error(&format!("{e} (run with --debug for details)"));
        }
        std::process::exit(1);
    }
}

/// `--debug` wins over `RUST_LOG`, which wins over the `warn` default
fn logger(debug: bool) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Scan => execute_scan().await,
        Commands::Refresh => execute_refresh().await,
        Commands::Roots { action } => match action {
            RootsAction::List => execute_roots_list(),
            RootsAction::Add { path } => execute_roots_add(path),
            RootsAction::Remove { path } => execute_roots_remove(path),
        },
        Commands::Ignore { path } => execute_ignore(path).await,
        Commands::Switch { repo, branch } => execute_switch(repo, branch).await,
    }
}
