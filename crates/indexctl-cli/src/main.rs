mod commands;
mod confirm;

use clap::{Parser, Subcommand, ValueEnum};
use indexctl_store::sync::SyncDirection;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "indexctl",
    about = "Composite-index requirement analyzer and synchronizer",
    version
)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan application source for query shapes that need a composite
    /// index and report the ones the declared configuration lacks
    Validate {
        /// Source tree to scan
        #[arg(long, default_value = ".")]
        src: String,

        /// Glob for source files, relative to --src
        #[arg(long, default_value = "**/*.{js,jsx,ts,tsx}")]
        pattern: String,

        /// Declared index configuration file
        #[arg(long, default_value = "indexes.json")]
        index_path: String,

        /// Where to write the missing-index report
        #[arg(long, default_value = "index-report.json")]
        output_path: String,
    },

    /// Compare the declared configuration with the deployed one and
    /// pull, push, or just report
    Sync {
        /// pull (remote wins), push (local wins), or diff (report only)
        #[arg(long, value_enum)]
        direction: Direction,

        /// Environment / project identifier for the deployment CLI
        #[arg(long)]
        env: String,

        /// Declared index configuration file
        #[arg(long, default_value = "indexes.json")]
        config_path: String,

        /// Proceed past critical-index violations and skip confirmation
        #[arg(long)]
        force: bool,

        /// JSON file listing indexes that must never be dropped
        #[arg(long)]
        critical_path: Option<String>,

        /// Deployment CLI binary
        #[arg(long, default_value = "firebase")]
        deploy_bin: String,

        /// Directory for pre-write configuration snapshots
        #[arg(long, default_value = ".index-backups")]
        backup_dir: String,

        /// Snapshots to keep per kind
        #[arg(long, default_value = "5")]
        keep_backups: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Pull,
    Push,
    Diff,
}

impl From<Direction> for SyncDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Pull => SyncDirection::Pull,
            Direction::Push => SyncDirection::Push,
            Direction::Diff => SyncDirection::Diff,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            src,
            pattern,
            index_path,
            output_path,
        } => commands::validate::run(src, pattern, index_path, output_path, cli.json),
        Commands::Sync {
            direction,
            env,
            config_path,
            force,
            critical_path,
            deploy_bin,
            backup_dir,
            keep_backups,
        } => commands::sync::run(commands::sync::Args {
            direction: direction.into(),
            env,
            config_path,
            force,
            critical_path,
            deploy_bin,
            backup_dir,
            keep_backups,
            json: cli.json,
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
