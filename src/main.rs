use std::path::PathBuf;

use blogimport::error::Result;
use blogimport::output::Format;
use blogimport::store::layout::{DEFAULT_DST_ROOT, DEFAULT_SRC_ROOT, Layout};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "blogimport",
    version,
    about = "Migrate a legacy blog dump into the compact line format and blob trees",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Roots for the implicit `migrate` when no subcommand is given
    #[command(flatten)]
    roots: Roots,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Roots {
    /// Legacy tree holding texts.txt, articles.txt, crashes.txt and blobs
    #[arg(default_value = DEFAULT_SRC_ROOT)]
    src: PathBuf,
    /// Destination tree; receives data/, blobs/ and blobs_crashes/
    #[arg(default_value = DEFAULT_DST_ROOT)]
    dst: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full migration (the default when no subcommand is given)
    Migrate {
        #[command(flatten)]
        roots: Roots,
    },
    /// Parse, verify and renumber without writing anything
    Check {
        #[command(flatten)]
        roots: Roots,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, format: Format) -> Result<()> {
    let (roots, dry_run) = match command {
        Commands::Migrate { roots } => (roots, false),
        Commands::Check { roots } => (roots, true),
    };
    let layout = Layout::open(roots.src, roots.dst)?;
    tracing::info!(
        src = %layout.src_root().display(),
        dst = %layout.dst_root().display(),
        dry_run,
        "starting"
    );
    blogimport::commands::migrate::run(&layout, dry_run, format)
}

fn main() {
    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    init_logging();

    let command = cli
        .command
        .unwrap_or(Commands::Migrate { roots: cli.roots });
    if let Err(e) = run(command, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
