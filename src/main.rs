#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `lost` - Find lost directories and files by fuzzy name and glob pattern.

use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use clap_cargo::style::CLAP_STYLING;
use lostfile::session::Session;
use lostfile::types::DEFAULT_PATTERN;
use lostfile::{Error, Finder, Result, WalkOptions};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// CLI arguments for `lost`
#[derive(Parser, Debug)]
#[command(author, version, about, styles = CLAP_STYLING)]
struct Cli {
    /// Directory to search in (defaults to your home directory)
    #[arg(short, long, env = "LOSTFILE_ROOT", global = true)]
    root:         Option<PathBuf>,
    /// Descend into symlinked directories
    #[arg(short = 'L', long, global = true)]
    follow_links: bool,
    /// Do not descend more than this many levels below the root
    #[arg(short = 'd', long, global = true)]
    max_depth:    Option<usize>,
    /// Sort names within each directory
    #[arg(short, long, global = true)]
    sorted:       bool,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose:      u8,
    /// Run one search non-interactively; prompts when omitted
    #[command(subcommand)]
    command:      Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Find directories by fuzzy name
    Dirs {
        /// Keyword to compare directory names against
        keyword: String,
    },
    /// Find files by glob pattern and optional fuzzy keyword
    Files {
        /// Glob pattern for file names
        #[arg(default_value = DEFAULT_PATTERN)]
        pattern: String,
        /// Keyword to compare file names against
        #[arg(short, long)]
        keyword: Option<String>,
    },
}

/// Install the stderr log subscriber; `RUST_LOG` overrides `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Resolve the directory to search, falling back to the home directory
fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => dirs::home_dir().ok_or(Error::NoHomeDir)?,
    };
    if !root.is_dir() {
        return Err(Error::NotADirectory(root));
    }
    Ok(root)
}

/// Print directories matching a keyword
fn find_directories(finder: &Finder, root: &Path, keyword: &str) {
    let results = finder.directories(root, keyword);

    println!("Found {} director{}:", results.len(), if results.len() == 1 { "y" } else { "ies" });
    for directory in results {
        println!("{}", directory.display());
    }
}

/// Print files matching a pattern and optional keyword
fn find_files(finder: &Finder, root: &Path, pattern: &str, keyword: Option<&str>) -> Result<()> {
    let results = finder.files(root, pattern, keyword)?;

    println!("Found {} file(s):", results.len());
    for file in results {
        println!("{}", file.display());
    }
    Ok(())
}

/// Run the prompt-driven search on the terminal
fn interactive(finder: Finder, root: &Path) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(stdin.lock(), stdout.lock(), finder).run(root)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let finder = Finder::new(WalkOptions {
        max_depth:    cli.max_depth,
        follow_links: cli.follow_links,
        sorted:       cli.sorted,
    });

    let result = resolve_root(cli.root).and_then(|root| match cli.command {
        Some(Command::Dirs { keyword }) => {
            find_directories(&finder, &root, &keyword);
            Ok(())
        },
        Some(Command::Files { pattern, keyword }) => {
            find_files(&finder, &root, &pattern, keyword.as_deref())
        },
        None => interactive(finder, &root),
    });

    if let Err(e) = result {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
