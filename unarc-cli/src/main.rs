//! unarc CLI - list and extract ZIP and TAR archives.
//!
//! Encrypted archives and encrypted entries are skipped with a warning;
//! every other failure aborts the run with a non-zero exit status.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{ExtractArgs, ListOptions, cmd_detect, cmd_extract, cmd_list};
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "unarc")]
#[command(author, version, about = "Extract and list ZIP and TAR archives")]
#[command(long_about = "
unarc reads ZIP, TAR and gzip-compressed TAR archives from files, numbered
volume sets or standard input.

Examples:
  unarc list archive.zip
  unarc list --json backup.tar.gz
  unarc extract archive.zip -o out/
  unarc extract backup.tar.001 --split -o restore/
  cat bundle.tar.gz | unarc extract - -o out/
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "log-level", action = clap::ArgAction::Count, global = true)]
    log_level: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show sizes and totals
        #[arg(short = 'l', long)]
        long: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only entries matching pattern (glob syntax: *.txt, src/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Extract an archive into a directory
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract, `-` for standard input
        archive: PathBuf,

        /// Output directory (must exist)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Additional volumes following the archive, in order
        #[arg(long, num_args = 1..)]
        parts: Vec<PathBuf>,

        /// Collect numbered volumes (.001, .002, ...) starting at the archive
        #[arg(long, conflicts_with = "parts")]
        split: bool,

        /// Fail instead of replacing existing files
        #[arg(long)]
        no_overwrite: bool,

        /// Do not restore modification times
        #[arg(long)]
        no_mtime: bool,

        /// Include only entries matching pattern (glob syntax: *.txt, src/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Print every extracted entry
        #[arg(short = 'l', long)]
        list: bool,

        /// Show a progress spinner
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Detect archive format
    Detect {
        /// File to detect
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).without_time())
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result = match cli.command {
        Commands::List {
            archive,
            long,
            json,
            include,
            exclude,
        } => cmd_list(
            &archive,
            &ListOptions {
                verbose: long,
                json,
                include: &include,
                exclude: &exclude,
            },
        ),
        Commands::Extract {
            archive,
            output,
            parts,
            split,
            no_overwrite,
            no_mtime,
            include,
            exclude,
            list,
            progress,
        } => cmd_extract(&ExtractArgs {
            archive: &archive,
            output: &output,
            overwrite: !no_overwrite,
            preserve_mtime: !no_mtime,
            progress,
            verbose: list,
            include: &include,
            exclude: &exclude,
            parts: &parts,
            split,
        }),
        Commands::Detect { file } => cmd_detect(&file),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "unarc", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::try_parse_from(["unarc", "list", "a.zip", "-vv"]).unwrap();
        assert_eq!(cli.log_level, 2);
    }

    #[test]
    fn test_split_conflicts_with_parts() {
        let result = Cli::try_parse_from([
            "unarc", "extract", "a.001", "--split", "--parts", "a.002",
        ]);
        assert!(result.is_err());
    }
}
