//! Command-line interface definitions for dupecat.
//!
//! Global options select the directory and how it is walked; the subcommand
//! selects what to do with the duplicates found there.
//!
//! # Example
//!
//! ```bash
//! # List duplicate sets under the current directory
//! dupecat search
//!
//! # Summarise a single directory level, without colors
//! dupecat --path ~/Downloads --no-recurse --no-color analyse
//!
//! # Delete junk copies without prompting, moving them to the trash
//! dupecat -p ~/Pictures delete --yes --trash
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files and clean up the redundant copies.
///
/// Files are grouped by size, then by a keyed BLAKE3 fingerprint of their
/// first 1024 bytes. In every duplicate set the first file is kept and the
/// others are junk.
#[derive(Debug, Parser)]
#[command(name = "dupecat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory to scan
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Only look at the directory itself, not its subdirectories
    #[arg(long, global = true)]
    pub no_recurse: bool,

    /// Number of fingerprint workers (overrides the config file)
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub workers: Option<u16>,

    /// Config file to read instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List duplicate sets
    Search(SearchArgs),
    /// Summarise the duplicates: count, reclaimable size, largest set
    #[command(alias = "analyze")]
    Analyse(AnalyseArgs),
    /// Delete every junk copy, keeping the first file of each set
    Delete(DeleteArgs),
    /// Print the merged configuration
    Config,
}

/// Arguments for the search subcommand.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Compare sizes only, skipping fingerprints
    ///
    /// Faster, but different files that happen to share a size are reported
    /// as duplicates.
    #[arg(long)]
    pub size_only: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the analyse subcommand.
#[derive(Debug, Args)]
pub struct AnalyseArgs {
    /// Compare sizes only, skipping fingerprints
    #[arg(long)]
    pub size_only: bool,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Move junk to the system trash instead of deleting it
    #[arg(long)]
    pub trash: bool,

    /// Compare sizes only, skipping fingerprints
    ///
    /// Dangerous with deletion: a file is removed just for sharing its size
    /// with another.
    #[arg(long)]
    pub size_only: bool,
}

/// Output format for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Numbered duplicate sets for humans
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_help() {
        assert!(Cli::try_parse_from(["dupecat", "--help"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["dupecat", "search"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(!cli.no_recurse);
        assert_eq!(cli.workers, None);
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Search(args) => {
                assert!(!args.size_only);
                assert_eq!(args.output, OutputFormat::Text);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dupecat",
            "search",
            "--path",
            "/data",
            "--no-recurse",
            "--workers",
            "4",
            "-vv",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.path, PathBuf::from("/data"));
        assert!(cli.no_recurse);
        assert_eq!(cli.workers, Some(4));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search(args) => assert_eq!(args.output, OutputFormat::Json),
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_workers_range() {
        assert!(Cli::try_parse_from(["dupecat", "--workers", "0", "search"]).is_err());
        assert!(Cli::try_parse_from(["dupecat", "--workers", "65", "search"]).is_err());
        assert!(Cli::try_parse_from(["dupecat", "--workers", "64", "search"]).is_ok());
    }

    #[test]
    fn test_cli_delete_flags() {
        let cli = Cli::try_parse_from(["dupecat", "-p", "/x", "delete", "-y", "--trash"]).unwrap();
        match cli.command {
            Commands::Delete(args) => {
                assert!(args.yes);
                assert!(args.trash);
                assert!(!args.size_only);
            }
            _ => panic!("Expected Delete command"),
        }
    }

    #[test]
    fn test_cli_analyse_alias() {
        let cli = Cli::try_parse_from(["dupecat", "analyze", "--size-only"]).unwrap();
        assert!(matches!(cli.command, Commands::Analyse(AnalyseArgs { size_only: true })));
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dupecat", "-v", "-q", "search"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["dupecat"]).is_err());
        assert!(Cli::try_parse_from(["dupecat", "invalid"]).is_err());
    }

    #[test]
    fn test_cli_config_subcommand() {
        let cli = Cli::try_parse_from(["dupecat", "config", "--config", "my.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
    }
}
