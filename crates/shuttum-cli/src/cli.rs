//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use shuttum_core::{MatchPolicy, Timestamp};
use std::path::PathBuf;

/// Inspect and query recorded dual-shutter stereo sequences.
#[derive(Parser, Debug)]
#[command(name = "shuttum", author, version, about)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the metadata of a sequence
    Info(InfoArgs),

    /// Print the records at a timestamp or within a time range
    Query(QueryArgs),
}

/// Options shared by all commands that open a sequence.
#[derive(Args, Debug, Clone)]
pub struct SequenceArgs {
    /// Path to the sequence folder
    #[arg(env = "SHUTTUM_SEQUENCE")]
    pub sequence: PathBuf,

    /// Treat the sequence as a calibration sequence, where cam1 and cam2
    /// use global and cam3 and cam4 rolling shutter
    #[arg(long)]
    pub calibration: bool,

    /// Keep stereo frames that only one camera captured
    #[arg(long)]
    pub no_stereosync: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub input: SequenceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub input: SequenceArgs,

    /// Resolve a single timestamp
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub at: Option<Timestamp>,

    /// First timestamp of the range, inclusive
    #[arg(long)]
    pub from: Option<Timestamp>,

    /// Last timestamp of the range, inclusive
    #[arg(long)]
    pub to: Option<Timestamp>,

    /// How samples are matched to the queried timestamps
    #[arg(long, default_value = "exact", value_parser = parse_policy)]
    pub policy: MatchPolicy,

    /// Print at most this many records
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output one JSON object per record
    #[arg(long)]
    pub json: bool,
}

fn parse_policy(value: &str) -> Result<MatchPolicy, String> {
    value.parse().map_err(|err: shuttum_core::Error| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_range() {
        let cli = Cli::try_parse_from([
            "shuttum", "query", "seq01", "--from", "5", "--to", "45", "--policy", "nearest",
        ])
        .unwrap();

        let Commands::Query(args) = cli.command else {
            panic!("expected query command");
        };
        assert_eq!(args.input.sequence, PathBuf::from("seq01"));
        assert_eq!(args.from, Some(5.0));
        assert_eq!(args.to, Some(45.0));
        assert_eq!(args.policy, MatchPolicy::Nearest);
        assert!(!args.json);
        assert!(!args.input.no_stereosync);
    }

    #[test]
    fn test_parse_info_without_stereosync() {
        let cli =
            Cli::try_parse_from(["shuttum", "info", "seq01", "--no-stereosync", "--json"]).unwrap();

        let Commands::Info(args) = cli.command else {
            panic!("expected info command");
        };
        assert!(args.input.no_stereosync);
        assert!(!args.input.calibration);
        assert!(args.json);
    }

    #[test]
    fn test_at_conflicts_with_range() {
        let result = Cli::try_parse_from(["shuttum", "query", "seq01", "--at", "1", "--to", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = Cli::try_parse_from(["shuttum", "query", "seq01", "--policy", "cubic"]);
        assert!(result.is_err());
    }
}
