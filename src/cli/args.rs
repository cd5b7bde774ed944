use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::common::format::parse_duration;
use crate::sweeper::DirPolicy;

/// runsweep: retention-based cleanup for run and scratch directories
#[derive(Parser, Debug)]
#[command(
    name = "runsweep",
    version,
    about = "Delete directory entries older than a retention window",
    long_about = "runsweep removes every entry of a directory whose last modification is\n\
                   older than the retention window, keeping the exempt names untouched.\n\
                   Deletion is permanent.",
    after_help = "EXAMPLES:\n  \
        runsweep sweep                            Sweep the configured directory\n  \
        runsweep sweep run/ --retention 1m        Remove entries older than a minute\n  \
        runsweep sweep run/ -e massccs -e input   Keep two names regardless of age\n  \
        runsweep sweep out/ --dir-policy tree     Also remove stale subdirectories\n  \
        runsweep sweep run/ --format json         Machine-readable report\n  \
        runsweep history --limit 5                Show recent sweeps\n  \
        runsweep config set retention 24h         Change the default retention"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Also append logs to a file in the runsweep logs directory
    #[arg(long, global = true)]
    pub log_file: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete stale entries from a directory
    Sweep {
        /// Directory to sweep (defaults to the configured directory)
        dir: Option<PathBuf>,

        /// Retention window: 90, 90s, 15m, 2h, 7d
        #[arg(long, short, value_parser = parse_duration)]
        retention: Option<Duration>,

        /// Entry name that is never deleted (repeatable; replaces the configured list)
        #[arg(long = "exempt", short = 'e', value_name = "NAME")]
        exempt: Vec<String>,

        /// How to treat subdirectories
        #[arg(long, value_enum)]
        dir_policy: Option<DirPolicyArg>,

        /// Do not write a history record for this sweep
        #[arg(long)]
        no_history: bool,
    },

    /// Show recent sweeps
    History {
        /// Number of sweeps to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset to default configuration
    Reset,

    /// Set a configuration value
    ///
    /// `exempt` takes every value given, each one a full name:
    /// `config set exempt massccs keep,me` exempts `massccs` and `keep,me`.
    Set {
        /// Configuration key
        key: String,
        /// Configuration value(s)
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },

    /// Initialize runsweep directories and default config
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

impl From<&crate::common::config::OutputFormat> for OutputFormat {
    fn from(format: &crate::common::config::OutputFormat) -> Self {
        match format {
            crate::common::config::OutputFormat::Human => OutputFormat::Human,
            crate::common::config::OutputFormat::Json => OutputFormat::Json,
            crate::common::config::OutputFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirPolicyArg {
    /// Keep every subdirectory
    Skip,
    /// Remove stale subdirectories that are empty
    Empty,
    /// Remove stale subdirectories with their contents
    Tree,
}

impl From<DirPolicyArg> for DirPolicy {
    fn from(arg: DirPolicyArg) -> Self {
        match arg {
            DirPolicyArg::Skip => DirPolicy::Skip,
            DirPolicyArg::Empty => DirPolicy::RemoveEmpty,
            DirPolicyArg::Tree => DirPolicy::RemoveTree,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sweep_args() {
        let cli = Cli::parse_from([
            "runsweep", "sweep", "out", "--retention", "2m", "-e", "keepme", "-e", "other",
            "--dir-policy", "tree",
        ]);
        match cli.command {
            Commands::Sweep {
                dir,
                retention,
                exempt,
                dir_policy,
                no_history,
            } => {
                assert_eq!(dir, Some(PathBuf::from("out")));
                assert_eq!(retention, Some(Duration::from_secs(120)));
                assert_eq!(exempt, vec!["keepme".to_string(), "other".to_string()]);
                assert!(matches!(dir_policy, Some(DirPolicyArg::Tree)));
                assert!(!no_history);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_retention_rejected() {
        assert!(Cli::try_parse_from(["runsweep", "sweep", "--retention", "soon"]).is_err());
    }

    #[test]
    fn test_config_set_takes_repeated_values() {
        let cli = Cli::parse_from(["runsweep", "config", "set", "exempt", "a", "b,c"]);
        match cli.command {
            Commands::Config {
                action: ConfigAction::Set { key, values },
            } => {
                assert_eq!(key, "exempt");
                assert_eq!(values, vec!["a".to_string(), "b,c".to_string()]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["runsweep", "config", "set", "exempt"]).is_err());
    }
}
