//! Command-line definition

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use crate::batch::{BatchAction, InputSource};
use crate::report::{EXIT_INVALID_INPUT, EXIT_SUCCESS};

/// netctl - manage network resources in the datastore
#[derive(Parser, Debug)]
#[command(name = "netctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create resources, failing on any that already exist
    Create(CreateArgs),
    /// Create resources or replace the ones that already exist
    Apply(ApplyArgs),
}

/// Connection options shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Client configuration file (YAML or JSON) [default: /etc/netctl/netctl.cfg]
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// File to read resources from, "-" for stdin
    #[arg(short = 'f', long = "filename", value_name = "FILENAME")]
    pub filename: String,

    /// Treat resources that already exist as successfully created
    #[arg(long)]
    pub skip_exists: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// File to read resources from, "-" for stdin
    #[arg(short = 'f', long = "filename", value_name = "FILENAME")]
    pub filename: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// A parsed command, ready to run
#[derive(Debug)]
pub struct Invocation {
    pub source: InputSource,
    pub action: BatchAction,
    pub connection: ConnectionArgs,
}

impl Commands {
    pub fn into_invocation(self) -> Invocation {
        match self {
            Commands::Create(args) => Invocation {
                source: InputSource::from_arg(&args.filename),
                action: BatchAction::Create {
                    skip_existing: args.skip_exists,
                },
                connection: args.connection,
            },
            Commands::Apply(args) => Invocation {
                source: InputSource::from_arg(&args.filename),
                action: BatchAction::Apply,
                connection: args.connection,
            },
        }
    }
}

/// Exit status for an argument parsing outcome.
///
/// Help and version output are successes; every other usage error is
/// invalid input, never the status reserved for failed batches.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_INVALID_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Invocation {
        Cli::try_parse_from(args).unwrap().command.into_invocation()
    }

    #[test]
    fn test_create_with_skip_exists() {
        let invocation = parse(&["netctl", "create", "-f", "pools.yaml", "--skip-exists"]);
        assert_eq!(invocation.action, BatchAction::Create { skip_existing: true });
        assert_eq!(invocation.source, InputSource::File(PathBuf::from("pools.yaml")));
        assert!(invocation.connection.config.is_none());
    }

    #[test]
    fn test_apply_from_stdin_with_config() {
        let invocation = parse(&["netctl", "apply", "--filename=-", "-c", "/tmp/netctl.cfg"]);
        assert_eq!(invocation.action, BatchAction::Apply);
        assert_eq!(invocation.source, InputSource::Stdin);
        assert_eq!(invocation.connection.config, Some(PathBuf::from("/tmp/netctl.cfg")));
    }

    #[test]
    fn test_filename_is_required() {
        assert!(Cli::try_parse_from(["netctl", "apply"]).is_err());
        assert!(Cli::try_parse_from(["netctl", "apply", "-f", "x.yaml", "--skip-exists"]).is_err());
    }

    #[test]
    fn test_usage_errors_exit_as_invalid_input() {
        for args in [
            vec!["netctl", "apply"],
            vec!["netctl", "create", "--skip-exists"],
            vec!["netctl", "delete", "-f", "x.yaml"],
            vec!["netctl"],
        ] {
            let err = Cli::try_parse_from(&args).unwrap_err();
            assert_eq!(usage_exit_code(&err), EXIT_INVALID_INPUT, "{:?}", args);
        }
    }

    #[test]
    fn test_help_and_version_exit_successfully() {
        for args in [["netctl", "--help"], ["netctl", "--version"]] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(usage_exit_code(&err), EXIT_SUCCESS);
        }
        let err = Cli::try_parse_from(["netctl", "apply", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), EXIT_SUCCESS);
    }
}
