//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use seco_core::TracingOutputFormat;
use seco_protocol::RequestType;

/// seco - query and update the method catalog
#[derive(Debug, Parser)]
#[command(name = "seco")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SECO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format on stderr: compact, pretty or json
    #[arg(long, env = "SECO_LOG_FORMAT", default_value_t = TracingOutputFormat::Compact)]
    pub log_format: TracingOutputFormat,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    // --- Connection flags ---
    /// Catalog server host
    #[arg(long, env = "SECO_HOST")]
    pub host: Option<String>,

    /// Catalog server port
    #[arg(long, env = "SECO_PORT")]
    pub port: Option<u16>,

    /// Client identifier sent with every request
    #[arg(long, env = "SECO_CLIENT_ID")]
    pub client_id: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a single request and print the response
    Fetch {
        /// Request type, by name (`get-author`) or wire code (`idau`)
        request_type: RequestType,

        /// Payload lines
        data: Vec<String>,
    },

    /// Look up method hashes with their authors and project versions
    ///
    /// Hashes are read from standard input, one per line, when none are given.
    Check {
        /// Method hashes
        hashes: Vec<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_by_name_and_code() {
        let cli = Cli::try_parse_from(["seco", "fetch", "get-author", "id-1", "id-2"]).unwrap();
        match cli.command {
            Command::Fetch { request_type, data } => {
                assert_eq!(request_type, RequestType::GetAuthor);
                assert_eq!(data, vec!["id-1", "id-2"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["seco", "fetch", "gtjb"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Fetch {
                request_type: RequestType::GetTopJob,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_request_type() {
        assert!(Cli::try_parse_from(["seco", "fetch", "bogus"]).is_err());
    }

    #[test]
    fn parses_connection_flags() {
        let cli = Cli::try_parse_from([
            "seco",
            "--host",
            "db.example.org",
            "--port",
            "9000",
            "--client-id",
            "me",
            "--json",
            "check",
            "abc",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("db.example.org"));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.client_id.as_deref(), Some("me"));
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Check { ref hashes } if hashes == &["abc"]));
    }

    #[test]
    fn parses_log_format() {
        let cli = Cli::try_parse_from(["seco", "config", "path"]).unwrap();
        assert_eq!(cli.log_format, TracingOutputFormat::Compact);

        let cli = Cli::try_parse_from(["seco", "--log-format", "json", "config", "path"]).unwrap();
        assert_eq!(cli.log_format, TracingOutputFormat::Json);

        assert!(Cli::try_parse_from(["seco", "--log-format", "xml", "config", "path"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
