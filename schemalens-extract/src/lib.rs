//! Library module for schemalens-extract
//!
//! Exposes the command-line definitions and helpers so they can be tested
//! without spawning the binary. The entry point lives in main.rs.

pub mod output;

use clap::{Args, Parser, Subcommand};
use schemalens_core::{ConnectionConfig, DatabaseFamily, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "schemalens-extract")]
#[command(about = "Table and column metadata extraction tool")]
#[command(version)]
#[command(long_about = "
SchemaLens Extractor - uniform table and column metadata

Reads table names, column names, column types and comments from the
database catalog and prints them as JSON keyed by table name.

SUPPORTED DATABASES:
- MySQL (mysql)
- PostgreSQL (postgresql)
- SQL Server (mssql)
- Apache Doris (doris)
- Oracle (oracle) [if compiled with --features oracle]

EXAMPLES:
  schemalens-extract --family postgresql --host localhost --username reader --database shop
  schemalens-extract --family mysql --host db --username reader --database shop schema --tables orders,customers
  schemalens-extract --family doris --host fe --port 9030 --username root --database dw comment sales
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands. Without one, `schema` runs with defaults.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract table schemas as JSON
    Schema(SchemaArgs),
    /// List table names, one per line
    Tables(TablesArgs),
    /// Print the comment of one table
    Comment(CommentArgs),
    /// Test the database connection
    Test,
}

#[derive(Debug, Default, Args)]
pub struct SchemaArgs {
    /// Comma-separated table filter
    #[arg(long, help = "Comma-separated list of tables to extract (default: all)")]
    pub tables: Option<String>,

    /// Output file path
    #[arg(short, long, help = "Write JSON to this file instead of stdout")]
    pub output: Option<PathBuf>,

    /// Compact JSON
    #[arg(long, help = "Emit compact JSON instead of pretty-printed JSON")]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Comma-separated table filter
    #[arg(long, help = "Comma-separated list of tables to keep (default: all)")]
    pub tables: Option<String>,
}

#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Table name
    #[arg(help = "Table whose comment should be printed")]
    pub table: String,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Connection parameters. Every flag can also come from the environment.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Database family
    #[arg(
        long,
        env = "SCHEMALENS_FAMILY",
        help = "Database family: mysql, postgresql, oracle, mssql, doris"
    )]
    pub family: DatabaseFamily,

    /// Server host
    #[arg(long, env = "SCHEMALENS_HOST", help = "Database server host")]
    pub host: String,

    /// Server port
    #[arg(
        long,
        env = "SCHEMALENS_PORT",
        help = "Database server port (default: the family's standard port)"
    )]
    pub port: Option<u16>,

    /// Login name
    #[arg(long, env = "SCHEMALENS_USERNAME", help = "Database user")]
    pub username: String,

    /// Password
    #[arg(
        long,
        env = "SCHEMALENS_PASSWORD",
        hide_env_values = true,
        help = "Database password (prompted for when omitted on a terminal)"
    )]
    pub password: Option<String>,

    /// Database, schema or service name
    #[arg(
        long,
        env = "SCHEMALENS_DATABASE",
        help = "Database name (service name for Oracle)"
    )]
    pub database: String,

    /// Driver properties
    #[arg(
        long,
        env = "SCHEMALENS_PROPERTIES",
        help = "Driver properties as a query string, e.g. sslmode=disable&application_name=docs"
    )]
    pub properties: Option<String>,

    /// Connect timeout in seconds
    #[arg(
        long,
        env = "SCHEMALENS_CONNECT_TIMEOUT",
        default_value = "30",
        help = "Seconds to wait for a connection"
    )]
    pub connect_timeout: u64,
}

impl ConnectionArgs {
    /// Port to use, falling back to the family default
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.family.default_port())
    }

    /// Builds the connection configuration with the resolved password.
    ///
    /// # Errors
    /// Returns a configuration error for malformed properties
    pub fn to_config(&self, password: &str) -> Result<ConnectionConfig> {
        let mut config = ConnectionConfig::new(
            self.family,
            &self.host,
            self.effective_port(),
            &self.username,
            password,
            &self.database,
        )
        .with_connect_timeout(Duration::from_secs(self.connect_timeout));

        if let Some(properties) = &self.properties {
            config = config.with_properties_str(properties)?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Resolves the password from the flag/environment or an interactive prompt.
///
/// Without an explicit password, a terminal user is prompted and a
/// non-interactive caller gets an empty password.
///
/// # Errors
/// Returns a configuration error if the prompt cannot be read
pub fn resolve_password(explicit: Option<&str>) -> Result<String> {
    if let Some(password) = explicit {
        return Ok(password.to_string());
    }

    if !std::io::stdin().is_terminal() {
        return Ok(String::new());
    }

    rpassword::prompt_password("Password: ").map_err(|e| {
        schemalens_core::ExtractorError::configuration(format!("Failed to read password: {}", e))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const BASE_ARGS: &[&str] = &[
        "schemalens-extract",
        "--family",
        "postgresql",
        "--host",
        "localhost",
        "--username",
        "reader",
        "--password",
        "secret",
        "--database",
        "shop",
    ];

    fn parse(extra: &[&str]) -> Cli {
        let args: Vec<&str> = BASE_ARGS.iter().chain(extra.iter()).copied().collect();
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.connection.family, DatabaseFamily::PostgreSql);
        assert_eq!(cli.connection.effective_port(), 5432);
    }

    #[test]
    fn test_schema_subcommand_arguments() {
        let cli = parse(&[
            "schema",
            "--tables",
            "orders,customers",
            "--output",
            "out.json",
            "--compact",
        ]);
        match cli.command {
            Some(Command::Schema(args)) => {
                assert_eq!(args.tables.as_deref(), Some("orders,customers"));
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
                assert!(args.compact);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_comment_subcommand_requires_table() {
        let cli = parse(&["comment", "orders"]);
        assert!(matches!(
            cli.command,
            Some(Command::Comment(CommentArgs { ref table })) if table == "orders"
        ));

        let args: Vec<&str> = BASE_ARGS.iter().copied().chain(["comment"]).collect();
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_family_is_case_insensitive_with_aliases() {
        let args = [
            "schemalens-extract",
            "--family",
            "SqlServer",
            "--host",
            "db",
            "--username",
            "sa",
            "--database",
            "shop",
            "test",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.connection.family, DatabaseFamily::SqlServer);
        assert_eq!(cli.connection.effective_port(), 1433);
        assert!(matches!(cli.command, Some(Command::Test)));
    }

    #[test]
    fn test_unknown_family_rejected() {
        let args = [
            "schemalens-extract",
            "--family",
            "db2",
            "--host",
            "db",
            "--username",
            "u",
            "--database",
            "d",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["tables", "-vv"]);
        assert_eq!(cli.global.verbose, 2);
        assert!(!cli.global.quiet);
    }

    #[test]
    fn test_to_config_applies_port_properties_and_timeout() {
        let cli = parse(&[
            "--port",
            "6543",
            "--properties",
            "sslmode=disable",
            "--connect-timeout",
            "5",
        ]);
        let config = cli.connection.to_config("secret").unwrap();
        assert_eq!(config.port, 6543);
        assert_eq!(config.properties.get("sslmode"), Some("disable"));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(!config.to_string().contains("secret"));
    }

    #[test]
    fn test_to_config_rejects_malformed_properties() {
        let cli = parse(&["--properties", "sslmode"]);
        assert!(cli.connection.to_config("secret").is_err());
    }

    #[test]
    fn test_explicit_password_wins() {
        assert_eq!(resolve_password(Some("pw")).unwrap(), "pw");
    }

    #[test]
    fn test_connection_flags_read_from_env() {
        temp_env::with_vars(
            [
                ("SCHEMALENS_FAMILY", Some("doris")),
                ("SCHEMALENS_HOST", Some("fe.internal")),
                ("SCHEMALENS_USERNAME", Some("root")),
                ("SCHEMALENS_PASSWORD", Some("from-env")),
                ("SCHEMALENS_DATABASE", Some("dw")),
                ("SCHEMALENS_PORT", None),
                ("SCHEMALENS_PROPERTIES", None),
                ("SCHEMALENS_CONNECT_TIMEOUT", None),
            ],
            || {
                let cli = Cli::try_parse_from(["schemalens-extract", "tables"]).unwrap();
                assert_eq!(cli.connection.family, DatabaseFamily::Doris);
                assert_eq!(cli.connection.host, "fe.internal");
                assert_eq!(cli.connection.effective_port(), 9030);
                assert_eq!(cli.connection.password.as_deref(), Some("from-env"));
            },
        );
    }
}
