//! Table and column metadata extraction tool.
//!
//! Connects to one database, reads its catalog and prints the normalized
//! schema description as JSON.
//!
//! # Security Guarantees
//! - Read-only catalog queries only
//! - Passwords are never logged; prompt input is not echoed
//! - Logs go to stderr, results to stdout or the output file

use anyhow::Context;
use clap::Parser;
use schemalens_core::{SchemaExtractor, logging::init_logging};
use schemalens_extract::{
    Cli, Command, SchemaArgs,
    output::{render_schema, render_table_list, write_output},
    resolve_password,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let password = resolve_password(cli.connection.password.as_deref())?;
    let config = cli.connection.to_config(&password)?;

    info!("Target: {}", config);
    let extractor = SchemaExtractor::connect(&config)
        .await
        .with_context(|| format!("Failed to prepare {} extractor", config.family))?;

    let result = dispatch(&extractor, cli.command).await;
    extractor.close().await;
    result
}

async fn dispatch(extractor: &SchemaExtractor, command: Option<Command>) -> anyhow::Result<()> {
    match command.unwrap_or_else(|| Command::Schema(SchemaArgs::default())) {
        Command::Schema(args) => {
            let schemas = extractor
                .get_all_tables_schema(args.tables.as_deref())
                .await
                .context("Schema extraction failed")?;
            info!("✓ Extracted {} tables", schemas.len());

            let json = render_schema(&schemas, args.compact)?;
            write_output(&json, args.output.as_deref()).await?;
        }
        Command::Tables(args) => {
            let tables = extractor
                .list_tables(args.tables.as_deref())
                .await
                .context("Table listing failed")?;
            if let Some(listing) = render_table_list(&tables) {
                write_output(&listing, None).await?;
            }
        }
        Command::Comment(args) => {
            let comment = extractor
                .get_table_comment(&args.table)
                .await
                .with_context(|| format!("Failed to read comment for '{}'", args.table))?;
            write_output(&comment, None).await?;
        }
        Command::Test => {
            extractor
                .test_connection()
                .await
                .context("Connection test failed")?;
            info!("✓ Connection test successful");
            println!("Connection to {} database successful", extractor.family());
        }
    }
    Ok(())
}
