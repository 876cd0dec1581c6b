//! cellstore CLI Client
//!
//! Command-line interface for a running cellstore server. Results are
//! printed as JSON.

use std::time::Duration;

use cellstore::{Client, Context};
use clap::{Parser, Subcommand};

/// cellstore CLI
#[derive(Parser, Debug)]
#[command(name = "cellstore-cli")]
#[command(about = "CLI for the cellstore cell store")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:4444")]
    server: String,

    /// Table to address
    #[arg(short, long, default_value = "cell")]
    table: String,

    /// Request deadline in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get one exact cell version
    Get {
        row_key: String,
        column_key: String,
        ref_key: i64,
    },

    /// Get the version with the highest ref key
    GetLatest { row_key: String, column_key: String },

    /// Page through one shard by write-time marker
    PartitionRead {
        /// Shard ordinal
        partition: usize,

        /// Return cells strictly after this marker
        #[arg(long, default_value = "0")]
        after: u64,

        #[arg(long, default_value = "100")]
        limit: usize,

        #[arg(long, default_value = "added")]
        location: String,
    },

    /// Append a cell version
    Put {
        row_key: String,
        column_key: String,
        ref_key: i64,

        /// Cell body (usually JSON text)
        body: String,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let timeout = Duration::from_millis(args.timeout_ms);
    let client = match Client::builder()
        .base_url(args.server.as_str())
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    let ctx = Context::with_timeout(timeout);

    if let Err(e) = execute(&client, &ctx, &args.table, args.command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn execute(
    client: &Client,
    ctx: &Context,
    table: &str,
    command: Commands,
) -> cellstore::Result<()> {
    match command {
        Commands::Get {
            row_key,
            column_key,
            ref_key,
        } => {
            match client.get(ctx, table, &row_key, &column_key, ref_key).await? {
                Some(cell) => println!("{}", serde_json::to_string_pretty(&cell)?),
                None => println!("(not found)"),
            }
        }
        Commands::GetLatest {
            row_key,
            column_key,
        } => match client.get_latest(ctx, table, &row_key, &column_key).await? {
            Some(cell) => println!("{}", serde_json::to_string_pretty(&cell)?),
            None => println!("(not found)"),
        },
        Commands::PartitionRead {
            partition,
            after,
            limit,
            location,
        } => {
            let cells = client
                .partition_read(ctx, table, partition, &location, after, limit)
                .await?;
            for cell in &cells {
                println!("{}", serde_json::to_string(cell)?);
            }
            println!("({} cells)", cells.len());
        }
        Commands::Put {
            row_key,
            column_key,
            ref_key,
            body,
        } => {
            let response = client
                .put(ctx, table, &row_key, &column_key, ref_key, &body)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
