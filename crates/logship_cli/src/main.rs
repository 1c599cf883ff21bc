//! logship CLI
//!
//! Command-line tools for the logging extension of the client sync message.
//!
//! # Commands
//!
//! - `pack` - Batch a file of log lines into one encoded bucket
//! - `inspect` - Decode an encoded logging extension
//! - `ack` - Encode or decode a delivery acknowledgment

mod commands;

use clap::{Parser, Subcommand};
use commands::pack::PackOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// logship command-line tools.
#[derive(Parser)]
#[command(name = "logship")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Batch log lines into an encoded logging extension
    Pack {
        /// Text file with one record per line
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the encoded extension
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with upload properties
        #[arg(short, long)]
        properties: Option<PathBuf>,

        /// Maximum bytes of framed records in the bucket
        #[arg(long)]
        max_bucket_size: Option<usize>,

        /// Maximum bytes of buffered records
        #[arg(long)]
        max_storage_volume: Option<usize>,

        /// Last bucket id used; the packed bucket gets the next one
        #[arg(long, default_value = "0")]
        bucket_seed: u16,

        /// Parse each line as JSON and store it as CBOR
        #[arg(long)]
        cbor: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Decode an encoded logging extension
    Inspect {
        /// File holding the extension
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Encode or decode a delivery acknowledgment
    Ack {
        /// Bucket being acknowledged
        #[arg(required_unless_present = "decode")]
        bucket_id: Option<u16>,

        /// Report the bucket as not delivered
        #[arg(long, conflicts_with = "decode")]
        failure: bool,

        /// Where to write the acknowledgment
        #[arg(short, long, required_unless_present = "decode")]
        output: Option<PathBuf>,

        /// Decode the acknowledgment in this file instead
        #[arg(short, long, conflicts_with_all = ["bucket_id", "output"])]
        decode: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pack {
            input,
            output,
            properties,
            max_bucket_size,
            max_storage_volume,
            bucket_seed,
            cbor,
            format,
        } => {
            commands::pack::run(&PackOptions {
                input,
                output,
                properties,
                max_bucket_size,
                max_storage_volume,
                bucket_seed,
                cbor,
                format,
            })?;
        }
        Commands::Inspect { file, format } => {
            commands::inspect::run(&file, &format)?;
        }
        Commands::Ack {
            bucket_id,
            failure,
            output,
            decode,
            format,
        } => match decode {
            Some(path) => commands::ack::decode(&path, &format)?,
            None => {
                let bucket_id = bucket_id.ok_or("Bucket id required for ack")?;
                let output = output.ok_or("Output path required for ack")?;
                commands::ack::encode(bucket_id, failure, &output)?;
            }
        },
        Commands::Version => {
            println!("logship CLI v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "Logging extension type {}",
                logship_codec::LOGGING_EXTENSION_TYPE
            );
        }
    }

    Ok(())
}
