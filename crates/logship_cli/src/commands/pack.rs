//! Pack command implementation.

use logship_codec::MessageWriter;
use logship_collector::{
    CborLogRecord, LogCollector, LogUploadProperties, MemoryStatusStore, UploadDecision,
};
use logship_storage::{InMemoryLogStorage, LogStorage};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Options of the pack command.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Text file with one record per line.
    pub input: PathBuf,
    /// Where the encoded extension is written.
    pub output: PathBuf,
    /// JSON file with upload properties.
    pub properties: Option<PathBuf>,
    /// Overrides the bucket size.
    pub max_bucket_size: Option<usize>,
    /// Overrides the storage volume.
    pub max_storage_volume: Option<usize>,
    /// Last bucket id used; the packed bucket gets the next one.
    pub bucket_seed: u16,
    /// Treat each line as JSON and store it as CBOR.
    pub cbor: bool,
    /// Output format (text, json).
    pub format: String,
}

/// Pack result.
#[derive(Debug, Serialize)]
pub struct PackResult {
    /// Output path.
    pub output: String,
    /// Bucket id in the extension.
    pub bucket_id: u16,
    /// Records packed into the bucket.
    pub record_count: u16,
    /// Records read from the input.
    pub records_read: usize,
    /// Records left over because the bucket was full.
    pub records_pending: usize,
    /// Payload length in the extension header.
    pub extension_length: u32,
    /// Bytes written.
    pub bytes_written: usize,
}

/// Runs the pack command.
pub fn run(options: &PackOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = pack(options)?;

    match options.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

pub(crate) fn load_properties(
    path: Option<&Path>,
    max_bucket_size: Option<usize>,
    max_storage_volume: Option<usize>,
) -> Result<LogUploadProperties, Box<dyn std::error::Error>> {
    let mut properties = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Cannot read properties {:?}: {}", path, e))?;
            serde_json::from_str(&text)?
        }
        None => LogUploadProperties::default(),
    };

    if let Some(size) = max_bucket_size {
        properties = properties.with_max_log_bucket_size(size);
    }
    if let Some(volume) = max_storage_volume {
        properties = properties.with_max_log_storage_volume(volume);
    }
    properties.validate()?;
    Ok(properties)
}

fn pack(options: &PackOptions) -> Result<PackResult, Box<dyn std::error::Error>> {
    let properties = load_properties(
        options.properties.as_deref(),
        options.max_bucket_size,
        options.max_storage_volume,
    )?;
    debug!(?properties, "Loaded upload properties");

    let input = fs::read_to_string(&options.input)
        .map_err(|e| format!("Cannot read input {:?}: {}", options.input, e))?;

    let status = Arc::new(MemoryStatusStore::with_log_bucket_id(options.bucket_seed));
    let mut collector = LogCollector::new(status);
    collector.init(
        Box::new(InMemoryLogStorage::new()),
        Box::new(|_: &dyn LogStorage| UploadDecision::NoAction),
        properties,
    )?;

    let mut records_read = 0;
    for (number, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if options.cbor {
            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| format!("Line {}: invalid JSON: {}", number + 1, e))?;
            collector.add_record(&CborLogRecord::new(&value)?)?;
        } else {
            collector.add_record(line)?;
        }
        records_read += 1;
    }
    if records_read == 0 {
        return Err("No records in input".into());
    }
    info!(records_read, "Read log records from {:?}", options.input);

    let mut buf = vec![0u8; collector.estimate_request_size()?];
    let mut writer = MessageWriter::new(&mut buf);
    let summary = collector.serialize_request(&mut writer)?;
    buf.truncate(summary.encoded_len());

    fs::write(&options.output, &buf)?;
    info!(
        bucket_id = summary.bucket_id,
        bytes = buf.len(),
        "Wrote logging extension to {:?}",
        options.output
    );

    Ok(PackResult {
        output: options.output.display().to_string(),
        bucket_id: summary.bucket_id,
        record_count: summary.record_count,
        records_read,
        records_pending: collector.storage().map_or(0, |s| s.records_count()),
        extension_length: summary.extension_length,
        bytes_written: buf.len(),
    })
}

fn print_text_output(result: &PackResult) {
    println!("Logging Extension Written");
    println!("=========================");
    println!("Output:           {}", result.output);
    println!("Bucket id:        {}", result.bucket_id);
    println!(
        "Records packed:   {} of {}",
        result.record_count, result.records_read
    );
    if result.records_pending > 0 {
        println!("Records pending:  {}", result.records_pending);
    }
    println!("Payload length:   {} bytes", result.extension_length);
    println!("Total size:       {} bytes", result.bytes_written);
}
