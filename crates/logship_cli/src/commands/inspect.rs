//! Inspect command implementation.

use super::display_payload;
use logship_codec::{LogSyncRequest, EXTENSION_HEADER_SIZE};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Decoded logging extension.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// Extension type tag.
    pub extension_type: u8,
    /// Extension options.
    pub options: u32,
    /// Whether the client accepts server notifications.
    pub receives_updates: bool,
    /// Payload length from the header.
    pub payload_length: u32,
    /// Bucket id.
    pub bucket_id: u16,
    /// Number of records.
    pub record_count: usize,
    /// Sum of record payload lengths.
    pub records_size: usize,
    /// The records.
    pub records: Vec<RecordInfo>,
}

/// One record of the bucket.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Position in the bucket.
    pub index: usize,
    /// Payload length.
    pub length: usize,
    /// Payload as quoted text, or hex.
    pub payload: String,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn inspect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let bytes = fs::read(path).map_err(|e| format!("Cannot read {:?}: {}", path, e))?;
    if bytes.len() < EXTENSION_HEADER_SIZE {
        return Err(format!("{:?} is too short for a logging extension", path).into());
    }

    let request = LogSyncRequest::decode(&bytes)?;
    let records = request
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| RecordInfo {
            index,
            length: record.len(),
            payload: display_payload(record),
        })
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        extension_type: request.header.extension_type,
        options: request.header.options,
        receives_updates: request.receives_updates(),
        payload_length: request.header.payload_length,
        bucket_id: request.bucket_id,
        record_count: request.record_count(),
        records_size: request.records_size(),
        records,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Logging Extension");
    println!("=================");
    println!("Path:             {}", result.path);
    println!("Extension type:   {}", result.extension_type);
    println!(
        "Options:          {:#08x}{}",
        result.options,
        if result.receives_updates {
            " (receives updates)"
        } else {
            ""
        }
    );
    println!("Payload length:   {} bytes", result.payload_length);
    println!();
    println!("Bucket {}", result.bucket_id);
    println!(
        "  {} records, {} payload bytes",
        result.record_count, result.records_size
    );
    for record in &result.records {
        println!(
            "  [{:>4}] {:>6} bytes  {}",
            record.index, record.length, record.payload
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logship_codec::{
        ExtensionHeader, MessageWriter, LOGGING_EXTENSION_TYPE, RECEIVE_UPDATES_FLAG,
    };
    use tempfile::TempDir;

    fn write_request(dir: &TempDir) -> std::path::PathBuf {
        let mut buf = vec![0u8; 32];
        let mut writer = MessageWriter::new(&mut buf);
        ExtensionHeader::new(LOGGING_EXTENSION_TYPE, RECEIVE_UPDATES_FLAG, 16)
            .encode(&mut writer)
            .unwrap();
        writer.write_u16(3).unwrap();
        writer.write_u16(1).unwrap();
        writer.write_u32(5).unwrap();
        writer.write_bytes(b"hello").unwrap();
        writer.write_zeros(3).unwrap();
        let len = writer.position();

        let path = dir.path().join("request.bin");
        fs::write(&path, &buf[..len]).unwrap();
        path
    }

    #[test]
    fn inspects_request() {
        let dir = TempDir::new().unwrap();
        let path = write_request(&dir);

        let result = inspect(&path).unwrap();
        assert_eq!(result.extension_type, LOGGING_EXTENSION_TYPE);
        assert!(result.receives_updates);
        assert_eq!(result.bucket_id, 3);
        assert_eq!(result.record_count, 1);
        assert_eq!(result.records[0].payload, "\"hello\"");
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = write_request(&dir);
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        assert!(inspect(&path).is_err());
    }

    #[test]
    fn rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(inspect(&dir.path().join("absent.bin")).is_err());
    }
}
