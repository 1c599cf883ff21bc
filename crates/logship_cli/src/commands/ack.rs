//! Ack command implementation.

use logship_codec::{
    DeliveryResult, LogDeliveryStatus, MessageReader, MessageWriter, DELIVERY_STATUS_SIZE,
};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// A delivery acknowledgment.
#[derive(Debug, Serialize)]
pub struct AckInfo {
    /// Bucket the acknowledgment refers to.
    pub bucket_id: u16,
    /// Whether the bucket was delivered.
    pub delivered: bool,
    /// The raw result byte.
    pub result_code: u8,
}

/// Writes an acknowledgment for `bucket_id` to `output`.
pub fn encode(
    bucket_id: u16,
    failure: bool,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = if failure {
        DeliveryResult::Failure
    } else {
        DeliveryResult::Success
    };

    let mut buf = [0u8; DELIVERY_STATUS_SIZE];
    let mut writer = MessageWriter::new(&mut buf);
    LogDeliveryStatus::new(bucket_id, result).encode(&mut writer)?;
    fs::write(output, buf)?;

    info!(bucket_id, delivered = !failure, "Wrote acknowledgment to {:?}", output);
    Ok(())
}

/// Prints the acknowledgment stored in `path`.
pub fn decode(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let info = read_ack(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        _ => {
            println!(
                "Bucket {}: {} (result code {})",
                info.bucket_id,
                if info.delivered {
                    "delivered"
                } else {
                    "not delivered"
                },
                info.result_code
            );
        }
    }

    Ok(())
}

fn read_ack(path: &Path) -> Result<AckInfo, Box<dyn std::error::Error>> {
    let bytes = fs::read(path).map_err(|e| format!("Cannot read {:?}: {}", path, e))?;
    if bytes.len() < DELIVERY_STATUS_SIZE {
        return Err(format!(
            "{:?} holds {} bytes, an acknowledgment needs {}",
            path,
            bytes.len(),
            DELIVERY_STATUS_SIZE
        )
        .into());
    }

    let status = LogDeliveryStatus::decode(&mut MessageReader::new(&bytes))?;
    Ok(AckInfo {
        bucket_id: status.bucket_id,
        delivered: status.result.is_success(),
        result_code: bytes[2],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn encode_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ack.bin");

        encode(513, true, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![2, 1, 1, 0]);

        let info = read_ack(&path).unwrap();
        assert_eq!(info.bucket_id, 513);
        assert!(!info.delivered);
    }

    #[test]
    fn short_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ack.bin");
        fs::write(&path, [0u8, 1, 0]).unwrap();
        assert!(read_ack(&path).is_err());
    }
}
