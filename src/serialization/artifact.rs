//! Versioned, checksummed artifact container.
//!
//! ```text
//! [4-byte magic: "CLPA"]
//! [1-byte major version][1-byte minor version]
//! [4-byte payload_len: u32 little-endian]
//! [bincode payload]
//! [4-byte CRC32: checksum of all preceding bytes]
//! ```
//!
//! Readers accept any minor version of a supported major version.

use crate::error::{ComplaintError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Magic bytes opening every artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"CLPA";

/// Format version written by this build.
pub const FORMAT_VERSION: (u8, u8) = (1, 0);

/// magic + major + minor + payload length
const HEADER_LEN: usize = 4 + 1 + 1 + 4;
const CHECKSUM_LEN: usize = 4;

/// Encode `value` into artifact bytes.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized or exceeds 4 GiB.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;
    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        ComplaintError::Serialization(format!("payload of {} bytes is too large", payload.len()))
    })?;

    let mut output = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    output.extend_from_slice(&ARTIFACT_MAGIC);
    output.push(FORMAT_VERSION.0);
    output.push(FORMAT_VERSION.1);
    output.extend_from_slice(&payload_len.to_le_bytes());
    output.extend_from_slice(&payload);

    let crc = crc32(&output);
    output.extend_from_slice(&crc.to_le_bytes());
    Ok(output)
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

/// Decode artifact bytes.
///
/// # Errors
///
/// Returns `FormatError` for bad magic or a truncated file,
/// `UnsupportedVersion` for an unknown major version, `ChecksumMismatch`
/// for corrupted bytes, and `Serialization` for an undecodable payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(ComplaintError::FormatError {
            message: format!("artifact truncated: {} bytes", bytes.len()),
        });
    }
    if bytes[..4] != ARTIFACT_MAGIC {
        return Err(ComplaintError::FormatError {
            message: format!("bad magic {:02X?}, expected \"CLPA\"", &bytes[..4]),
        });
    }

    let found = (bytes[4], bytes[5]);
    if found.0 != FORMAT_VERSION.0 {
        return Err(ComplaintError::UnsupportedVersion {
            found,
            supported: FORMAT_VERSION,
        });
    }

    let payload_len = read_u32_le(&bytes[6..10]) as usize;
    let expected_len = HEADER_LEN + payload_len + CHECKSUM_LEN;
    if bytes.len() != expected_len {
        return Err(ComplaintError::FormatError {
            message: format!(
                "artifact length {} does not match declared payload ({expected_len} expected)",
                bytes.len()
            ),
        });
    }

    let body_end = HEADER_LEN + payload_len;
    let stored = read_u32_le(&bytes[body_end..]);
    let computed = crc32(&bytes[..body_end]);
    if stored != computed {
        return Err(ComplaintError::ChecksumMismatch {
            expected: stored,
            actual: computed,
        });
    }

    Ok(bincode::deserialize(&bytes[HEADER_LEN..body_end])?)
}

/// Encode `value` and write it to `path`.
///
/// # Errors
///
/// Returns an error on serialization or I/O failure.
pub fn save<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let bytes = encode(value)?;
    fs::write(path.as_ref(), &bytes)?;
    tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "artifact saved");
    Ok(())
}

/// Read and decode the artifact at `path`.
///
/// # Errors
///
/// See [`decode`]; also fails if the file cannot be read.
pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let bytes = fs::read(path.as_ref())?;
    let value = decode(&bytes)?;
    tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "artifact loaded");
    Ok(value)
}

/// CRC32 (IEEE polynomial).
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        let idx = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = CRC32_TABLE[idx] ^ (crc >> 8);
    }
    !crc
}

/// CRC32 lookup table (reflected polynomial 0xEDB88320).
const CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}
