//! Artifact serialization.
//!
//! A fitted pipeline is persisted as one binary artifact:
//! ```text
//! [4-byte magic: "CLPA"][u8 major][u8 minor]
//! [4-byte payload_len][bincode payload]
//! [4-byte CRC32]
//! ```
//!
//! Example:
//! ```rust
//! use complaint_loss::serialization::{decode, encode};
//!
//! let bytes = encode(&vec![1.0f64, 2.0]).unwrap();
//! let back: Vec<f64> = decode(&bytes).unwrap();
//! assert_eq!(back, vec![1.0, 2.0]);
//! ```

pub mod artifact;

pub use artifact::{crc32, decode, encode, load, save, ARTIFACT_MAGIC, FORMAT_VERSION};
