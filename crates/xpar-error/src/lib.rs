//! Shared error type for the `xpar` workspace.
//!
//! Every `xpar-core` entry point returns `xpar_error::Result<T>`; `xpar-cli`
//! maps `Err` to a process exit code of 1, printing the error's `Display`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A single RS(255,223) codeword had more than 16 symbol errors.
    #[error("codeword {codeword_index} unrecoverable: too many errors")]
    DecodeUnrecoverable { codeword_index: usize },

    /// A `D x D` reconstruction matrix had no inverse over GF(256).
    #[error("reconstruction matrix is singular")]
    SingularMatrix,

    /// Stored CRC32C did not match the recomputed value.
    #[error("CRC32C mismatch: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// File or shard header did not start with the expected magic bytes.
    #[error("bad magic bytes in header")]
    BadMagic,

    /// A header was shorter than its fixed-size layout requires.
    #[error("truncated header")]
    TruncatedHeader,

    /// A joint-mode block header failed its own structural checks.
    #[error("bad block header")]
    BadBlockHeader,

    /// Fewer than `D` valid shards were available for reconstruction.
    #[error("insufficient shards: have {available}, need {required}")]
    InsufficientShards { available: usize, required: usize },

    /// Two valid shards advertised the same shard index.
    #[error("duplicate shard index {index}")]
    DuplicateShardIndex { index: u8 },

    /// A shard disagreed with the majority on a consensus field.
    #[error("shard disagrees with consensus on {field}")]
    ConsensusDisagreement { field: &'static str },

    /// A CLI flag or config value was out of range or contradictory.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
