//! Core data-integrity codecs behind `xpar`.
//!
//! ```text
//!           +-------------+      +--------------+
//!           |  gf256.rs   |<-----|  crc32c.rs   |
//!           +------+------+      +------+-------+
//!                  |                    |
//!           +------v------+      +------v-------+
//!           |  rs255.rs   |      |  matrix.rs   |
//!           +------+------+      +------+-------+
//!                  |                    |
//!           +------v------+      +------v-------+
//!           | interlace.rs|      |  shard.rs    |
//!           +------+------+      +--------------+
//!                  |
//!           +------v------+
//!           |  joint.rs   |
//!           +-------------+
//! ```
//!
//! `gf256` and `crc32c` are the field/checksum primitives everything else
//! builds on. `rs255` + `interlace` + `joint` form the joint-mode
//! container path; `matrix` + `shard` form the sharded-mode erasure-coding
//! path. Neither path depends on the other.

pub mod crc32c;
pub mod gf256;
pub mod interlace;
pub mod joint;
pub mod matrix;
pub mod rs255;
pub mod shard;

pub use joint::DecodeReport;
pub use xpar_error::{Error, Result};
