//! Reed-Solomon erasure coding over GF(2^8)
//!
//! Splits every byte position across `k` data shards into `m` additional
//! parity shards such that any `k` of the `k + m` shards reconstruct the
//! original data. The codec is systematic (data shards pass through
//! unchanged), works in place on caller-owned buffers, and performs no
//! I/O; chunking, placement, and transport belong to the caller.
//!
//! ```
//! use rs8::ReedSolomon;
//!
//! let rs = ReedSolomon::new(4, 2)?;
//! let mut shards = vec![vec![0u8; 8]; 6];
//! for (i, shard) in shards.iter_mut().take(4).enumerate() {
//!     shard.fill(i as u8 + 1);
//! }
//! rs.encode_parity(&mut shards, 0, 8)?;
//! assert!(rs.is_parity_correct(&shards, 0, 8)?);
//!
//! // Lose any two shards, then rebuild them.
//! let lost = shards.clone();
//! shards[1].fill(0);
//! shards[5].fill(0);
//! let present = [true, false, true, true, true, false];
//! rs.decode_missing(&mut shards, &present, 0, 8)?;
//! assert_eq!(shards, lost);
//! # Ok::<(), rs8::CodecError>(())
//! ```

pub mod coding_loop;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod reed_solomon;

pub use coding_loop::{CodingLoop, LoopOrder, MulMethod};
pub use error::{CodecError, Result};
pub use galois::Gf8;
pub use matrix::Matrix;
pub use reed_solomon::{ReedSolomon, MAX_TOTAL_SHARDS};
