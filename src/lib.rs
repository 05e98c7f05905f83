//! Streaming Merkle tree construction and descriptor hashing for fs-verity
//! file measurements.
//!
//! fs-verity binds a file's content to a single digest, the *measurement*,
//! by arranging fixed-size blocks into a Merkle tree and hashing a small
//! fixed descriptor whose `root_hash` field is the tree's root. The
//! measurement changes if any byte of the file changes, but computing it
//! only ever requires buffering a handful of tree levels, not the whole
//! file.
//!
//! ```no_run
//! use fsverity_merkle::{compute_file_digest, SHA256};
//!
//! let digest = compute_file_digest("/bin/ls", SHA256, 4096, None)?;
//! println!("{}", digest.to_hex());
//! # Ok::<(), fsverity_merkle::Error>(())
//! ```
//!
//! Callers who don't have a plain file (an in-memory buffer, a block
//! device, content streamed from elsewhere) drive [`compute_digest`]
//! directly with their own block reader.

mod builder;
mod compute;
mod descriptor;
mod error;
mod hash;
mod io;
mod registry;

pub use builder::FS_VERITY_MAX_LEVELS;
pub use compute::compute_digest;
pub use descriptor::{Digest, MerkleTreeParams};
pub use error::{Error, Result};
pub use hash::HashContext;
pub use io::compute_file_digest;
pub use registry::{lookup_algorithm, HashAlgorithm, HashAlgorithmId, MAX_DIGEST_SIZE, SHA256, SHA512};
