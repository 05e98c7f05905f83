//! The hash algorithm registry.
//!
//! A process-wide immutable lookup table, keyed by the numeric id used on
//! the wire (and in the fs-verity kernel UAPI: `FS_VERITY_HASH_ALG_SHA256`
//! / `FS_VERITY_HASH_ALG_SHA512`). No registration API is exposed; adding an
//! algorithm means adding an entry to `REGISTRY`.

use crate::hash::{HashContext, Sha256Context, Sha512Context};

/// Numeric id of an algorithm as it appears in [`crate::MerkleTreeParams`]
/// and in the descriptor's `hash_algorithm` byte.
pub type HashAlgorithmId = u8;

/// `FS_VERITY_HASH_ALG_SHA256`.
pub const SHA256: HashAlgorithmId = 1;
/// `FS_VERITY_HASH_ALG_SHA512`.
pub const SHA512: HashAlgorithmId = 2;

/// The largest `digest_size` among registered algorithms. Used to size
/// fixed-capacity scratch buffers without heap allocation.
pub const MAX_DIGEST_SIZE: usize = 64;

/// A registered hash primitive: its wire id, diagnostic name, sizes, and a
/// factory for fresh [`HashContext`]s.
pub struct HashAlgorithm {
    pub id: HashAlgorithmId,
    pub name: &'static str,
    pub digest_size: usize,
    pub block_size: usize,
    pub(crate) create_ctx: fn() -> Box<dyn HashContext>,
}

static SHA256_ALGORITHM: HashAlgorithm = HashAlgorithm {
    id: SHA256,
    name: "sha256",
    digest_size: 32,
    block_size: 64,
    create_ctx: || Box::new(Sha256Context::new()),
};

static SHA512_ALGORITHM: HashAlgorithm = HashAlgorithm {
    id: SHA512,
    name: "sha512",
    digest_size: 64,
    block_size: 128,
    create_ctx: || Box::new(Sha512Context::new()),
};

static REGISTRY: &[&HashAlgorithm] = &[&SHA256_ALGORITHM, &SHA512_ALGORITHM];

/// Looks up a registered algorithm by its numeric id. Returns `None` for an
/// id that is not registered; the composer turns this into an
/// `InvalidArgument` failure naming the unknown id.
pub fn lookup_algorithm(id: HashAlgorithmId) -> Option<&'static HashAlgorithm> {
    REGISTRY.iter().copied().find(|algorithm| algorithm.id == id)
}
