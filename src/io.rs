//! Ambient convenience: computing a measurement directly from a file on
//! disk, for callers who don't need to supply their own block reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::compute::compute_digest;
use crate::descriptor::{Digest, MerkleTreeParams};
use crate::error::{Error, Result};
use crate::registry::HashAlgorithmId;

/// Computes the fs-verity measurement of the file at `path`.
///
/// Opens the file, reads its length, and drives [`compute_digest`] with a
/// block reader backed by [`Read::read_exact`]. `version` is always `1`.
pub fn compute_file_digest(
    path: impl AsRef<Path>,
    hash_algorithm: HashAlgorithmId,
    block_size: u32,
    salt: Option<&[u8]>,
) -> Result<Digest> {
    let mut file = File::open(path.as_ref()).map_err(Error::Io)?;
    let file_size = file.metadata().map_err(Error::Io)?.len();

    let params = MerkleTreeParams {
        version: 1,
        hash_algorithm,
        block_size,
        salt,
        file_size,
    };

    compute_digest(&params, |buf| file.read_exact(buf))
}
