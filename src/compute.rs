//! The measurement composer. Validates parameters, builds the descriptor,
//! drives the builder, and hashes the descriptor to produce the final
//! measurement.

use std::io;

use crate::builder::build_merkle_tree;
use crate::descriptor::{Descriptor, Digest, MerkleTreeParams};
use crate::error::{Error, Result};
use crate::hash::HashContextExt;
use crate::registry::{self, MAX_DIGEST_SIZE};

const MAX_SALT_SIZE: usize = 32;

fn validate(params: &MerkleTreeParams<'_>) -> Result<()> {
    if params.version != 1 {
        let message = format!("unsupported version {} (must be 1)", params.version);
        log::error!("{}", message);
        return Err(Error::InvalidArgument(message));
    }

    if !params.block_size.is_power_of_two() {
        let message = format!("block_size {} is not a power of two", params.block_size);
        log::error!("{}", message);
        return Err(Error::InvalidArgument(message));
    }

    let salt = params.salt_bytes();
    if salt.len() > MAX_SALT_SIZE {
        let message = format!(
            "salt_size {} exceeds the maximum of {}",
            salt.len(),
            MAX_SALT_SIZE
        );
        log::error!("{}", message);
        return Err(Error::InvalidArgument(message));
    }

    Ok(())
}

/// Computes the fs-verity measurement of a file.
///
/// `read_block` is called once per `min(block_size, remaining)`-byte chunk,
/// strictly in increasing offset order, and must fill its argument
/// completely on success. See [`crate::MerkleTreeParams`] for the
/// parameters this function validates and the descriptor it builds from
/// them.
pub fn compute_digest<F>(params: &MerkleTreeParams<'_>, read_block: F) -> Result<Digest>
where
    F: FnMut(&mut [u8]) -> io::Result<()>,
{
    validate(params)?;

    let algorithm = registry::lookup_algorithm(params.hash_algorithm).ok_or_else(|| {
        let message = format!("unknown hash_algorithm id {}", params.hash_algorithm);
        log::error!("{}", message);
        Error::InvalidArgument(message)
    })?;

    let salt = params.salt_bytes();
    let block_size = params.block_size as usize;

    if block_size < 2 * algorithm.digest_size {
        let message = format!(
            "block_size {} is smaller than twice the {} digest size ({})",
            block_size, algorithm.name, algorithm.digest_size
        );
        log::error!("{}", message);
        return Err(Error::InvalidArgument(message));
    }

    if !salt.is_empty() && block_size % algorithm.block_size != 0 {
        let message = format!(
            "block_size {} is not a multiple of the {} internal block size ({}) required with a salt present",
            block_size, algorithm.name, algorithm.block_size
        );
        log::error!("{}", message);
        return Err(Error::InvalidArgument(message));
    }

    let log_blocksize = params.block_size.trailing_zeros() as u8;
    let mut descriptor = Descriptor::new(params, log_blocksize);

    if params.file_size == 0 {
        descriptor.root_hash_mut(algorithm.digest_size).fill(0);
    } else {
        build_merkle_tree(
            algorithm,
            block_size,
            salt,
            params.file_size,
            read_block,
            descriptor.root_hash_mut(algorithm.digest_size),
        )?;
    }

    let mut ctx = (algorithm.create_ctx)();
    let mut digest_bytes = [0u8; MAX_DIGEST_SIZE];
    ctx.hash_full(
        descriptor.as_bytes(),
        &mut digest_bytes[..algorithm.digest_size],
    );

    Ok(Digest::new(
        params.hash_algorithm,
        &digest_bytes[..algorithm.digest_size],
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::SHA256;

    #[test]
    fn rejects_bad_version() {
        let params = MerkleTreeParams {
            version: 2,
            hash_algorithm: SHA256,
            block_size: 4096,
            salt: None,
            file_size: 0,
        };
        let err = compute_digest(&params, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn rejects_non_power_of_two_block_size() {
        let params = MerkleTreeParams {
            version: 1,
            hash_algorithm: SHA256,
            block_size: 4097,
            salt: None,
            file_size: 0,
        };
        let mut calls = 0u32;
        let err = compute_digest(&params, |_| {
            calls += 1;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(calls, 0, "the read callback must not be invoked");
    }

    #[test]
    fn rejects_oversized_salt() {
        let salt = vec![0u8; 33];
        let params = MerkleTreeParams {
            version: 1,
            hash_algorithm: SHA256,
            block_size: 4096,
            salt: Some(&salt),
            file_size: 0,
        };
        let err = compute_digest(&params, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let params = MerkleTreeParams {
            version: 1,
            hash_algorithm: 99,
            block_size: 4096,
            salt: None,
            file_size: 0,
        };
        let err = compute_digest(&params, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn empty_file_root_is_zero_and_digest_is_deterministic() {
        let params = MerkleTreeParams {
            version: 1,
            hash_algorithm: SHA256,
            block_size: 4096,
            salt: None,
            file_size: 0,
        };
        let a = compute_digest(&params, |_| Ok(())).unwrap();
        let b = compute_digest(&params, |_| Ok(())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn io_error_propagates() {
        let params = MerkleTreeParams {
            version: 1,
            hash_algorithm: SHA256,
            block_size: 4096,
            salt: None,
            file_size: 4096,
        };
        let err = compute_digest(&params, |_| {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
