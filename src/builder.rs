//! The streaming Merkle tree builder.
//!
//! Blocks are pulled one at a time through a stack of per-level buffers;
//! whenever a level fills up, its hash is pushed into the level above, and
//! so on, until either the current block's chain runs dry or the root sink
//! is written. This mirrors the fs-verity kernel's own construction (see
//! `Documentation/filesystems/fsverity.rst`): the data is a sequence of
//! fixed-size blocks, each level of the tree is itself divided into
//! fixed-size blocks of hashes, and the process repeats until one block's
//! worth of hashes remains.

use std::io;

use crate::error::{Error, Result};
use crate::hash::HashContext;
use crate::registry::HashAlgorithm;

/// Maximum number of interior tree levels. Matches `FS_VERITY_MAX_LEVELS`
/// from the fs-verity kernel UAPI.
pub const FS_VERITY_MAX_LEVELS: usize = 64;

struct LevelBuffer {
    data: Vec<u8>,
    filled: usize,
}

impl LevelBuffer {
    fn new(capacity: usize) -> Self {
        LevelBuffer {
            data: vec![0u8; capacity],
            filled: 0,
        }
    }
}

/// Computes the number of interior tree levels needed for `file_size` under
/// `block_size`/`hashes_per_block`, failing if it would exceed
/// [`FS_VERITY_MAX_LEVELS`].
fn compute_num_levels(file_size: u64, block_size: u64, hashes_per_block: u64) -> Result<usize> {
    let ceil_div = |a: u64, b: u64| (a + b - 1) / b;

    let mut blocks = ceil_div(file_size, block_size);
    let mut num_levels = 0usize;
    while blocks > 1 {
        blocks = ceil_div(blocks, hashes_per_block);
        num_levels += 1;
        if num_levels > FS_VERITY_MAX_LEVELS {
            let message = format!(
                "file_size {} requires more than {} Merkle tree levels at block_size {}",
                file_size, FS_VERITY_MAX_LEVELS, block_size
            );
            log::error!("{}", message);
            return Err(Error::InvalidArgument(message));
        }
    }
    Ok(num_levels)
}

fn round_up(n: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return n;
    }
    let remainder = n % multiple;
    if remainder == 0 {
        n
    } else {
        n + (multiple - remainder)
    }
}

/// Zero-extends `salt` to a multiple of the hash primitive's internal block
/// size. Returns an empty buffer if `salt` is empty, so that the caller can
/// skip the update entirely rather than feeding a zero-length buffer to the
/// hasher.
fn pad_salt(salt: &[u8], hash_block_size: usize) -> Vec<u8> {
    if salt.is_empty() {
        return Vec::new();
    }
    let padded_len = round_up(salt.len(), hash_block_size);
    let mut padded = vec![0u8; padded_len];
    padded[..salt.len()].copy_from_slice(salt);
    padded
}

/// Hashes `buffers[s]` (zero-padding its unfilled tail first) and appends the
/// result either to `buffers[s + 1]` (when `s < num_levels`) or directly
/// into `root_out` (when `s == num_levels`, the last interior level).
///
/// Returns whether the buffer that just received the new hash is now too
/// full to hold another one. The check always uses the tree's global
/// `block_size`, which is what makes the final write into `root_out`
/// correctly signal "no further propagation needed" without a special case;
/// `root_out` is only ever `digest_size` bytes, and `block_size >= 2 *
/// digest_size` is a validated precondition.
fn hash_one_block(
    s: usize,
    num_levels: usize,
    buffers: &mut [LevelBuffer],
    ctx: &mut dyn HashContext,
    padded_salt: &[u8],
    block_size: usize,
    digest_size: usize,
    root_out: &mut [u8],
    root_written: &mut bool,
) -> bool {
    let filled = buffers[s].filled;
    for byte in &mut buffers[s].data[filled..] {
        *byte = 0;
    }

    ctx.init();
    if !padded_salt.is_empty() {
        ctx.update(padded_salt);
    }
    ctx.update(&buffers[s].data);

    let mut digest = [0u8; crate::registry::MAX_DIGEST_SIZE];
    ctx.finalize(&mut digest[..digest_size]);

    let next_filled = if s < num_levels {
        let (left, right) = buffers.split_at_mut(s + 1);
        let next = &mut right[0];
        let offset = next.filled;
        next.data[offset..offset + digest_size].copy_from_slice(&digest[..digest_size]);
        next.filled += digest_size;
        left[s].filled = 0;
        next.filled
    } else {
        root_out.copy_from_slice(&digest[..digest_size]);
        *root_written = true;
        buffers[s].filled = 0;
        digest_size
    };

    next_filled + digest_size > block_size
}

/// Streams `file_size` bytes through `read_block` (called in
/// `ceil(file_size / block_size)` increasing-offset chunks of exactly
/// `min(block_size, remaining)` bytes each) and writes the `digest_size`
/// Merkle root into `root_out`.
///
/// `file_size == 0` is handled by the caller: this function is never called
/// for an empty file (the root is simply `digest_size` zero bytes).
pub(crate) fn build_merkle_tree<F>(
    algorithm: &'static HashAlgorithm,
    block_size: usize,
    salt: &[u8],
    file_size: u64,
    mut read_block: F,
    root_out: &mut [u8],
) -> Result<()>
where
    F: FnMut(&mut [u8]) -> io::Result<()>,
{
    debug_assert_eq!(root_out.len(), algorithm.digest_size);
    debug_assert!(file_size > 0);

    let digest_size = algorithm.digest_size;
    let hashes_per_block = (block_size / digest_size) as u64;
    let num_levels = compute_num_levels(file_size, block_size as u64, hashes_per_block)?;

    let padded_salt = pad_salt(salt, algorithm.block_size);
    let mut ctx = (algorithm.create_ctx)();

    let mut buffers: Vec<LevelBuffer> = (0..=num_levels)
        .map(|_| LevelBuffer::new(block_size))
        .collect();

    let mut root_written = false;
    let mut offset: u64 = 0;
    while offset < file_size {
        let remaining = file_size - offset;
        let n = std::cmp::min(block_size as u64, remaining) as usize;

        read_block(&mut buffers[0].data[..n])?;
        buffers[0].filled = n;

        let mut s = 0usize;
        loop {
            let overflowed = hash_one_block(
                s,
                num_levels,
                &mut buffers,
                ctx.as_mut(),
                &padded_salt,
                block_size,
                digest_size,
                root_out,
                &mut root_written,
            );
            if !overflowed {
                break;
            }
            s += 1;
            if s > num_levels {
                let message =
                    "level counter exceeded num_levels during tree construction".to_string();
                log::error!("{}", message);
                return Err(Error::InvalidArgument(message));
            }
        }

        offset += n as u64;
    }

    // Flush phase: propagate any partially filled interior levels upward,
    // zero-padding as hash_one_block already does. Level 0 (the data stage,
    // buffers[0]) never needs flushing: it is always fully drained by the
    // loop above.
    for s in 1..=num_levels {
        if buffers[s].filled > 0 {
            hash_one_block(
                s,
                num_levels,
                &mut buffers,
                ctx.as_mut(),
                &padded_salt,
                block_size,
                digest_size,
                root_out,
                &mut root_written,
            );
        }
    }

    if !root_written {
        let message = "Merkle tree construction finished without writing a root hash".to_string();
        log::error!("{}", message);
        return Err(Error::InvalidArgument(message));
    }

    Ok(())
}
