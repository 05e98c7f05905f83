//! The fs-verity data model: caller-facing parameters, the fixed 256-byte
//! descriptor, and the output digest.

use core::fmt;

use arrayvec::{ArrayString, ArrayVec};
use byteorder::{ByteOrder, LittleEndian};
use constant_time_eq::constant_time_eq;

use crate::registry::{HashAlgorithmId, MAX_DIGEST_SIZE};

/// Size of the fixed fs-verity descriptor, in bytes. Never varies: there is
/// no variable-length signature trailer in the hashed input.
pub const DESCRIPTOR_SIZE: usize = 256;

const MAX_SALT_SIZE: usize = 32;
const ROOT_HASH_FIELD_SIZE: usize = 64;

/// Caller-provided configuration for one [`crate::compute_digest`] call.
///
/// This mirrors the wire-level `fsverity_enable_arg`/`fsverity_descriptor`
/// parameters, narrowed to what Rust can make statically safe: `salt_size`
/// and the salt pointer collapse into one `Option<&[u8]>`, and the
/// `reserved[]` array (which must always be zero) is simply not exposed.
#[derive(Clone, Copy, Debug)]
pub struct MerkleTreeParams<'a> {
    /// Must be `1`; reserved for future wire-format revisions.
    pub version: u8,
    /// Numeric id resolved through [`crate::lookup_algorithm`].
    pub hash_algorithm: HashAlgorithmId,
    /// Power of two, at least twice the algorithm's digest size.
    pub block_size: u32,
    /// `None` is equivalent to an empty salt. At most 32 bytes.
    pub salt: Option<&'a [u8]>,
    /// Length of the data the Merkle tree is built over.
    pub file_size: u64,
}

impl<'a> MerkleTreeParams<'a> {
    pub(crate) fn salt_bytes(&self) -> &'a [u8] {
        self.salt.unwrap_or(&[])
    }
}

/// A finalized fs-verity measurement: `hash(descriptor)`.
///
/// Carries the algorithm id and digest length alongside the raw bytes for
/// diagnostics; only the bytes are authenticated.
#[derive(Clone)]
pub struct Digest {
    algorithm: HashAlgorithmId,
    bytes: ArrayVec<u8, MAX_DIGEST_SIZE>,
}

impl Digest {
    pub(crate) fn new(algorithm: HashAlgorithmId, bytes: &[u8]) -> Self {
        let mut buf = ArrayVec::new();
        buf.try_extend_from_slice(bytes)
            .expect("digest never exceeds MAX_DIGEST_SIZE");
        Digest {
            algorithm,
            bytes: buf,
        }
    }

    /// The registry id of the algorithm that produced this digest.
    pub fn algorithm(&self) -> HashAlgorithmId {
        self.algorithm
    }

    /// The raw digest bytes, `digest_size` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex encoding of the digest bytes.
    pub fn to_hex(&self) -> ArrayString<{ 2 * MAX_DIGEST_SIZE }> {
        let mut s = ArrayString::new();
        const TABLE: &[u8; 16] = b"0123456789abcdef";
        for &b in &self.bytes {
            s.push(TABLE[(b >> 4) as usize] as char);
            s.push(TABLE[(b & 0xf) as usize] as char);
        }
        s
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Constant-time equality, appropriate for a value that authenticates file
/// contents.
impl PartialEq for Digest {
    fn eq(&self, other: &Digest) -> bool {
        self.algorithm == other.algorithm && constant_time_eq(self.as_bytes(), other.as_bytes())
    }
}

impl Eq for Digest {}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest(alg={}, {})", self.algorithm, self.to_hex())
    }
}

/// The fixed 256-byte fs-verity descriptor. Its hash is the measurement.
pub(crate) struct Descriptor([u8; DESCRIPTOR_SIZE]);

impl Descriptor {
    /// Builds a descriptor with every field set except `root_hash`, which is
    /// left zeroed for the caller (the builder) to fill in place.
    pub(crate) fn new(params: &MerkleTreeParams<'_>, log_blocksize: u8) -> Self {
        let mut bytes = [0u8; DESCRIPTOR_SIZE];

        bytes[0] = params.version;
        bytes[1] = params.hash_algorithm;
        bytes[2] = log_blocksize;

        let salt = params.salt_bytes();
        bytes[3] = salt.len() as u8;

        // sig_size (offset 4, 4 bytes) stays zero: this core never signs.

        LittleEndian::write_u64(&mut bytes[8..16], params.file_size);

        // root_hash (offset 16, 64 bytes) stays zero until the builder
        // writes the root hash directly into it.

        let salt_field = &mut bytes[80..80 + MAX_SALT_SIZE];
        salt_field[..salt.len()].copy_from_slice(salt);

        // reserved (offset 112, 144 bytes) stays zero.

        Descriptor(bytes)
    }

    /// The `root_hash` field, truncated to exactly `digest_size` bytes: the
    /// builder's output slice. The remaining bytes of the 64-byte field stay
    /// zero, per the zero-padded-right wire layout.
    pub(crate) fn root_hash_mut(&mut self, digest_size: usize) -> &mut [u8] {
        &mut self.0[16..16 + digest_size]
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
