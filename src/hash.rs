//! The stateful incremental hasher contract.
//!
//! A single-linear-use `init -> update* -> finalize` contract, implemented
//! once per concrete primitive. The primitives themselves (`sha2::Sha256`,
//! `sha2::Sha512`) are a black box; this module only adapts them to the
//! shape the Merkle tree builder expects.

use sha2::Digest as _;

/// A stateful incremental hash context.
///
/// `finalize` writes exactly as many bytes as the algorithm's digest size
/// into `out`; after `finalize`, the context must not be reused until
/// `init` is called again.
pub trait HashContext: Send {
    fn init(&mut self);
    fn update(&mut self, data: &[u8]);
    fn finalize(&mut self, out: &mut [u8]);
}

/// Convenience extension supplying the one-shot `hash_full` operation as
/// `init; update; finalize`.
pub(crate) trait HashContextExt: HashContext {
    fn hash_full(&mut self, data: &[u8], out: &mut [u8]) {
        self.init();
        self.update(data);
        self.finalize(out);
    }
}

impl<T: HashContext + ?Sized> HashContextExt for T {}

pub(crate) struct Sha256Context(sha2::Sha256);

impl Sha256Context {
    pub(crate) fn new() -> Self {
        Self(sha2::Sha256::new())
    }
}

impl HashContext for Sha256Context {
    fn init(&mut self) {
        self.0 = sha2::Sha256::new();
    }

    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(&mut self, out: &mut [u8]) {
        let digest = self.0.finalize_reset();
        out.copy_from_slice(&digest);
    }
}

pub(crate) struct Sha512Context(sha2::Sha512);

impl Sha512Context {
    pub(crate) fn new() -> Self {
        Self(sha2::Sha512::new())
    }
}

impl HashContext for Sha512Context {
    fn init(&mut self) {
        self.0 = sha2::Sha512::new();
    }

    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(&mut self, out: &mut [u8]) {
        let digest = self.0.finalize_reset();
        out.copy_from_slice(&digest);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sha256_hash_full_matches_one_shot() {
        let mut ctx = Sha256Context::new();
        let mut out = [0u8; 32];
        ctx.hash_full(b"abc", &mut out);

        let expected = sha2::Sha256::digest(b"abc");
        assert_eq!(&out[..], &expected[..]);
    }

    #[test]
    fn reinit_after_finalize_is_independent() {
        let mut ctx = Sha256Context::new();
        let mut first = [0u8; 32];
        ctx.hash_full(b"abc", &mut first);

        let mut second = [0u8; 32];
        ctx.hash_full(b"xyz", &mut second);

        assert_ne!(first, second);
    }

    #[test]
    fn update_can_be_called_in_pieces() {
        let mut whole = Sha256Context::new();
        let mut whole_out = [0u8; 32];
        whole.hash_full(b"hello world", &mut whole_out);

        let mut pieced = Sha256Context::new();
        pieced.init();
        pieced.update(b"hello");
        pieced.update(b" ");
        pieced.update(b"world");
        let mut pieced_out = [0u8; 32];
        pieced.finalize(&mut pieced_out);

        assert_eq!(whole_out, pieced_out);
    }
}
