//! Pinned end-to-end digests for fixed scenarios, so a future change to the
//! framing (field order, padding, level sizing) gets caught immediately
//! instead of silently producing an incompatible measurement.

use fsverity_merkle::{compute_digest, Error, MerkleTreeParams, SHA256};

fn params(file_size: u64, block_size: u32, salt: Option<&[u8]>) -> MerkleTreeParams<'_> {
    MerkleTreeParams {
        version: 1,
        hash_algorithm: SHA256,
        block_size,
        salt,
        file_size,
    }
}

#[test]
fn empty_file() {
    let p = params(0, 4096, None);
    let digest = compute_digest(&p, |_| Ok(())).unwrap();
    assert_eq!(
        digest.to_hex().as_str(),
        "3d248ca542a24fc62d1c43b916eae5016878e2533c88238480b26128a1f1af95"
    );
}

#[test]
fn one_block_of_zeros() {
    let p = params(4096, 4096, None);
    let digest = compute_digest(&p, |buf| {
        buf.fill(0);
        Ok(())
    })
    .unwrap();
    assert_eq!(
        digest.to_hex().as_str(),
        "babc284ee4ffe7f449377fbf6692715b43aec7bc39c094a95878904d34bac97e"
    );
}

#[test]
fn large_file_is_deterministic_and_differs_from_the_all_zero_scenario() {
    let file_size = 100_000u64;
    let content: Vec<u8> = (0..file_size).map(|i| (i % 256) as u8).collect();

    let build = || {
        let p = params(file_size, 4096, None);
        let mut offset = 0usize;
        compute_digest(&p, |buf| {
            buf.copy_from_slice(&content[offset..offset + buf.len()]);
            offset += buf.len();
            Ok(())
        })
        .unwrap()
    };

    let a = build();
    let b = build();
    assert_eq!(a, b);

    let zeros = params(4096, 4096, None);
    let zeros_digest = compute_digest(&zeros, |buf| {
        buf.fill(0);
        Ok(())
    })
    .unwrap();
    assert_ne!(a, zeros_digest);
}

#[test]
fn one_byte_content_change_changes_the_digest() {
    let p = params(1, 4096, None);
    let a = compute_digest(&p, |buf| {
        buf[0] = 0x41;
        Ok(())
    })
    .unwrap();
    let b = compute_digest(&p, |buf| {
        buf[0] = 0x42;
        Ok(())
    })
    .unwrap();
    assert_ne!(a, b);
}

#[test]
fn salt_changes_the_digest() {
    let file_size = 100_000u64;
    let content: Vec<u8> = (0..file_size).map(|i| (i % 256) as u8).collect();

    let unsalted = params(file_size, 4096, None);
    let mut offset = 0usize;
    let a = compute_digest(&unsalted, |buf| {
        buf.copy_from_slice(&content[offset..offset + buf.len()]);
        offset += buf.len();
        Ok(())
    })
    .unwrap();

    let salt = [0x01u8];
    let salted = params(file_size, 4096, Some(&salt));
    offset = 0;
    let b = compute_digest(&salted, |buf| {
        buf.copy_from_slice(&content[offset..offset + buf.len()]);
        offset += buf.len();
        Ok(())
    })
    .unwrap();

    assert_ne!(a, b);
}

#[test]
fn invalid_block_size_is_rejected_before_any_read() {
    let p = params(4096, 4097, None);
    let mut reads = 0u32;
    let err = compute_digest(&p, |_| {
        reads += 1;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(reads, 0);
}
