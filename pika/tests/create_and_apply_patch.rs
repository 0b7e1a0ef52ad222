// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

#![allow(missing_docs)]

use std::{error::Error, io::Cursor};

use qsufsort::{NopProgress, SortOptions};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Builds a pair of blobs resembling successive builds of a binary: the new
/// blob is the old one with a handful of localized edits.
fn old_and_new(len: usize, seed: u64) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut old = vec![0; len];
    rng.fill_bytes(&mut old);

    let mut new = old.clone();
    for _ in 0..8 {
        let at = rng.gen_range(0..new.len());
        let edit_len = rng.gen_range(1..64.min(new.len() - at + 1));
        rng.fill_bytes(&mut new[at..at + edit_len]);
    }
    // An insertion and a deletion, so the blobs also differ in length
    let at = rng.gen_range(0..new.len());
    new.splice(at..at, [0xaa; 48]);
    let at = rng.gen_range(0..new.len() - 32);
    new.drain(at..at + 32);

    (old, new)
}

fn roundtrip(old: &[u8], new: &[u8], options: &SortOptions) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut patch = Vec::new();
    pika::diff_with_options(old, new, &mut patch, options, &NopProgress)?;

    let mut reconstructed = Vec::new();
    pika::patch(Cursor::new(old), patch.as_slice(), &mut reconstructed)?;

    Ok(reconstructed)
}

#[test]
fn edited_blob() -> Result<(), Box<dyn Error>> {
    let (old, new) = old_and_new(96 * 1024, 4);

    assert_eq!(roundtrip(&old, &new, &SortOptions::sequential())?, new);

    Ok(())
}

#[test]
fn edited_blob_with_parallel_sorting() -> Result<(), Box<dyn Error>> {
    let (old, new) = old_and_new(96 * 1024, 5);

    assert_eq!(roundtrip(&old, &new, &SortOptions::with_workers(4))?, new);

    Ok(())
}

#[test]
fn identical_blobs() -> Result<(), Box<dyn Error>> {
    let (old, _) = old_and_new(16 * 1024, 6);

    assert_eq!(roundtrip(&old, &old, &SortOptions::sequential())?, old);

    Ok(())
}

#[test]
fn empty_old_blob() -> Result<(), Box<dyn Error>> {
    let new = b"built from nothing".to_vec();

    assert_eq!(roundtrip(&[], &new, &SortOptions::sequential())?, new);

    Ok(())
}

#[test]
fn empty_new_blob() -> Result<(), Box<dyn Error>> {
    let (old, _) = old_and_new(1024, 7);

    assert_eq!(roundtrip(&old, &[], &SortOptions::sequential())?, []);

    Ok(())
}

#[test]
fn unrelated_blobs() -> Result<(), Box<dyn Error>> {
    let (old, _) = old_and_new(8 * 1024, 8);
    let (new, _) = old_and_new(8 * 1024, 9);

    assert_eq!(roundtrip(&old, &new, &SortOptions::sequential())?, new);

    Ok(())
}

#[test]
fn patch_size_is_small_for_similar_blobs() -> Result<(), Box<dyn Error>> {
    let (old, new) = old_and_new(64 * 1024, 10);

    let mut patch = Vec::new();
    pika::diff(&old, &new, &mut patch)?;

    // The edits touch well under a tenth of the blob; the patch must not
    // approach the size of a full copy.
    assert!(patch.len() < new.len() / 4, "patch is {} bytes", patch.len());

    Ok(())
}
