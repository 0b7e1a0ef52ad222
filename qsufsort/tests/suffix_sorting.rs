// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

#![allow(missing_docs)]

use proptest::prelude::*;

use qsufsort::{matchlen, sort32, NopProgress, SortOptions, SuffixArray};

/// Reference result: sort all suffix start positions, including the one
/// past the end standing for the empty suffix, by comparing the suffixes
/// themselves.
fn construct_suffix_array_naive(text: &[u8]) -> Vec<i32> {
    let mut suffix_array: Vec<i32> = (0..=text.len() as i32).collect();
    suffix_array.sort_unstable_by_key(|&position| &text[position as usize..]);
    suffix_array
}

fn sort_seq(text: &[u8]) -> Vec<i32> {
    sort32(text, &SortOptions::sequential(), &NopProgress)
}

#[test]
fn classic_text() {
    let text = b"ababcabcabba";

    let naive_result = construct_suffix_array_naive(text);
    assert_eq!(naive_result, [12, 11, 0, 8, 5, 2, 10, 1, 9, 6, 3, 7, 4]);
    assert_eq!(sort_seq(text), naive_result);
}

#[test]
fn short_texts() {
    assert_eq!(sort_seq(b""), [0]);
    assert_eq!(sort_seq(&[42]), [1, 0]);
    assert_eq!(sort_seq(&[42, 3]), [2, 1, 0]);
    assert_eq!(sort_seq(&[3, 42]), [2, 0, 1]);
}

proptest! {
    #[test]
    fn sorts_like_naive(text in prop::collection::vec(any::<u8>(), 0..400)) {
        prop_assert_eq!(sort_seq(&text), construct_suffix_array_naive(&text));
    }

    #[test]
    fn parallel_sorts_like_sequential(
        text in prop::collection::vec(any::<u8>(), 0..400),
        workers in 1usize..5,
    ) {
        let options = SortOptions::with_workers(workers);
        prop_assert_eq!(
            sort32(&text, &options, &NopProgress),
            sort_seq(&text),
        );
    }

    #[test]
    fn longest_match_length_is_sound(
        text in prop::collection::vec(any::<u8>(), 1..200),
        query in prop::collection::vec(any::<u8>(), 0..50),
    ) {
        let sa = SuffixArray::new(&text);

        if let Some(m) = sa.longest_match(&query) {
            prop_assert!(m.len() > 0);
            prop_assert_eq!(m.len(), matchlen(&text[m.position()..], &query));
        }
    }
}
