// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Suffix sorting for binary diffing.
//!
//! This crate builds suffix arrays with a ternary-split quicksort driven by
//! prefix doubling (Larsson & Sadakane, "Faster Suffix Sorting"), optionally
//! fanning sort work out to a pool of worker threads. The resulting array
//! supports the longest-match queries a bsdiff-style delta encoder performs
//! for every position of the new blob.
//!
//! # Examples
//!
//! ```
//! use qsufsort::SuffixArray;
//!
//! let data = b"the quick brown fox jumped over the lazy dog";
//! let sa = SuffixArray::new(data);
//!
//! assert!(sa.contains(b"quick"));
//!
//! let m = sa.longest_match(b"lazy fox").unwrap();
//! assert_eq!(&data[m.position()..][..m.len()], b"lazy ");
//! ```
//!
//! Sorting in parallel with progress reporting:
//!
//! ```
//! use qsufsort::{LogProgress, SortOptions, SuffixArray};
//!
//! let data = b"mississippi";
//! let sa = SuffixArray::with_options(data, &SortOptions::auto(), &LogProgress);
//!
//! assert!(sa.contains(b"ssis"));
//! ```

mod index;
mod progress;
mod search;
mod sort;
mod suffix_array;

pub use progress::{LogProgress, NopProgress, Progress};
pub use search::matchlen;
pub use sort::{sort32, sort64, SortOptions};
pub use suffix_array::{SuffixArray, SuffixMatch};
