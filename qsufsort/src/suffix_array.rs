// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use crate::{
    progress::{NopProgress, Progress},
    search,
    sort::{self, SortOptions},
};

/// Buffers at least this large need 64-bit index entries.
const LARGE_BUFFER_MIN: usize = i32::MAX as usize;

/// A suffix array for a byte string.
pub struct SuffixArray<'a> {
    data: &'a [u8],
    inner: Entries,
}

/// Index storage, sized to the data. Small buffers keep 32-bit entries,
/// halving the working set; the two regimes are otherwise identical.
enum Entries {
    Narrow(Vec<i32>),
    Wide(Vec<i64>),
}

/// A match returned by [`SuffixArray::longest_match`]: the start position of
/// the matched range in the indexed data and its length in bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SuffixMatch {
    position: usize,
    len: usize,
}

impl SuffixMatch {
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'a> SuffixArray<'a> {
    /// Creates a new `SuffixArray` for `data`, sorting on the calling
    /// thread.
    ///
    /// This operation is *O*(*n* log *n*).
    ///
    /// # Examples
    ///
    /// ```
    /// use qsufsort::SuffixArray;
    ///
    /// let data = b"Hello, world!";
    /// let sa = SuffixArray::new(data);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, &SortOptions::sequential(), &NopProgress)
    }

    /// Creates a new `SuffixArray` for `data` with explicit sorting options
    /// and a progress hook.
    ///
    /// # Examples
    ///
    /// ```
    /// use qsufsort::{NopProgress, SortOptions, SuffixArray};
    ///
    /// let data = b"Hello, world!";
    /// let sa = SuffixArray::with_options(data, &SortOptions::auto(), &NopProgress);
    /// ```
    #[must_use]
    pub fn with_options(data: &'a [u8], options: &SortOptions, progress: &dyn Progress) -> Self {
        let inner = if data.len() < LARGE_BUFFER_MIN {
            Entries::Narrow(sort::sort32(data, options, progress))
        } else {
            Entries::Wide(sort::sort64(data, options, progress))
        };

        Self { data, inner }
    }

    /// Returns the best match for `query` among the suffixes of the indexed
    /// data, or `None` if not even one byte matches.
    ///
    /// The match is found by binary search over the sorted suffixes and is
    /// near-longest over all positions of the data: the search converges on
    /// the two suffixes bracketing `query` lexicographically and returns
    /// the longer common prefix of the two.
    ///
    /// This operation is *O*(*m* log *n*), where `m` is `query.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use qsufsort::SuffixArray;
    ///
    /// let sa = SuffixArray::new(b"Hello, world!");
    ///
    /// let m = sa.longest_match(b"worldwide").unwrap();
    /// assert_eq!((m.position(), m.len()), (7, 5));
    /// ```
    #[must_use]
    pub fn longest_match(&self, query: &[u8]) -> Option<SuffixMatch> {
        let (position, len) = match &self.inner {
            Entries::Narrow(index) => search::search(index, self.data, query),
            Entries::Wide(index) => search::search(index, self.data, query),
        };

        (len > 0).then_some(SuffixMatch { position, len })
    }

    /// Returns `true` if and only if `pattern` is contained in the indexed
    /// data.
    ///
    /// This operation is *O*(*m* log *n*), where `m` is `pattern.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use qsufsort::SuffixArray;
    ///
    /// let sa = SuffixArray::new(b"Hello, world!");
    /// assert!(sa.contains(b"world"));
    /// ```
    #[must_use]
    pub fn contains(&self, pattern: &[u8]) -> bool {
        pattern.is_empty()
            || self
                .longest_match(pattern)
                .is_some_and(|m| m.len() == pattern.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_one_match() {
        let data = b"Hello, world!";
        let sa = SuffixArray::new(data);

        assert!(sa.contains(b"world"));
    }

    #[test]
    fn contains_two_matches() {
        let data = b"The quick brown fox jumped over the lazy dog because the fox was quick";
        let sa = SuffixArray::new(data);

        assert!(sa.contains(b"fox"));
        assert!(sa.contains(b"quick"));
    }

    #[test]
    fn contains_no_matches() {
        let data = b"Now is the time for all good men to come to the aid of the party";
        let sa = SuffixArray::new(data);

        assert!(!sa.contains(b"times"));
    }

    #[test]
    fn contains_empty_pattern() {
        let sa = SuffixArray::new(b"anything");

        assert!(sa.contains(b""));
    }

    #[test]
    fn longest_match_reports_position_and_length() {
        let data = b"banana";
        let sa = SuffixArray::new(data);

        let m = sa.longest_match(b"anachronism").unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(&data[m.position()..][..m.len()], b"ana");
    }

    #[test]
    fn longest_match_without_any_common_byte() {
        let sa = SuffixArray::new(b"aaaa");

        assert!(sa.longest_match(b"zzz").is_none());
    }

    #[test]
    fn empty_data() {
        let sa = SuffixArray::new(b"");

        assert!(sa.longest_match(b"x").is_none());
        assert!(!sa.contains(b"x"));
    }
}
