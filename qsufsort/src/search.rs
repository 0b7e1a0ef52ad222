// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use num_traits::AsPrimitive;

use crate::index::Index;

/// Returns the number of leading bytes `a` and `b` have in common.
///
/// # Examples
///
/// ```
/// assert_eq!(qsufsort::matchlen(b"banana", b"bandana"), 3);
/// assert_eq!(qsufsort::matchlen(b"", b"anything"), 0);
/// ```
#[must_use]
pub fn matchlen(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Binary search over the suffix array `index` of `obuf` for the suffix
/// closest to `nbuf`, returning its start position and the length of the
/// common prefix.
///
/// This is the classic bsdiff lookup: the window halves toward the pair of
/// adjacent suffixes bracketing `nbuf`, and of those two the longer match
/// wins, preferring the upper one on ties. The returned match is
/// empirically near-longest over all suffixes of `obuf`, which is all the
/// delta encoder needs.
pub(crate) fn search<X: Index>(index: &[X], obuf: &[u8], nbuf: &[u8]) -> (usize, usize) {
    let mut st = 0;
    let mut en = obuf.len();

    while en - st >= 2 {
        let mid = st + (en - st) / 2;
        if &obuf[index[mid].as_()..] < nbuf {
            st = mid;
        } else {
            en = mid;
        }
    }

    let x = matchlen(&obuf[index[st].as_()..], nbuf);
    let y = matchlen(&obuf[index[en].as_()..], nbuf);

    if x > y {
        (index[st].as_(), x)
    } else {
        (index[en].as_(), y)
    }
}
