// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use qsufsort::SuffixArray;

/// How many matching bytes a fresh suffix match must gain over the
/// previous-offset run before it is worth starting a new control.
const MIN_MATCH_GAIN: usize = 8;

/// One approximate match of a region of `new` against `old`: an add region
/// of `add_len` bytes starting at `old_start`/`new_start`, followed by a
/// copy region of `new` ending at `copy_end`.
#[derive(Clone, Copy)]
pub(crate) struct Match {
    old_start: usize,
    new_start: usize,
    add_len: usize,
    copy_end: usize,
}

impl Match {
    fn copy_start(&self) -> usize {
        self.new_start + self.add_len
    }
}

/// Scans `new` left to right, yielding a [`Match`] each time the suffix
/// array of `old` finds an alignment that beats extending the previous one.
pub(crate) struct MatchScanner<'a> {
    scan: usize,
    len: usize,
    pos: usize,
    last_scan: usize,
    last_pos: usize,
    last_offset: isize,
    old: &'a [u8],
    new: &'a [u8],
    old_index: SuffixArray<'a>,
}

impl<'a> MatchScanner<'a> {
    fn new(old: &'a [u8], new: &'a [u8], old_index: SuffixArray<'a>) -> Self {
        Self {
            scan: 0,
            len: 0,
            pos: 0,
            last_scan: 0,
            last_pos: 0,
            last_offset: 0,
            old,
            new,
            old_index,
        }
    }

    /// The byte of `old` aligned with position `p` of `new` under the
    /// previous match's offset, when that position exists in `old`.
    fn old_at_last_offset(&self, p: usize) -> Option<u8> {
        // A negative sum wraps to a huge index and fails the bounds check.
        let shifted = (p as isize + self.last_offset) as usize;
        self.old.get(shifted).copied()
    }

    /// Length of the forward extension of the previous match, chosen to
    /// maximize matched bytes against the bytes it spends.
    fn extend_forward(&self) -> usize {
        let mut score = 0isize;
        let mut best_score = 0isize;
        let mut best_len = 0usize;

        let mut i = 0;
        while self.last_scan + i < self.scan && self.last_pos + i < self.old.len() {
            if self.old[self.last_pos + i] == self.new[self.last_scan + i] {
                score += 1;
            }
            i += 1;
            if score * 2 - i as isize > best_score * 2 - best_len as isize {
                best_score = score;
                best_len = i;
            }
        }

        best_len
    }

    /// Length of the backward extension of the current match, scored the
    /// same way as [`Self::extend_forward`].
    fn extend_backward(&self) -> usize {
        let mut score = 0isize;
        let mut best_score = 0isize;
        let mut best_len = 0usize;

        let mut i = 0;
        while self.scan >= self.last_scan + i && self.pos >= i {
            if self.old[self.pos - i] == self.new[self.scan - i] {
                score += 1;
            }
            if score * 2 - i as isize > best_score * 2 - best_len as isize {
                best_score = score;
                best_len = i;
            }
            i += 1;
        }

        best_len
    }

    /// When the forward and backward extensions overlap, splits the overlap
    /// at the point where switching alignments stops paying off.
    fn resolve_overlap(&self, mut len_forward: usize, mut len_back: usize) -> (usize, usize) {
        let forward_end = self.last_scan + len_forward;
        let back_start = self.scan - len_back;
        if forward_end <= back_start {
            return (len_forward, len_back);
        }

        let overlap = forward_end - back_start;
        let mut score = 0isize;
        let mut best_score = 0isize;
        let mut split = 0usize;
        for i in 0..overlap {
            if self.new[self.last_scan + len_forward - overlap + i]
                == self.old[self.last_pos + len_forward - overlap + i]
            {
                score += 1;
            }
            if self.new[self.scan - len_back + i] == self.old[self.pos - len_back + i] {
                score -= 1;
            }
            if score > best_score {
                best_score = score;
                split = i + 1;
            }
        }

        len_forward += split;
        len_forward -= overlap;
        len_back -= split;

        (len_forward, len_back)
    }
}

impl<'a> Iterator for MatchScanner<'a> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        while self.scan < self.new.len() {
            let mut old_score = 0;
            self.scan += self.len;
            let mut scored_to = self.scan;

            while self.scan < self.new.len() {
                (self.pos, self.len) = self
                    .old_index
                    .longest_match(&self.new[self.scan..])
                    .map_or((0, 0), |m| (m.position(), m.len()));

                // Score how well the previous match's offset still explains
                // the bytes the new match covers.
                while scored_to < self.scan + self.len {
                    if self.old_at_last_offset(scored_to) == Some(self.new[scored_to]) {
                        old_score += 1;
                    }
                    scored_to += 1;
                }

                if (self.len == old_score && self.len != 0)
                    || self.len > old_score + MIN_MATCH_GAIN
                {
                    break;
                }

                if self.old_at_last_offset(self.scan) == Some(self.new[self.scan]) {
                    old_score -= 1;
                }

                self.scan += 1;
            }

            if self.len != old_score || self.scan == self.new.len() {
                let len_forward = self.extend_forward();
                let len_back = if self.scan < self.new.len() {
                    self.extend_backward()
                } else {
                    0
                };
                let (len_forward, len_back) = self.resolve_overlap(len_forward, len_back);

                let found = Match {
                    old_start: self.last_pos,
                    new_start: self.last_scan,
                    add_len: len_forward,
                    copy_end: self.scan - len_back,
                };

                self.last_scan = self.scan - len_back;
                self.last_pos = self.pos - len_back;
                self.last_offset = self.pos as isize - self.scan as isize;

                return Some(found);
            }
        }

        None
    }
}

/// One patch control: a run of byte-wise deltas against `old`, a run of
/// literal bytes from `new`, and a seek to apply to the old read position
/// before the next control.
pub(crate) struct Control<'a> {
    add: Vec<u8>,
    copy: &'a [u8],
    seek: i64,
}

impl<'a> Control<'a> {
    pub(crate) fn add(&self) -> &[u8] {
        &self.add
    }

    pub(crate) fn copy(&self) -> &'a [u8] {
        self.copy
    }

    pub(crate) fn seek(&self) -> i64 {
        self.seek
    }
}

/// Turns a stream of [`Match`]es into the controls the patch format emits.
pub(crate) struct ControlStream<'a, I>
where
    I: Iterator<Item = Match>,
{
    matches: I,
    pending: Option<Match>,
    old: &'a [u8],
    new: &'a [u8],
}

impl<'a> ControlStream<'a, MatchScanner<'a>> {
    pub(crate) fn new(old: &'a [u8], new: &'a [u8], old_index: SuffixArray<'a>) -> Self {
        Self {
            matches: MatchScanner::new(old, new, old_index),
            pending: None,
            old,
            new,
        }
    }
}

impl<'a, I> Iterator for ControlStream<'a, I>
where
    I: Iterator<Item = Match>,
{
    type Item = Control<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match self.pending.take() {
            Some(m) => m,
            None => self.matches.next()?,
        };

        let add = self.new[current.new_start..][..current.add_len]
            .iter()
            .zip(&self.old[current.old_start..][..current.add_len])
            .map(|(n, o)| n.wrapping_sub(*o))
            .collect();
        let copy = &self.new[current.copy_start()..current.copy_end];

        self.pending = self.matches.next();

        let seek = self.pending.map_or(0, |m| {
            m.old_start as i64 - (current.old_start + current.add_len) as i64
        });

        Some(Control { add, copy, seek })
    }
}
