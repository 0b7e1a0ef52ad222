// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Suffix sorting by ternary-split quicksort with prefix doubling.
//!
//! The algorithm is implemented as described in the [report] Faster Suffix
//! Sorting by Larsson and Sadakane. Suffixes start out bucketed by first
//! byte; each pass of order `h` then refines groups of suffixes sharing
//! their first `h` bytes by sorting them on the group number of the suffix
//! `h` positions further in (the doubling technique of Karp, Miller, and
//! Rosenberg), so a pass of order `h` leaves groups that agree on their
//! first `2h` bytes. Sorted groups are tracked in-band: a negative entry in
//! the index array encodes a run of already-sorted suffixes, and the sort is
//! done when one run spans the whole array.
//!
//! Passes can fan group sorts out to worker threads. Correctness of that
//! scheme rests on a strict read/write separation, described on [`split`].
//!
//! [report]: https://www.larsson.dogma.net/ssrev-tr.pdf

use std::{
    sync::{
        mpsc::{self, Receiver, SyncSender},
        Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use num_traits::AsPrimitive;

use crate::{index::Index, progress::Progress};

/// Ranges shorter than this are selection sorted; pivot handling costs more
/// than it saves below this size.
const SELECTION_SORT_MAX: usize = 16;

/// Groups no longer than this are sorted inline by the driver even in
/// parallel mode; dispatch overhead cancels the gains for small groups.
const INLINE_GROUP_MAX: usize = 128;

/// Minimum index-sweep distance between two progress reports.
const PROGRESS_INTERVAL: usize = 64 * 1024;

/// Task queue capacity per worker. Deep enough that the driver can keep
/// sweeping while workers drain, shallow enough to bound queueing overhead.
const TASK_QUEUE_FACTOR: usize = 4;

/// Tuning knobs for a suffix sort.
///
/// The default is fully sequential sorting with no overhead measurement.
#[derive(Clone, Copy, Debug, Default)]
pub struct SortOptions {
    workers: usize,
    measure_copy_overhead: bool,
}

impl SortOptions {
    /// Sorts on the calling thread only.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Sorts with `workers` worker threads. Zero means sequential.
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            measure_copy_overhead: false,
        }
    }

    /// Sorts with one worker per available core.
    #[must_use]
    pub fn auto() -> Self {
        Self::with_workers(thread::available_parallelism().map_or(1, usize::from))
    }

    /// Accumulates the wall time spent copying group numbers between
    /// parallel passes and reports it through the progress hook's debug
    /// channel once the sort finishes.
    #[must_use]
    pub fn measure_copy_overhead(mut self, enable: bool) -> Self {
        self.measure_copy_overhead = enable;
        self
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }
}

/// Sorts the suffixes of `buffer`, returning the suffix array with 32-bit
/// entries: a permutation of `[0, buffer.len()]` such that the suffixes
/// starting at consecutive entries are in ascending lexicographic order.
/// The entry naming position `buffer.len()` stands for the empty suffix,
/// which sorts first.
///
/// # Panics
///
/// Panics if `buffer` is too large to index with an `i32`.
///
/// # Examples
///
/// ```
/// use qsufsort::{sort32, NopProgress, SortOptions};
///
/// let index = sort32(b"banana", &SortOptions::sequential(), &NopProgress);
/// assert_eq!(index, [6, 5, 3, 1, 0, 4, 2]);
/// ```
#[must_use]
pub fn sort32(buffer: &[u8], options: &SortOptions, progress: &dyn Progress) -> Vec<i32> {
    assert!(
        buffer.len() < i32::MAX as usize,
        "buffer too large for 32-bit suffix sorting",
    );

    sort::<i32>(buffer, options, progress)
}

/// Sorts the suffixes of `buffer`, returning the suffix array with 64-bit
/// entries. Semantically identical to [`sort32`] (the two share one generic
/// implementation), for buffers beyond the 32-bit index range.
///
/// # Panics
///
/// Panics if `buffer` is too large to index with an `i64`.
#[must_use]
pub fn sort64(buffer: &[u8], options: &SortOptions, progress: &dyn Progress) -> Vec<i64> {
    assert!(
        buffer.len() < i64::MAX as usize,
        "buffer too large for 64-bit suffix sorting",
    );

    sort::<i64>(buffer, options, progress)
}

/// Decodes the in-band "already sorted" marker: a negative index-array
/// entry `-k` stands for a run of `k` sorted singleton groups occupying
/// that slot and the `k - 1` slots after it.
fn sorted_run_len<X: Index>(entry: X) -> Option<usize> {
    (entry < X::zero()).then(|| (-entry).as_())
}

/// A group sort handed to a worker: a disjoint range of the index array.
struct SortTask {
    start: usize,
    length: usize,
    h: usize,
}

/// A deferred `index[at] = value` write recorded while workers are running;
/// `value` is always a negative run length.
struct Mark<X> {
    at: usize,
    value: X,
}

fn sort<X: Index>(obuf: &[u8], options: &SortOptions, progress: &dyn Progress) -> Vec<X> {
    let n = obuf.len();
    let workers = options.workers();
    let parallel = workers > 0;

    // Bucket the suffixes by first byte. After the fill loop, `buckets[c]`
    // is the last index slot occupied by suffixes starting with byte `c`,
    // which is exactly the initial group number of those suffixes.
    let mut buckets = [0usize; 256];
    for &c in obuf {
        buckets[c as usize] += 1;
    }
    for c in 1..256 {
        buckets[c] += buckets[c - 1];
    }
    buckets.copy_within(..255, 1);
    buckets[0] = 0;

    let index: Vec<X::Cell> = (0..=n).map(|_| X::cell(X::zero())).collect();
    let groups: Vec<X::Cell> = (0..=n).map(|_| X::cell(X::zero())).collect();

    for (p, &c) in obuf.iter().enumerate() {
        buckets[c as usize] += 1;
        X::set(&index[buckets[c as usize]], X::from_usize(p));
    }
    X::set(&index[0], X::from_usize(n));

    for (p, &c) in obuf.iter().enumerate() {
        X::set(&groups[p], X::from_usize(buckets[c as usize]));
    }
    // The empty suffix sorts before everything and is a group of its own.
    X::set(&groups[n], X::zero());

    // Bytes occurring exactly once form singleton groups that are sorted
    // before any pass runs. Mark them, and the empty-suffix slot, as such.
    for c in 1..256 {
        if buckets[c] == buckets[c - 1] + 1 {
            X::set(&index[buckets[c]], -X::one());
        }
    }
    X::set(&index[0], -X::one());

    // In parallel mode, group-number reads and writes go to separate arrays
    // within a pass: workers must never observe group numbers assigned
    // during the pass they are sorting in. Sequentially the two names alias
    // one array and updates land in place.
    let groups_next: Vec<X::Cell> = if parallel {
        progress.debug(&format!("parallel suffix sorting ({workers} workers)"));
        (0..=n).map(|p| X::cell(X::get(&groups[p]))).collect()
    } else {
        progress.debug("single-threaded suffix sorting");
        Vec::new()
    };

    let all_sorted = -X::from_usize(n + 1);
    let mut marks: Vec<Mark<X>> = Vec::new();
    let mut copy_overhead = Duration::ZERO;

    let mut h = 1usize;
    while X::get(&index[0]) != all_sorted {
        progress.set_label(&format!("Suffix sorting ({h}-order)"));

        let trailing_run = if parallel {
            marks.clear();
            let (tasks, queue) = mpsc::sync_channel::<SortTask>(workers * TASK_QUEUE_FACTOR);
            let queue = Mutex::new(queue);

            let run = thread::scope(|s| {
                for _ in 0..workers {
                    s.spawn(|| worker::<X>(&queue, &index, &groups, &groups_next));
                }

                let run = sweep::<X, _, _>(
                    &index,
                    &groups,
                    n,
                    progress,
                    |at, value| marks.push(Mark { at, value }),
                    |start, length| {
                        if length > INLINE_GROUP_MAX {
                            // Sending only fails once every receiver is
                            // gone, which takes a worker panic.
                            let _ = tasks.send(SortTask { start, length, h });
                        } else {
                            split::<X>(&index, &groups, &groups_next, start, length, h);
                        }
                    },
                );

                // Closing the queue is what lets the workers run dry and
                // exit; the scope then joins them.
                drop(tasks);
                run
            });

            // With the workers gone it is safe to collapse runs whose slots
            // they were reading.
            for mark in marks.drain(..) {
                X::set(&index[mark.at], mark.value);
            }
            run
        } else {
            sweep::<X, _, _>(
                &index,
                &groups,
                n,
                progress,
                |at, value| X::set(&index[at], value),
                |start, length| split::<X>(&index, &groups, &groups, start, length, h),
            )
        };

        if trailing_run > 0 {
            // The run touching the end of the array is collapsed here; on
            // the final pass this writes the terminal `-(n + 1)` marker.
            X::set(
                &index[n + 1 - trailing_run],
                -X::from_usize(trailing_run),
            );
        }

        if parallel {
            let copy_start = options.measure_copy_overhead.then(Instant::now);
            for p in 0..=n {
                X::set(&groups[p], X::get(&groups_next[p]));
            }
            if let Some(start) = copy_start {
                copy_overhead += start.elapsed();
            }
        }

        h += h;
    }

    if parallel && options.measure_copy_overhead {
        progress.debug(&format!("parallel copy overhead: {copy_overhead:?}"));
    }

    // Every group now has size one, so each suffix's group number is its
    // final rank. Inverting the group array into the index array yields the
    // suffix array.
    for p in 0..=n {
        X::set(&index[X::get(&groups[p]).as_()], X::from_usize(p));
    }

    index.into_iter().map(X::into_value).collect()
}

/// One pass over the index array: skips already-sorted runs, merges
/// adjacent ones through `merge_run`, and hands every still-unsorted group
/// to `dispatch`. Returns the length of the sorted run touching the end of
/// the array, which the caller collapses once it is safe to do so.
fn sweep<X, M, D>(
    index: &[X::Cell],
    groups: &[X::Cell],
    n: usize,
    progress: &dyn Progress,
    mut merge_run: M,
    mut dispatch: D,
) -> usize
where
    X: Index,
    M: FnMut(usize, X),
    D: FnMut(usize, usize),
{
    // Accumulates the combined length of adjacent sorted runs until the
    // next unsorted group (or the end of the array) is reached.
    let mut run = 0usize;
    let mut last_reported = 0usize;

    let mut i = 0usize;
    while i < n + 1 {
        if i - last_reported > PROGRESS_INTERVAL {
            progress.on_progress(i as f64 / n as f64);
            last_reported = i;
        }

        if let Some(sorted) = sorted_run_len(X::get(&index[i])) {
            run += sorted;
            i += sorted;
            continue;
        }

        if run > 0 {
            // The runs just skipped collapse into a single larger one
            // starting where they began.
            merge_run(i - run, -X::from_usize(run));
            run = 0;
        }

        // The group number of a leader is the index of the group's last
        // slot, so the group extent follows from it.
        let length = X::get(&groups[X::get(&index[i]).as_()]).as_() + 1 - i;
        dispatch(i, length);
        i += length;
    }

    run
}

/// Pulls group sorts off the queue until it is closed and drained.
fn worker<X: Index>(
    queue: &Mutex<Receiver<SortTask>>,
    index: &[X::Cell],
    groups: &[X::Cell],
    groups_next: &[X::Cell],
) {
    loop {
        let task = match queue.lock() {
            Ok(queue) => queue.recv(),
            // A poisoned lock means another worker panicked; stop pulling.
            Err(_) => return,
        };

        match task {
            Ok(task) => {
                split::<X>(index, groups, groups_next, task.start, task.length, task.h);
            }
            // Queue closed and drained; the pass is over.
            Err(_) => return,
        }
    }
}

/// Ternary-split quicksort of `index[start..start + length]`: partitions the
/// range into `[< pivot][= pivot][> pivot]` by the doubling key and recurses
/// on the outer two. Every entry of the settled `=` partition gets its new
/// group number written, and a singleton `=` partition is marked sorted in
/// the index array.
///
/// Keys are read from `groups` and new group numbers are written to
/// `groups_next`, never the other way around. That separation is what makes
/// concurrent calls on disjoint ranges safe: no call can observe group
/// numbers assigned by another call in the same pass. Sequential callers
/// pass the same array for both and update in place.
fn split<X: Index>(
    index: &[X::Cell],
    groups: &[X::Cell],
    groups_next: &[X::Cell],
    start: usize,
    length: usize,
    h: usize,
) {
    // The sort key of the suffix held in a given index slot: the current
    // group number (h-order rank) of the suffix h positions further in.
    let key = |slot: usize| X::get(&groups[X::get(&index[slot]).as_() + h]);
    let swap = |a: usize, b: usize| {
        let tmp = X::get(&index[a]);
        X::set(&index[a], X::get(&index[b]));
        X::set(&index[b], tmp);
    };

    if length < SELECTION_SORT_MAX {
        let mut k = start;
        while k < start + length {
            // Find the smallest remaining key, gathering every entry that
            // shares it at the front of the unsorted remainder.
            let mut smallest = key(k);
            let mut count = 1usize;
            for i in 1..start + length - k {
                let candidate = key(k + i);
                if candidate < smallest {
                    smallest = candidate;
                    count = 0;
                }
                if candidate == smallest {
                    swap(k + i, k + count);
                    count += 1;
                }
            }

            // Everything equal to the smallest key is one group, numbered
            // by the index of its last slot.
            let group = X::from_usize(k + count - 1);
            for i in 0..count {
                X::set(&groups_next[X::get(&index[k + i]).as_()], group);
            }
            if count == 1 {
                X::set(&index[k], -X::one());
            }

            k += count;
        }
        return;
    }

    let pivot = key(start + length / 2);

    // First scan: the partition sizes fix the region boundaries.
    let mut smaller = 0usize;
    let mut equal = 0usize;
    for slot in start..start + length {
        let x = key(slot);
        if x < pivot {
            smaller += 1;
        }
        if x == pivot {
            equal += 1;
        }
    }
    let eq_start = start + smaller;
    let gt_start = eq_start + equal;

    // Walk the `<` region, pushing `=` and `>` entries into their regions.
    let mut i = start;
    let mut eq_filled = 0usize;
    let mut gt_filled = 0usize;
    while i < eq_start {
        let x = key(i);
        if x < pivot {
            i += 1;
        } else if x == pivot {
            swap(i, eq_start + eq_filled);
            eq_filled += 1;
        } else {
            swap(i, gt_start + gt_filled);
            gt_filled += 1;
        }
    }

    // The `<` region is settled, but the `=` region may still hold `>`
    // entries displaced by the first walk.
    while eq_start + eq_filled < gt_start {
        if key(eq_start + eq_filled) == pivot {
            eq_filled += 1;
        } else {
            swap(eq_start + eq_filled, gt_start + gt_filled);
            gt_filled += 1;
        }
    }

    if eq_start > start {
        split::<X>(index, groups, groups_next, start, eq_start - start, h);
    }

    // The whole `=` partition is one group, numbered by its last slot.
    let group = X::from_usize(gt_start - 1);
    for slot in eq_start..gt_start {
        X::set(&groups_next[X::get(&index[slot]).as_()], group);
    }
    if equal == 1 {
        X::set(&index[eq_start], -X::one());
    }

    if start + length > gt_start {
        split::<X>(index, groups, groups_next, gt_start, start + length - gt_start, h);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    use super::*;
    use crate::progress::NopProgress;

    fn sort_seq(data: &[u8]) -> Vec<i32> {
        sort32(data, &SortOptions::sequential(), &NopProgress)
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(sort_seq(b""), [0]);
    }

    #[test]
    fn single_byte() {
        assert_eq!(sort_seq(b"a"), [1, 0]);
    }

    #[test]
    fn banana() {
        assert_eq!(sort_seq(b"banana"), [6, 5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn mississippi() {
        assert_eq!(sort_seq(b"mississippi"), [11, 10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
    }

    #[test]
    fn repeated_byte() {
        assert_eq!(sort_seq(b"aaaa"), [4, 3, 2, 1, 0]);
    }

    #[test]
    fn alternating_extremes() {
        assert_eq!(sort_seq(&[0x00, 0xff, 0x00, 0xff]), [4, 2, 0, 3, 1]);
    }

    #[test]
    fn result_is_a_permutation() {
        let data = random_data(4 * 1024, 7);

        let mut index = sort_seq(&data);
        index.sort_unstable();

        let expected: Vec<i32> = (0..=data.len() as i32).collect();
        assert_eq!(index, expected);
    }

    #[test]
    fn parallel_matches_sequential() {
        let random = random_data(4 * 1024, 42);
        let repetitive = vec![0x61; 2 * 1024];
        let short = b"abracadabra".to_vec();

        for data in [&random, &repetitive, &short] {
            let sequential = sort_seq(data);

            for workers in [1, 2, 4, 8] {
                let options = SortOptions::with_workers(workers);
                assert_eq!(sort32(data, &options, &NopProgress), sequential);
            }
        }
    }

    #[test]
    fn parallel_with_overhead_measurement() {
        let data = random_data(8 * 1024, 3);
        let options = SortOptions::with_workers(2).measure_copy_overhead(true);

        assert_eq!(sort32(&data, &options, &NopProgress), sort_seq(&data));
    }

    #[test]
    fn wide_and_narrow_indexes_agree() {
        let data = random_data(2 * 1024, 99);

        let narrow = sort32(&data, &SortOptions::sequential(), &NopProgress);
        let wide = sort64(&data, &SortOptions::sequential(), &NopProgress);

        let widened: Vec<i64> = narrow.iter().map(|&e| i64::from(e)).collect();
        assert_eq!(widened, wide);
    }

    fn random_data(len: usize, seed: u64) -> Vec<u8> {
        let mut data = vec![0; len];
        StdRng::seed_from_u64(seed).fill_bytes(&mut data);
        data
    }
}
