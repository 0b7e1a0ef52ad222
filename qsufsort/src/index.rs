// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};

use num_traits::{AsPrimitive, PrimInt, Signed};

/// The index width of a suffix sort.
///
/// The sorter is generic over this trait so that the 32-bit and 64-bit
/// regimes share one implementation and cannot drift apart. Entries must be
/// signed: the sorter stores negative sentinel values in the index array
/// alongside ordinary suffix positions.
///
/// During a parallel pass the shared arrays are slices of `Cell`, each slot
/// owned by exactly one thread at a time. All accesses are `Relaxed`:
/// workers touch disjoint slots within a pass, and the thread join at the
/// end of the pass is what publishes their writes to the driver.
pub(crate) trait Index: PrimInt + Signed + AsPrimitive<usize> + Send + Sync + 'static {
    /// The atomic cell holding one entry of a shared array.
    type Cell: Send + Sync;

    fn cell(value: Self) -> Self::Cell;

    fn get(cell: &Self::Cell) -> Self;

    fn set(cell: &Self::Cell, value: Self);

    fn into_value(cell: Self::Cell) -> Self;

    fn from_usize(value: usize) -> Self;
}

impl Index for i32 {
    type Cell = AtomicI32;

    fn cell(value: Self) -> Self::Cell {
        AtomicI32::new(value)
    }

    fn get(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn set(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }

    fn into_value(cell: Self::Cell) -> Self {
        cell.into_inner()
    }

    fn from_usize(value: usize) -> Self {
        value as i32
    }
}

impl Index for i64 {
    type Cell = AtomicI64;

    fn cell(value: Self) -> Self::Cell {
        AtomicI64::new(value)
    }

    fn get(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn set(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }

    fn into_value(cell: Self::Cell) -> Self {
        cell.into_inner()
    }

    fn from_usize(value: usize) -> Self {
        value as i64
    }
}
