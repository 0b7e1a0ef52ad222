// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use integer_encoding::VarIntWriter;
use qsufsort::{NopProgress, Progress, SortOptions, SuffixArray};
use zstd::Encoder;

use crate::{
    bsdiff::ControlStream,
    header::{MAGIC, VERSION},
};

const ZSTD_COMPRESSION_LEVEL: i32 = 19;

/// Constructs a patch between two blobs
///
/// The diffing algorithm works on arbitrary blobs, but is designed for and
/// particularly well-suited for creating small patch files between native
/// executables.
///
/// The resulting data written to `patch` can later be applied to `old` to
/// reconstruct `new` by using a [`Patcher`](crate::Patcher).
///
/// Suffix sorting of `old` dominates the run time; use
/// [`diff_with_options`] to spread it over multiple threads or to observe
/// its progress.
///
/// # Errors
///
/// Returns an error if an I/O error occurs while writing the patch.
///
/// # Examples
///
/// ```
/// # fn main() -> std::io::Result<()> {
/// let old = b"Hello";
/// let new = b"Hero";
/// let mut patch = Vec::new();
///
/// pika::diff(old, new, &mut patch)?;
///
/// # Ok(())
/// # }
/// ```
pub fn diff<W>(old: &[u8], new: &[u8], patch: &mut W) -> io::Result<()>
where
    W: Write + ?Sized,
{
    diff_with_options(old, new, patch, &SortOptions::sequential(), &NopProgress)
}

/// Constructs a patch between two blobs with explicit suffix-sorting
/// options and a progress hook
///
/// Behaves exactly like [`diff`] otherwise; the patches produced are
/// identical regardless of the options chosen.
///
/// # Errors
///
/// Returns an error if an I/O error occurs while writing the patch.
///
/// # Examples
///
/// ```
/// use qsufsort::{NopProgress, SortOptions};
///
/// # fn main() -> std::io::Result<()> {
/// let old = b"Hello";
/// let new = b"Hero";
/// let mut patch = Vec::new();
///
/// pika::diff_with_options(old, new, &mut patch, &SortOptions::auto(), &NopProgress)?;
///
/// # Ok(())
/// # }
/// ```
pub fn diff_with_options<W>(
    old: &[u8],
    new: &[u8],
    patch: &mut W,
    sort_options: &SortOptions,
    progress: &dyn Progress,
) -> io::Result<()>
where
    W: Write + ?Sized,
{
    // Write the header
    patch.write_u32::<LittleEndian>(MAGIC)?;
    patch.write_u32::<LittleEndian>(VERSION)?;

    let old_index = SuffixArray::with_options(old, sort_options, progress);

    // Create a compressor for the inner patch data
    let mut patch_encoder = Encoder::new(patch, ZSTD_COMPRESSION_LEVEL)?;

    progress.set_label("Scanning for matches");

    // Iterate over control values, writing them to the patch stream
    for control in ControlStream::new(old, new, old_index) {
        // Write add section
        patch_encoder.write_varint(control.add().len())?;
        patch_encoder.write_all(control.add())?;

        // Write copy section
        patch_encoder.write_varint(control.copy().len())?;
        patch_encoder.write_all(control.copy())?;

        // Write seek value
        patch_encoder.write_varint(control.seek())?;
    }

    patch_encoder.finish()?;

    Ok(())
}
