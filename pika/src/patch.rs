// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use std::{
    cmp,
    error::Error,
    fmt::{self, Display, Formatter},
    io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom, Write},
};

use byteorder::{LittleEndian, ReadBytesExt};
use integer_encoding::VarIntReader;
use zstd::Decoder;

use crate::header::{MAGIC, VERSION};

/// A patcher that reconstructs a new blob from an old blob and a patch
///
/// Because this struct implements [`Read`], it can be used to apply a patch
/// in a streaming fashion, e.g., while reading the patch from the network.
pub struct Patcher<'a, O, P>
where
    O: Read + Seek,
    P: Read,
{
    old: O,
    patch: Decoder<'a, BufReader<P>>,
    state: PatcherState,
}

/// Where in the control layout the patch read position currently is. The
/// byte counts track how much of the current section is still unread, since
/// a caller's buffer may be smaller than the section.
enum PatcherState {
    AtNextControl,
    Add(usize),
    Copy(usize),
}

/// An error indicating that patching a blob failed.
///
/// This error is returned by [`Patcher::new()`] when the patch given to it
/// contains invalid metadata or reading the metadata fails. For more
/// information, see that function's documentation.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use pika::{PatchError, Patcher};
///
/// let mut old = Cursor::new(&[1, 2, 3, 4]);
/// // Garbage data
/// let patch = &[0, 0, 0, 0, 0, 0, 0, 0];
/// let patcher = Patcher::new(old, patch.as_ref());
///
/// assert!(matches!(patcher, Err(PatchError::BadMagic(_))));
/// ```
#[derive(Debug)]
pub enum PatchError {
    /// An I/O error occurred
    Io(io::Error),
    /// The patch magic is invalid
    BadMagic(u32),
    /// The patch version is unsupported
    UnsupportedVersion(u32),
}

impl Display for PatchError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PatchError::Io(e) => write!(f, "I/O error: {e}"),
            PatchError::BadMagic(magic) => {
                write!(f, "bad magic: expected {MAGIC:x}, found {magic:x}")
            }
            PatchError::UnsupportedVersion(version) => {
                write!(
                    f,
                    "unsupported version: found {version}, supported versions are [{VERSION}]",
                )
            }
        }
    }
}

impl Error for PatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PatchError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PatchError {
    fn from(value: io::Error) -> Self {
        PatchError::Io(value)
    }
}

impl<'a, O, P> Patcher<'a, O, P>
where
    O: Read + Seek,
    P: Read,
{
    /// Creates a new `Patcher` for `old` and `patch`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs while reading the patch
    /// metadata or if the patch metadata is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use pika::Patcher;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let old = File::open("app-v1.exe")?;
    /// let patch = File::open("app-v1-to-v2.patch")?;
    ///
    /// let patcher = Patcher::new(old, patch)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(old: O, mut patch: P) -> Result<Self, PatchError> {
        let magic = patch.read_u32::<LittleEndian>()?;
        if magic != MAGIC {
            return Err(PatchError::BadMagic(magic));
        }

        let version = patch.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(PatchError::UnsupportedVersion(version));
        }

        let patch_decoder = Decoder::new(patch)?;

        Ok(Self {
            old,
            patch: patch_decoder,
            state: PatcherState::AtNextControl,
        })
    }

    /// Reads the length of the next control's add section, if any control
    /// is left in the patch stream.
    fn next_control(&mut self) -> io::Result<Option<usize>> {
        match self.patch.read_varint() {
            Ok(add_len) => Ok(Some(add_len)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Produces up to `out.len()` bytes of an add section `add_len` bytes
    /// of which remain: old bytes plus patch deltas, byte by byte.
    fn read_add(&mut self, add_len: usize, out: &mut [u8]) -> io::Result<usize> {
        let len = cmp::min(add_len, out.len());
        let out = &mut out[..len];

        self.old.read_exact(out)?;

        let mut delta = vec![0; len];
        self.patch.read_exact(&mut delta)?;

        for (b, d) in out.iter_mut().zip(delta) {
            *b = b.wrapping_add(d);
        }

        if len == add_len {
            // The add section is exhausted; a copy section always follows.
            let copy_len = self.patch.read_varint()?;
            self.state = PatcherState::Copy(copy_len);
        } else {
            self.state = PatcherState::Add(add_len - len);
        }

        Ok(len)
    }

    /// Produces up to `out.len()` bytes of a copy section `copy_len` bytes
    /// of which remain: literal bytes from the patch stream.
    fn read_copy(&mut self, copy_len: usize, out: &mut [u8]) -> io::Result<usize> {
        let len = cmp::min(copy_len, out.len());

        self.patch.read_exact(&mut out[..len])?;

        if len == copy_len {
            // The copy section is exhausted; reposition the old blob for
            // the next control.
            let seek = self.patch.read_varint()?;
            self.old.seek(SeekFrom::Current(seek))?;

            self.state = PatcherState::AtNextControl;
        } else {
            self.state = PatcherState::Copy(copy_len - len);
        }

        Ok(len)
    }
}

impl<'a, O, P> Read for Patcher<'a, O, P>
where
    O: Read + Seek,
    P: Read,
{
    fn read(&mut self, mut buf: &mut [u8]) -> io::Result<usize> {
        let mut read_total = 0;

        while !buf.is_empty() {
            let read = match self.state {
                PatcherState::AtNextControl => match self.next_control()? {
                    Some(add_len) => {
                        self.state = PatcherState::Add(add_len);
                        0
                    }
                    // The patch stream ended cleanly; the blob is complete.
                    None => break,
                },
                PatcherState::Add(add_len) => self.read_add(add_len, buf)?,
                PatcherState::Copy(copy_len) => self.read_copy(copy_len, buf)?,
            };

            read_total += read;
            buf = &mut buf[read..];
        }

        Ok(read_total)
    }
}

/// Reconstructs a new blob from an old blob and a patch
///
/// This is a convenience method for creating a [`Patcher`] and reading it to
/// completion. If successful, returns the number of bytes written to `new`.
///
/// # Errors
///
/// Returns an error if an I/O error occurs while reading the patch metadata
/// or if the patch metadata is invalid.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let old = File::open("app-v1.exe")?;
/// let patch = File::open("app-v1-to-v2.patch")?;
/// let mut new = File::create("app-v2.exe")?;
///
/// pika::patch(old, patch, &mut new)?;
///
/// # Ok(())
/// # }
/// ```
pub fn patch<O, P, W>(old: O, patch: P, new: &mut W) -> Result<u64, PatchError>
where
    O: Read + Seek,
    P: Read,
    W: Write + ?Sized,
{
    let mut patcher = Patcher::new(old, patch)?;

    Ok(io::copy(&mut patcher, new)?)
}
