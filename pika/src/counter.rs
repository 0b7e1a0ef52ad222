// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Byte-counting wrappers for streams.
//!
//! [`CounterReader`] and [`CounterWriter`] wrap a stream, count the bytes
//! passing through it, and optionally report the running count to a
//! callback. Either can be constructed without an inner stream: a counter
//! without a sink discards what it is given, and a counter without a source
//! counts reads without producing data. A sinkless writer is useful for
//! measuring how large a patch would be without keeping it.

use std::io::{self, Read, Write};

/// A callback receiving the running byte count after each transfer.
pub type CountCallback = Box<dyn FnMut(u64) + Send>;

/// A [`Write`] adapter counting the bytes written through it.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use pika::counter::CounterWriter;
///
/// # fn main() -> std::io::Result<()> {
/// let mut sink = Vec::new();
/// let mut writer = CounterWriter::new(Some(&mut sink));
/// writer.write_all(b"123456")?;
///
/// assert_eq!(writer.count(), 6);
/// # Ok(())
/// # }
/// ```
pub struct CounterWriter<W> {
    inner: Option<W>,
    count: u64,
    on_count: Option<CountCallback>,
}

impl<W: Write> CounterWriter<W> {
    /// Creates a counting writer around `inner`. With no inner writer,
    /// written bytes are counted and discarded.
    pub fn new(inner: Option<W>) -> Self {
        Self {
            inner,
            count: 0,
            on_count: None,
        }
    }

    /// Creates a counting writer that reports the running count to
    /// `on_count` after every write.
    pub fn with_callback(inner: Option<W>, on_count: CountCallback) -> Self {
        Self {
            inner,
            count: 0,
            on_count: Some(on_count),
        }
    }

    /// The number of bytes written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Consumes the counter, returning the inner writer.
    pub fn into_inner(self) -> Option<W> {
        self.inner
    }
}

impl<W: Write> Write for CounterWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = match &mut self.inner {
            Some(inner) => inner.write(buf)?,
            None => buf.len(),
        };

        self.count += written as u64;
        if let Some(on_count) = &mut self.on_count {
            on_count(self.count);
        }

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

/// A [`Read`] adapter counting the bytes read through it.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use pika::counter::CounterReader;
///
/// # fn main() -> std::io::Result<()> {
/// let data = [1u8, 2, 3, 4, 5, 6];
/// let mut reader = CounterReader::new(Some(&data[..]));
/// let mut contents = Vec::new();
/// reader.read_to_end(&mut contents)?;
///
/// assert_eq!(reader.count(), 6);
/// # Ok(())
/// # }
/// ```
pub struct CounterReader<R> {
    inner: Option<R>,
    count: u64,
    on_count: Option<CountCallback>,
}

impl<R: Read> CounterReader<R> {
    /// Creates a counting reader around `inner`. With no inner reader,
    /// reads claim success without touching the buffer.
    pub fn new(inner: Option<R>) -> Self {
        Self {
            inner,
            count: 0,
            on_count: None,
        }
    }

    /// Creates a counting reader that reports the running count to
    /// `on_count` after every read.
    pub fn with_callback(inner: Option<R>, on_count: CountCallback) -> Self {
        Self {
            inner,
            count: 0,
            on_count: Some(on_count),
        }
    }

    /// The number of bytes read so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Consumes the counter, returning the inner reader.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: Read> Read for CounterReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = match &mut self.inner {
            Some(inner) => inner.read(buf)?,
            None => buf.len(),
        };

        self.count += read as u64;
        if let Some(on_count) = &mut self.on_count {
            on_count(self.count);
        }

        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
    };

    use super::*;

    #[test]
    fn reader_counts() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut reader = CounterReader::new(Some(data.as_ref()));

        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).unwrap();

        assert_eq!(reader.count(), 6);
        assert_eq!(contents, data);
    }

    #[test]
    fn reader_without_source_still_counts() {
        let mut reader = CounterReader::<&[u8]>::new(None);

        let mut buf = [0u8; 6];
        let read = reader.read(&mut buf).unwrap();

        assert_eq!(read, 6);
        assert_eq!(reader.count(), 6);
    }

    #[test]
    fn reader_callback_sees_running_count() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen_by_callback = Arc::clone(&seen);

        let mut reader = CounterReader::<&[u8]>::with_callback(
            None,
            Box::new(move |count| seen_by_callback.store(count, Ordering::Relaxed)),
        );

        let mut buf = [0u8; 6];
        for expected in [6, 12, 18] {
            reader.read(&mut buf).unwrap();
            assert_eq!(seen.load(Ordering::Relaxed), expected);
        }
    }

    #[test]
    fn writer_counts() {
        let mut writer = CounterWriter::new(Some(Vec::new()));

        let buf = [1u8, 2, 3, 4, 5, 6];
        for _ in 0..6 {
            writer.write_all(&buf).unwrap();
        }

        assert_eq!(writer.count(), 36);
    }

    #[test]
    fn writer_without_sink_discards() {
        let mut writer = CounterWriter::<Vec<u8>>::new(None);

        let buf = [1u8, 2, 3, 4, 5, 6];
        for _ in 0..6 {
            writer.write_all(&buf).unwrap();
        }

        assert_eq!(writer.count(), 36);
        assert!(writer.into_inner().is_none());
    }

    #[test]
    fn writer_callback_sees_running_count() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen_by_callback = Arc::clone(&seen);

        let mut writer = CounterWriter::<Vec<u8>>::with_callback(
            None,
            Box::new(move |count| seen_by_callback.store(count, Ordering::Relaxed)),
        );

        let buf = [1u8, 2, 3, 4, 5, 6];
        for expected in [6, 12, 18, 24] {
            assert_eq!(writer.write(&buf).unwrap(), 6);
            assert_eq!(seen.load(Ordering::Relaxed), expected);
        }
    }
}
