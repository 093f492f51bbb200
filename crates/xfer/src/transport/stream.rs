// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport over any `std::io` stream (TCP socket, file, pipe).
//!
//! `Read` has no notion of "bytes available", so the transport keeps a small
//! look-ahead: `available` reports what it holds and, when empty, performs one
//! blocking `read` to find out. A `read` returning 0 is end of stream.

use std::io::{self, Read, Write};

use super::{check_scratch, Transport};

/// Default look-ahead size.
pub const DEFAULT_LOOKAHEAD: usize = 4096;

/// [`Transport`] backed by a `Read + Write` stream.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    lookahead: Box<[u8]>,
    start: usize,
    end: usize,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap `stream` with the default look-ahead.
    pub fn new(stream: S) -> Self {
        Self::with_lookahead(stream, DEFAULT_LOOKAHEAD)
    }

    /// Wrap `stream` with a look-ahead of `capacity` bytes (at least 1).
    pub fn with_lookahead(stream: S, capacity: usize) -> Self {
        Self {
            stream,
            lookahead: vec![0u8; capacity.max(1)].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream.
    ///
    /// Reading from it directly skips bytes held in the look-ahead.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the stream. Bytes still in the look-ahead are dropped.
    pub fn into_inner(self) -> S {
        if self.end > self.start {
            log::debug!(
                "[xfer::stream] dropping {} look-ahead bytes on into_inner",
                self.end - self.start
            );
        }
        self.stream
    }

    fn fill_lookahead(&mut self) -> io::Result<()> {
        loop {
            match self.stream.read(&mut self.lookahead) {
                Ok(n) => {
                    self.start = 0;
                    self.end = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn available(&mut self) -> io::Result<usize> {
        if self.start == self.end {
            self.fill_lookahead()?;
        }
        Ok(self.end - self.start)
    }

    fn read_into(&mut self, scratch: &mut [u8], n: usize) -> io::Result<usize> {
        check_scratch(scratch, n)?;
        let held = (self.end - self.start).min(n);
        scratch[..held].copy_from_slice(&self.lookahead[self.start..self.start + held]);
        self.start += held;
        if held < n {
            Read::read_exact(&mut self.stream, &mut scratch[held..n])?;
        }
        Ok(n)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }
}

/// Joins a separate reader and writer into one `Read + Write` stream.
///
/// Useful when input and output are different handles, e.g. stdin and
/// stdout, or a file on one side and `io::sink()` on the other.
#[derive(Debug)]
pub struct Pipe<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> Pipe<R, W> {
    /// Join `reader` and `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Split back into the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W> Read for Pipe<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R, W: Write> Write for Pipe<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
