// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory loopback transport.
//!
//! Bytes written become readable in order, like a pipe with both ends in
//! hand. Used for tests, for serializing to a buffer, and for measuring how
//! many transport calls a transfer really makes.

use std::io;

use super::{check_scratch, Transport};

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Calls to `available`.
    pub available_calls: u64,
    /// Calls to `read_into`.
    pub read_into_calls: u64,
    /// Calls to `read_exact`.
    pub read_exact_calls: u64,
    /// Calls to `write`.
    pub write_calls: u64,
    /// Bytes handed out by reads.
    pub bytes_read: u64,
    /// Bytes accepted by writes.
    pub bytes_written: u64,
}

impl TransportStats {
    /// Reads that pulled data (`read_into` + `read_exact`).
    pub fn fetch_calls(&self) -> u64 {
        self.read_into_calls + self.read_exact_calls
    }

    /// Total number of calls of any kind.
    pub fn total_calls(&self) -> u64 {
        self.available_calls + self.fetch_calls() + self.write_calls
    }
}

/// Loopback FIFO transport.
///
/// Provides configurable behavior including:
/// - Capped `available` to model transports that under-report
/// - Write capture (sizes of every `write` call)
/// - Error injection on the next read-side or write call
#[derive(Debug, Default)]
pub struct MemoryTransport {
    buffer: Vec<u8>,
    read_pos: usize,
    max_available: Option<usize>,
    write_sizes: Vec<usize>,
    read_error: Option<io::ErrorKind>,
    write_error: Option<io::ErrorKind>,
    stats: TransportStats,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport pre-loaded with `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: bytes.into(),
            ..Self::default()
        }
    }

    /// Never report more than `max` bytes from `available`.
    pub fn with_max_available(mut self, max: usize) -> Self {
        self.max_available = Some(max);
        self
    }

    /// Unread bytes, in order.
    pub fn unread(&self) -> &[u8] {
        &self.buffer[self.read_pos..]
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.buffer.len() - self.read_pos
    }

    /// True if every written byte has been read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain and return all unread bytes.
    pub fn take_unread(&mut self) -> Vec<u8> {
        let rest = self.buffer.split_off(self.read_pos);
        self.buffer.clear();
        self.read_pos = 0;
        rest
    }

    /// Size of every `write` call so far, in call order.
    pub fn write_sizes(&self) -> &[usize] {
        &self.write_sizes
    }

    /// Call counters.
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Reset call counters and the write log.
    pub fn reset_stats(&mut self) {
        self.stats = TransportStats::default();
        self.write_sizes.clear();
    }

    /// Fail the next `available`, `read_into` or `read_exact` call.
    pub fn inject_read_error(&mut self, kind: io::ErrorKind) {
        self.read_error = Some(kind);
    }

    /// Fail the next `write` call.
    pub fn inject_write_error(&mut self, kind: io::ErrorKind) {
        self.write_error = Some(kind);
    }

    fn take_read_error(&mut self) -> io::Result<()> {
        match self.read_error.take() {
            Some(kind) => Err(io::Error::new(kind, "injected error")),
            None => Ok(()),
        }
    }

    fn consume(&mut self, n: usize) -> io::Result<&[u8]> {
        if n > self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("memory transport holds {} of {} requested bytes", self.len(), n),
            ));
        }
        let start = self.read_pos;
        self.read_pos += n;
        self.stats.bytes_read += n as u64;
        Ok(&self.buffer[start..start + n])
    }

    /// Drop consumed bytes once they make up more than half the buffer.
    fn compact(&mut self) {
        if self.read_pos == self.buffer.len() {
            self.buffer.clear();
            self.read_pos = 0;
        } else if self.read_pos > self.buffer.len() / 2 {
            self.buffer.drain(..self.read_pos);
            self.read_pos = 0;
        }
    }
}

impl Transport for MemoryTransport {
    fn available(&mut self) -> io::Result<usize> {
        self.stats.available_calls += 1;
        self.take_read_error()?;
        let unread = self.len();
        Ok(self.max_available.map_or(unread, |max| unread.min(max)))
    }

    fn read_into(&mut self, scratch: &mut [u8], n: usize) -> io::Result<usize> {
        self.stats.read_into_calls += 1;
        self.take_read_error()?;
        check_scratch(scratch, n)?;
        scratch[..n].copy_from_slice(self.consume(n)?);
        self.compact();
        Ok(n)
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        self.stats.read_exact_calls += 1;
        self.take_read_error()?;
        let chunk = self.consume(n)?.to_vec();
        self.compact();
        Ok(chunk)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stats.write_calls += 1;
        if let Some(kind) = self.write_error.take() {
            return Err(io::Error::new(kind, "injected error"));
        }
        self.write_sizes.push(bytes.len());
        self.stats.bytes_written += bytes.len() as u64;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }
}
