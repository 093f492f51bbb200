// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffered transfer.
//!
//! Two owned fixed-capacity buffers sit between the protocol and the
//! transport:
//!
//! ```text
//!            write_buffer (W)                     read_buffer (R)
//! +---------------------------+---------+   +-------+---------------+-----+
//! | pending                   |  free   |   | spent | unread        |     |
//! +---------------------------+---------+   +-------+---------------+-----+
//! 0                      write_index    W   0   read_index     read_size   R
//! ```
//!
//! Writes fill the write buffer and flush it as one transport `write` the
//! moment it is full. Reads drain the read buffer and refill it from the
//! transport when empty, looping until the request is satisfied.
//!
//! Refills go through the scratch region (`read_into`) unless the refill is
//! larger than the direct-read threshold, in which case `read_exact` is used
//! and the scratch copy is skipped.

use serde::{Deserialize, Serialize};

use super::{Transfer, TransferKind, TransferStats};
use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::transport::Transport;

/// How much a refill asks the transport for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefillPolicy {
    /// One fetch of `min(available, R)`.
    #[default]
    Available,
    /// Keep fetching what the transport reports until `min(outstanding, R)`
    /// bytes are buffered or `available` drops to 0. Each fetch stays within
    /// what the transport reported, so end of stream is never overshot.
    Demand,
}

/// Scratch region: lent by the caller, or owned when none was supplied.
#[derive(Debug)]
enum Scratch<'s> {
    Borrowed(&'s mut [u8]),
    Owned(Box<[u8]>),
}

impl Scratch<'_> {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Scratch::Borrowed(buf) => &mut buf[..],
            Scratch::Owned(buf) => &mut buf[..],
        }
    }

    fn len(&self) -> usize {
        match self {
            Scratch::Borrowed(buf) => buf.len(),
            Scratch::Owned(buf) => buf.len(),
        }
    }
}

/// [`Transfer`] with fixed read-ahead and write-ahead buffers.
///
/// The scratch region, when borrowed, is overwritten on every refill. Its
/// contents are meaningless between calls; do not read it while the transfer
/// is alive (the borrow checker enforces this for `&mut` scratch).
#[derive(Debug)]
pub struct BufferedTransfer<'s, T> {
    transport: T,
    scratch: Scratch<'s>,
    write_buffer: Box<[u8]>,
    write_index: usize,
    read_buffer: Box<[u8]>,
    read_index: usize,
    read_size: usize,
    direct_read_threshold: usize,
    refill_policy: RefillPolicy,
    stats: TransferStats,
}

impl<'s, T: Transport> BufferedTransfer<'s, T> {
    /// Bind `transport` and `scratch` with the reference capacities.
    pub fn new(transport: T, scratch: &'s mut [u8]) -> Result<Self> {
        Self::with_config(transport, scratch, &TransferConfig::default())
    }

    /// Bind `transport` and `scratch` with capacities from `config`.
    ///
    /// `scratch` must hold at least `config.read_capacity` bytes.
    pub fn with_config(
        transport: T,
        scratch: &'s mut [u8],
        config: &TransferConfig,
    ) -> Result<Self> {
        Self::build(transport, Scratch::Borrowed(scratch), config)
    }

    /// Bind `transport` and allocate a private scratch region of
    /// `config.scratch_capacity` bytes.
    pub fn with_owned_scratch(transport: T, config: &TransferConfig) -> Result<Self> {
        let scratch = vec![0u8; config.scratch_capacity].into_boxed_slice();
        Self::build(transport, Scratch::Owned(scratch), config)
    }

    fn build(transport: T, scratch: Scratch<'s>, config: &TransferConfig) -> Result<Self> {
        config.validate()?;
        if scratch.len() < config.read_capacity {
            return Err(TransferError::ScratchTooSmall {
                len: scratch.len(),
                required: config.read_capacity,
            });
        }

        let direct_read_threshold = config
            .direct_read_threshold
            .unwrap_or(scratch.len())
            .min(scratch.len());

        log::debug!(
            "[xfer::buffered] created W={} R={} scratch={} direct>{} policy={:?}",
            config.write_capacity,
            config.read_capacity,
            scratch.len(),
            direct_read_threshold,
            config.refill_policy
        );

        Ok(Self {
            transport,
            scratch,
            write_buffer: vec![0u8; config.write_capacity].into_boxed_slice(),
            write_index: 0,
            read_buffer: vec![0u8; config.read_capacity].into_boxed_slice(),
            read_index: 0,
            read_size: 0,
            direct_read_threshold,
            refill_policy: config.refill_policy,
            stats: TransferStats::default(),
        })
    }

    /// Number of bytes written but not yet flushed.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Number of bytes refilled but not yet consumed.
    pub fn buffered_unread(&self) -> usize {
        self.read_size - self.read_index
    }

    /// Write-buffer capacity (`W`).
    pub fn write_capacity(&self) -> usize {
        self.write_buffer.len()
    }

    /// Read-buffer capacity (`R`).
    pub fn read_capacity(&self) -> usize {
        self.read_buffer.len()
    }

    /// Refills larger than this bypass the scratch region.
    pub fn direct_read_threshold(&self) -> usize {
        self.direct_read_threshold
    }

    /// Active refill policy.
    pub fn refill_policy(&self) -> RefillPolicy {
        self.refill_policy
    }

    /// Borrow the transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    ///
    /// Bypasses both buffers: unread refilled bytes and unflushed writes stay
    /// where they are.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Free the buffers and hand back the transport. Does not flush.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Pull the next chunk into the read buffer. Returns its size; 0 means
    /// the transport has nothing more.
    fn refill(&mut self, outstanding: usize) -> Result<usize> {
        debug_assert_eq!(self.read_index, self.read_size);

        let capacity = self.read_buffer.len();
        let wanted = match self.refill_policy {
            RefillPolicy::Available => 0,
            RefillPolicy::Demand => outstanding.min(capacity),
        };

        self.read_index = 0;
        self.read_size = 0;
        let mut fetches = 0;
        loop {
            let available = self.transport.available()?;
            let n = available.min(capacity - self.read_size);
            if n == 0 {
                break;
            }
            self.fetch(n)?;
            fetches += 1;
            if self.read_size >= wanted || self.read_size == capacity {
                break;
            }
        }

        if self.read_size > 0 {
            self.stats.refills += 1;
            log::trace!(
                "[xfer::buffered] refill {} bytes in {} fetches (outstanding {})",
                self.read_size,
                fetches,
                outstanding
            );
        }
        Ok(self.read_size)
    }

    /// Append exactly `n` transport bytes to the read buffer.
    fn fetch(&mut self, n: usize) -> Result<()> {
        let start = self.read_size;
        debug_assert!(start + n <= self.read_buffer.len());

        if n > self.direct_read_threshold {
            let chunk = self.transport.read_exact(n)?;
            if chunk.len() != n {
                return Err(TransferError::Transport(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("read_exact returned {} bytes, expected {}", chunk.len(), n),
                )));
            }
            self.read_buffer[start..start + n].copy_from_slice(&chunk);
            self.stats.direct_reads += 1;
        } else {
            let scratch = self.scratch.as_mut_slice();
            self.transport.read_into(scratch, n)?;
            self.read_buffer[start..start + n].copy_from_slice(&scratch[..n]);
        }

        self.read_size += n;
        Ok(())
    }
}

impl<T: Transport> Transfer for BufferedTransfer<'_, T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let length = dst.len();
        let mut copied = 0;

        while copied < length {
            if self.read_index == self.read_size && self.refill(length - copied)? == 0 {
                log::debug!(
                    "[xfer::buffered] transport exhausted after {} of {} bytes",
                    copied,
                    length
                );
                self.stats.bytes_read += copied as u64;
                return Err(TransferError::Exhausted {
                    requested: length,
                    delivered: copied,
                });
            }

            let n = (length - copied).min(self.read_size - self.read_index);
            dst[copied..copied + n]
                .copy_from_slice(&self.read_buffer[self.read_index..self.read_index + n]);
            self.read_index += n;
            copied += n;
            debug_assert!(self.read_index <= self.read_size);
            debug_assert!(self.read_size <= self.read_buffer.len());
        }

        self.stats.bytes_read += length as u64;
        Ok(length)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        let capacity = self.write_buffer.len();
        let mut rest = src;

        // Slice-wise copy; flush points are identical to byte-at-a-time.
        while !rest.is_empty() {
            let n = (capacity - self.write_index).min(rest.len());
            self.write_buffer[self.write_index..self.write_index + n].copy_from_slice(&rest[..n]);
            self.write_index += n;
            self.stats.bytes_written += n as u64;
            rest = &rest[n..];
            debug_assert!(self.write_index <= capacity);

            if self.write_index == capacity {
                self.flush()?;
            }
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_buffer[self.write_index] = byte;
        self.write_index += 1;
        self.stats.bytes_written += 1;
        if self.write_index == self.write_buffer.len() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.write_index == 0 {
            return Ok(());
        }

        // Reset first: after a failed write the pending bytes are gone.
        let pending = self.write_index;
        self.write_index = 0;
        self.transport.write(&self.write_buffer[..pending])?;
        self.stats.flushes += 1;
        log::trace!("[xfer::buffered] flushed {} bytes", pending);
        Ok(())
    }

    fn kind(&self) -> TransferKind {
        TransferKind::Buffered
    }

    fn stats(&self) -> TransferStats {
        self.stats
    }

    fn release(self: Box<Self>) {
        if self.write_index > 0 {
            log::debug!(
                "[xfer::buffered] released with {} unflushed bytes",
                self.write_index
            );
        }
    }
}
