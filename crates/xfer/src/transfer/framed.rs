// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefix framed transfer.
//!
//! Everything written between two flushes travels as one frame:
//!
//! ```text
//! +----------------+-------------------+
//! | Length (4B BE) | Payload           |
//! +----------------+-------------------+
//! ```
//!
//! The length field is a 32-bit big-endian integer giving the payload size
//! (header excluded). Readers see a plain byte stream; a single `read` may
//! span several frames. Zero-length frames are skipped.

use super::{Transfer, TransferKind, TransferStats};
use crate::error::{Result, TransferError};
use crate::transport::Transport;

/// Frame header size (4 bytes for length).
pub const FRAME_HEADER_SIZE: usize = 4;

/// Default maximum payload size (16 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Encode `payload` as a single frame: `[length: u32 BE][payload]`.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// [`Transfer`] that wraps each flush in a length-prefixed frame.
#[derive(Debug)]
pub struct FramedTransfer<T> {
    transport: T,
    /// Header placeholder followed by the pending payload
    outgoing: Vec<u8>,
    /// Payload of the frame being consumed
    incoming: Vec<u8>,
    incoming_pos: usize,
    /// Anti-OOM bound, applied in both directions
    max_frame_size: usize,
    stats: TransferStats,
}

impl<T: Transport> FramedTransfer<T> {
    /// Wrap `transport` with the default maximum frame size.
    pub fn new(transport: T) -> Self {
        Self::with_max_frame_size(transport, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Wrap `transport`, rejecting frames larger than `max_frame_size`.
    pub fn with_max_frame_size(transport: T, max_frame_size: usize) -> Self {
        Self {
            transport,
            outgoing: vec![0u8; FRAME_HEADER_SIZE],
            incoming: Vec::new(),
            incoming_pos: 0,
            max_frame_size: max_frame_size.min(u32::MAX as usize),
            stats: TransferStats::default(),
        }
    }

    /// Bytes written since the last flush.
    pub fn pending(&self) -> usize {
        self.outgoing.len() - FRAME_HEADER_SIZE
    }

    /// Maximum payload size.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Borrow the transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Hand back the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Load the next non-empty frame. `false` at a clean end of stream.
    fn next_frame(&mut self) -> Result<bool> {
        loop {
            if self.transport.available()? == 0 {
                return Ok(false);
            }

            let mut header = [0u8; FRAME_HEADER_SIZE];
            self.transport.read_into(&mut header, FRAME_HEADER_SIZE)?;
            let len = u32::from_be_bytes(header) as usize;
            if len > self.max_frame_size {
                log::debug!(
                    "[xfer::framed] rejecting {} byte frame (max {})",
                    len,
                    self.max_frame_size
                );
                return Err(TransferError::FrameTooLarge {
                    size: len,
                    max: self.max_frame_size,
                });
            }

            self.incoming.clear();
            self.incoming_pos = 0;
            if len == 0 {
                continue;
            }

            self.incoming.resize(len, 0);
            self.transport.read_into(&mut self.incoming, len)?;
            self.stats.refills += 1;
            log::trace!("[xfer::framed] received {} byte frame", len);
            return Ok(true);
        }
    }
}

impl<T: Transport> Transfer for FramedTransfer<T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let length = dst.len();
        let mut copied = 0;

        while copied < length {
            if self.incoming_pos == self.incoming.len() {
                if !self.next_frame()? {
                    self.stats.bytes_read += copied as u64;
                    return Err(TransferError::Exhausted {
                        requested: length,
                        delivered: copied,
                    });
                }
                continue;
            }

            let n = (length - copied).min(self.incoming.len() - self.incoming_pos);
            dst[copied..copied + n]
                .copy_from_slice(&self.incoming[self.incoming_pos..self.incoming_pos + n]);
            self.incoming_pos += n;
            copied += n;
        }

        self.stats.bytes_read += length as u64;
        Ok(length)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        self.outgoing.extend_from_slice(src);
        self.stats.bytes_written += src.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let len = self.pending();
        if len == 0 {
            return Ok(());
        }
        if len > self.max_frame_size {
            self.outgoing.truncate(FRAME_HEADER_SIZE);
            return Err(TransferError::FrameTooLarge {
                size: len,
                max: self.max_frame_size,
            });
        }

        self.outgoing[..FRAME_HEADER_SIZE].copy_from_slice(&(len as u32).to_be_bytes());
        let result = self.transport.write(&self.outgoing);
        self.outgoing.truncate(FRAME_HEADER_SIZE);
        result?;

        self.stats.flushes += 1;
        log::trace!("[xfer::framed] sent {} byte frame", len);
        Ok(())
    }

    fn kind(&self) -> TransferKind {
        TransferKind::Framed
    }

    fn stats(&self) -> TransferStats {
        self.stats
    }
}
