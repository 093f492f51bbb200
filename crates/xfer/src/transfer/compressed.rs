// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compressed transfer.
//!
//! Each flush compresses everything written since the previous flush and
//! sends it as one envelope:
//!
//! ```text
//! +---------------------+-------------------+------------------+
//! | compressed_len (4B) | original_len (4B) | compressed bytes |
//! +---------------------+-------------------+------------------+
//! ```
//!
//! Both lengths are big-endian `u32`. The original length lets the reader
//! size its output up front and verify the result.
//!
//! # Compression Algorithms
//!
//! - **Deflate** (always available via flate2): good ratio, moderate speed
//! - **LZ4** (feature `lz4`): fast, suited to latency-sensitive links

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::{Transfer, TransferKind, TransferStats};
use crate::config::ConfigError;
use crate::error::{Result, TransferError};
use crate::transfer::DEFAULT_MAX_FRAME_SIZE;
use crate::transport::Transport;

/// Envelope header size (two `u32` lengths).
pub const ENVELOPE_HEADER_SIZE: usize = 8;

/// Compression algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgo {
    /// Deflate via flate2.
    #[default]
    Deflate,
    /// LZ4 block format via lz4_flex (requires the `lz4` feature).
    Lz4,
}

impl CompressionAlgo {
    /// True if support for this algorithm is compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            CompressionAlgo::Deflate => true,
            CompressionAlgo::Lz4 => cfg!(feature = "lz4"),
        }
    }
}

/// Compression configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Algorithm to use.
    #[serde(default)]
    pub algo: CompressionAlgo,

    /// Deflate compression level (1-9). Ignored by LZ4.
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    6
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            algo: CompressionAlgo::default(),
            level: default_level(),
        }
    }
}

impl CompressionConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(1..=9).contains(&self.level) {
            return Err(ConfigError::Invalid(format!(
                "compression level {} out of range 1-9",
                self.level
            )));
        }
        if !self.algo.is_available() {
            return Err(ConfigError::Invalid(format!(
                "{:?} compression requires the `lz4` feature",
                self.algo
            )));
        }
        Ok(())
    }
}

/// [`Transfer`] that compresses each flush into one envelope.
#[derive(Debug)]
pub struct CompressedTransfer<T> {
    transport: T,
    config: CompressionConfig,
    pending: Vec<u8>,
    inbound: Vec<u8>,
    inbound_pos: usize,
    max_frame_size: usize,
    wire_bytes_out: u64,
    stats: TransferStats,
}

impl<T: Transport> CompressedTransfer<T> {
    /// Wrap `transport`.
    pub fn new(transport: T, config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            pending: Vec::new(),
            inbound: Vec::new(),
            inbound_pos: 0,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            wire_bytes_out: 0,
            stats: TransferStats::default(),
        })
    }

    /// Reject envelopes whose compressed or original size exceeds `max`.
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max.min(u32::MAX as usize);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Envelope bytes (headers included) written to the transport so far.
    pub fn wire_bytes_out(&self) -> u64 {
        self.wire_bytes_out
    }

    /// Borrow the transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Hand back the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_frame_size {
            return Err(TransferError::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.config.algo {
            CompressionAlgo::Deflate => {
                use flate2::write::DeflateEncoder;
                use flate2::Compression;

                let mut encoder = DeflateEncoder::new(
                    Vec::with_capacity(data.len() / 2),
                    Compression::new(self.config.level),
                );
                encoder
                    .write_all(data)
                    .map_err(|e| TransferError::Compression(e.to_string()))?;
                encoder
                    .finish()
                    .map_err(|e| TransferError::Compression(e.to_string()))
            }
            CompressionAlgo::Lz4 => lz4_compress(data),
        }
    }

    fn decompress(&self, data: &[u8], original_len: usize) -> Result<Vec<u8>> {
        let output = match self.config.algo {
            CompressionAlgo::Deflate => {
                use flate2::read::DeflateDecoder;

                // One byte past the declared length is enough to detect a mismatch.
                let mut output = Vec::with_capacity(original_len);
                DeflateDecoder::new(data)
                    .take(original_len as u64 + 1)
                    .read_to_end(&mut output)
                    .map_err(|e| TransferError::Compression(e.to_string()))?;
                output
            }
            CompressionAlgo::Lz4 => lz4_decompress(data, original_len)?,
        };

        if output.len() != original_len {
            return Err(TransferError::Compression(format!(
                "length mismatch: expected {}, got {}",
                original_len,
                output.len()
            )));
        }
        Ok(output)
    }

    /// Load and decompress the next envelope. `false` at a clean end of stream.
    fn next_envelope(&mut self) -> Result<bool> {
        loop {
            if self.transport.available()? == 0 {
                return Ok(false);
            }

            let mut header = [0u8; ENVELOPE_HEADER_SIZE];
            self.transport.read_into(&mut header, ENVELOPE_HEADER_SIZE)?;
            let compressed_len =
                u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let original_len =
                u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
            self.check_size(compressed_len)?;
            self.check_size(original_len)?;

            let body = self.transport.read_exact(compressed_len)?;
            self.inbound_pos = 0;
            self.inbound = self.decompress(&body, original_len)?;
            if self.inbound.is_empty() {
                continue;
            }

            self.stats.refills += 1;
            log::trace!(
                "[xfer::compressed] envelope {} -> {} bytes",
                compressed_len,
                original_len
            );
            return Ok(true);
        }
    }
}

#[cfg(feature = "lz4")]
fn lz4_compress(data: &[u8]) -> Result<Vec<u8>> {
    Ok(lz4_flex::compress(data))
}

#[cfg(not(feature = "lz4"))]
fn lz4_compress(_data: &[u8]) -> Result<Vec<u8>> {
    Err(TransferError::Compression("lz4 support not compiled in".into()))
}

#[cfg(feature = "lz4")]
fn lz4_decompress(data: &[u8], original_len: usize) -> Result<Vec<u8>> {
    lz4_flex::decompress(data, original_len).map_err(|e| TransferError::Compression(e.to_string()))
}

#[cfg(not(feature = "lz4"))]
fn lz4_decompress(_data: &[u8], _original_len: usize) -> Result<Vec<u8>> {
    Err(TransferError::Compression("lz4 support not compiled in".into()))
}

impl<T: Transport> Transfer for CompressedTransfer<T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let length = dst.len();
        let mut copied = 0;

        while copied < length {
            if self.inbound_pos == self.inbound.len() {
                if !self.next_envelope()? {
                    self.stats.bytes_read += copied as u64;
                    return Err(TransferError::Exhausted {
                        requested: length,
                        delivered: copied,
                    });
                }
                continue;
            }

            let n = (length - copied).min(self.inbound.len() - self.inbound_pos);
            dst[copied..copied + n]
                .copy_from_slice(&self.inbound[self.inbound_pos..self.inbound_pos + n]);
            self.inbound_pos += n;
            copied += n;
        }

        self.stats.bytes_read += length as u64;
        Ok(length)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(src);
        self.stats.bytes_written += src.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let original_len = self.pending.len();
        let pending = std::mem::take(&mut self.pending);
        self.check_size(original_len)?;
        let compressed = self.compress(&pending)?;
        self.check_size(compressed.len())?;

        let mut envelope = Vec::with_capacity(ENVELOPE_HEADER_SIZE + compressed.len());
        envelope.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        envelope.extend_from_slice(&(original_len as u32).to_be_bytes());
        envelope.extend_from_slice(&compressed);
        self.transport.write(&envelope)?;

        self.stats.flushes += 1;
        self.wire_bytes_out += envelope.len() as u64;
        log::trace!(
            "[xfer::compressed] flushed {} -> {} bytes ({:?})",
            original_len,
            compressed.len(),
            self.config.algo
        );
        Ok(())
    }

    fn kind(&self) -> TransferKind {
        TransferKind::Compressed
    }

    fn stats(&self) -> TransferStats {
        self.stats
    }
}
