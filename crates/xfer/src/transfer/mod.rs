// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transfer interface and its backends.
//!
//! The protocol layer talks to a [`Transfer`] and nothing else; which
//! strategy sits behind it is decided at construction time:
//!
//! | Kind         | Reads                         | Writes                       |
//! |--------------|-------------------------------|------------------------------|
//! | `Buffered`   | refills a read-ahead buffer   | write-ahead, flush when full |
//! | `Unbuffered` | straight from the transport   | straight to the transport    |
//! | `Framed`     | one length-prefixed frame     | one frame per flush          |
//! | `Compressed` | one compressed envelope       | one envelope per flush       |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

mod bridge;
mod buffered;
mod compressed;
mod framed;
mod unbuffered;

pub use bridge::TransferIo;
pub use buffered::{BufferedTransfer, RefillPolicy};
pub use compressed::{CompressedTransfer, CompressionAlgo, CompressionConfig, ENVELOPE_HEADER_SIZE};
pub use framed::{encode_frame, FramedTransfer, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE};
pub use unbuffered::UnbufferedTransfer;

/// Exact-read / buffered-write / explicit-flush contract.
///
/// Operations on one instance are strictly ordered and run to completion on
/// the caller's thread. Bytes passed to `write` are only guaranteed to reach
/// the transport after `flush` returns `Ok`.
pub trait Transfer {
    /// Fill `dst` completely.
    ///
    /// Returns `dst.len()`, or fails; a short read is never reported as
    /// success. An empty `dst` returns `Ok(0)` without touching the
    /// transport.
    fn read(&mut self, dst: &mut [u8]) -> Result<usize>;

    /// Accept `src` for eventual transmission.
    fn write(&mut self, src: &[u8]) -> Result<()>;

    /// Push everything accepted so far to the transport.
    fn flush(&mut self) -> Result<()>;

    /// Which strategy this is.
    fn kind(&self) -> TransferKind;

    /// Counters since construction.
    fn stats(&self) -> TransferStats;

    /// Release owned buffers.
    ///
    /// Does not flush. Unflushed bytes are discarded. The transport and any
    /// borrowed scratch region are left untouched.
    fn release(self: Box<Self>) {}

    /// Read a single byte.
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read(&mut byte)?;
        Ok(byte[0])
    }

    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write(&[byte])
    }
}

impl<X: Transfer + ?Sized> Transfer for &mut X {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        (**self).read(dst)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        (**self).write(src)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn kind(&self) -> TransferKind {
        (**self).kind()
    }

    fn stats(&self) -> TransferStats {
        (**self).stats()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }
}

impl<X: Transfer + ?Sized> Transfer for Box<X> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        (**self).read(dst)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        (**self).write(src)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn kind(&self) -> TransferKind {
        (**self).kind()
    }

    fn stats(&self) -> TransferStats {
        (**self).stats()
    }

    fn release(self: Box<Self>) {
        X::release(*self);
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }
}

/// Transfer strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    /// Fixed read-ahead and write-ahead buffers.
    #[default]
    Buffered,
    /// Pass-through, every call hits the transport.
    Unbuffered,
    /// Length-prefixed frames, one per flush.
    Framed,
    /// Compressed envelopes, one per flush.
    Compressed,
}

impl TransferKind {
    /// All kinds, in declaration order.
    pub const ALL: [TransferKind; 4] = [
        TransferKind::Buffered,
        TransferKind::Unbuffered,
        TransferKind::Framed,
        TransferKind::Compressed,
    ];

    /// Lowercase name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Buffered => "buffered",
            TransferKind::Unbuffered => "unbuffered",
            TransferKind::Framed => "framed",
            TransferKind::Compressed => "compressed",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransferKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TransferKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown transfer kind: {}", s))
    }
}

/// Transfer counters.
///
/// `refills` counts transport fetches made on behalf of reads (buffer
/// refills, frames or envelopes received); `flushes` counts transport writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Fetches from the transport.
    pub refills: u64,
    /// Refills served by `read_exact` instead of the scratch region.
    pub direct_reads: u64,
    /// Writes to the transport.
    pub flushes: u64,
    /// Bytes delivered to callers of `read`.
    pub bytes_read: u64,
    /// Bytes accepted from callers of `write`.
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_and_display() {
        for kind in TransferKind::ALL {
            assert_eq!(kind.to_string().parse::<TransferKind>().unwrap(), kind);
        }
        assert_eq!("FRAMED".parse::<TransferKind>().unwrap(), TransferKind::Framed);
        assert!("zipped".parse::<TransferKind>().is_err());
        assert_eq!(TransferKind::default(), TransferKind::Buffered);
    }
}
