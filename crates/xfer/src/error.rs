// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for transfers.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;

/// Errors surfaced by a [`Transfer`](crate::Transfer).
///
/// Transport errors are carried unmodified; nothing is retried internally.
/// After any error from `write` or `flush` the transfer must be considered
/// dead: the bytes it had buffered are gone.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The transport ran dry while bytes were still owed to a read.
    #[error("transport exhausted: {delivered} of {requested} bytes delivered")]
    Exhausted {
        /// Bytes the caller asked for.
        requested: usize,
        /// Bytes written into the destination before the transport ran dry.
        delivered: usize,
    },

    /// The transport itself reported an I/O error.
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),

    /// A frame or compressed envelope exceeded the configured maximum.
    #[error("frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge {
        /// Offending frame size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// The caller-supplied scratch region cannot hold a full refill.
    #[error("scratch region of {len} bytes is smaller than the {required}-byte read buffer")]
    ScratchTooSmall {
        /// Length of the supplied scratch region.
        len: usize,
        /// Read-buffer capacity it has to cover.
        required: usize,
    },

    /// Invalid transfer configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TransferError {
    /// True if the transport ran out of data mid-read.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TransferError::Exhausted { .. })
    }

    /// Kind of the underlying I/O error, if the transport failed.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            TransferError::Transport(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl From<TransferError> for io::Error {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Transport(e) => e,
            TransferError::Exhausted { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            TransferError::Config(_) | TransferError::ScratchTooSmall { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_keeps_kind() {
        let err = TransferError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::BrokenPipe));
        assert!(!err.is_exhausted());

        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_exhausted_maps_to_unexpected_eof() {
        let err = TransferError::Exhausted {
            requested: 8,
            delivered: 3,
        };
        assert!(err.is_exhausted());
        assert_eq!(err.io_kind(), None);
        assert_eq!(err.to_string(), "transport exhausted: 3 of 8 bytes delivered");

        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_frame_too_large_maps_to_invalid_data() {
        let err = TransferError::FrameTooLarge { size: 10, max: 4 };
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }
}
