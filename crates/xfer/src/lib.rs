// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # xfer - Buffered transfer layer for byte-stream protocols
//!
//! Sits between a serialization protocol and the transport that carries its
//! bytes. The protocol sees one contract (exact read, buffered write,
//! explicit flush) regardless of how the bytes actually move.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Protocol (encoder / decoder)           |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Transfer (Buffered / Unbuffered /      |
//! |            Framed / Compressed)         |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Transport (socket / file / memory)     |
//! +-----------------------------------------+
//! ```
//!
//! ## Example
//!
//! ```
//! use xfer::{create, MemoryTransport, Transfer};
//!
//! let mut transport = MemoryTransport::from_bytes(vec![1, 2, 3, 4]);
//! let mut scratch = vec![0u8; xfer::DEFAULT_SCRATCH_CAPACITY];
//! let mut transfer = create(&mut transport, &mut scratch).unwrap();
//!
//! let mut head = [0u8; 3];
//! transfer.read(&mut head).unwrap();
//! assert_eq!(head, [1, 2, 3]);
//! ```
//!
//! ## Feature Flags
//!
//! - `lz4` -- LZ4 codec for [`CompressedTransfer`] (deflate is always available)

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Configuration (programmatic and TOML)
pub mod config;

/// Error types
pub mod error;

/// Construction of transfers from a transport
pub mod factory;

/// Transfer interface and its backends
pub mod transfer;

/// Transport contract and reference transports
pub mod transport;

pub use crate::config::{ConfigError, TransferConfig};
pub use crate::error::{Result, TransferError};
pub use crate::factory::{build, create};
pub use crate::transfer::{
    encode_frame, BufferedTransfer, CompressedTransfer, CompressionAlgo, CompressionConfig,
    FramedTransfer, RefillPolicy, Transfer, TransferIo, TransferKind, TransferStats,
    UnbufferedTransfer, DEFAULT_MAX_FRAME_SIZE,
};
pub use crate::transport::{MemoryTransport, Pipe, StreamTransport, Transport, TransportStats};

/// Reference write-buffer capacity (`W`).
pub const DEFAULT_WRITE_CAPACITY: usize = 4096;

/// Reference read-buffer capacity (`R`).
pub const DEFAULT_READ_CAPACITY: usize = 4096;

/// Reference scratch-region capacity. Must be at least [`DEFAULT_READ_CAPACITY`].
pub const DEFAULT_SCRATCH_CAPACITY: usize = 8192;

/// Version of xfer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
