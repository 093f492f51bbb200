// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport contract consumed by the transfers.
//!
//! A transport is whatever actually moves bytes: a socket, a file, an
//! in-memory FIFO. Transfers only ever call the four operations below.
//!
//! ## Design Principles
//!
//! - **Blocking I/O** - every call may block; there is no readiness API
//! - **Exact reads** - `read_into` and `read_exact` deliver `n` bytes or fail
//! - **Errors untouched** - failures are plain `io::Error`, passed through as-is

use std::io;

mod memory;
mod stream;

pub use memory::{MemoryTransport, TransportStats};
pub use stream::{Pipe, StreamTransport, DEFAULT_LOOKAHEAD};

/// Byte source/sink underneath a transfer.
pub trait Transport {
    /// Bytes retrievable right now without waiting on a new source read.
    ///
    /// Best-effort: `0` from a live transport means "nothing yet", from a
    /// closed one it means end of stream. Transfers treat `0` as the latter.
    fn available(&mut self) -> io::Result<usize>;

    /// Fill the first `n` bytes of `scratch` with fresh input.
    ///
    /// Blocks until all `n` bytes arrive. Fails if fewer than `n` bytes are
    /// obtainable or if `n > scratch.len()`. Returns `n`.
    fn read_into(&mut self, scratch: &mut [u8], n: usize) -> io::Result<usize>;

    /// Return a freshly allocated sequence of exactly `n` bytes.
    ///
    /// Same blocking and failure semantics as [`Transport::read_into`].
    fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_into(&mut buf, n)?;
        Ok(buf)
    }

    /// Transmit `bytes`.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    fn read_into(&mut self, scratch: &mut [u8], n: usize) -> io::Result<usize> {
        (**self).read_into(scratch, n)
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        (**self).read_exact(n)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    fn read_into(&mut self, scratch: &mut [u8], n: usize) -> io::Result<usize> {
        (**self).read_into(scratch, n)
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        (**self).read_exact(n)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }
}

/// Reject `read_into` requests that would overrun the destination.
pub(crate) fn check_scratch(scratch: &[u8], n: usize) -> io::Result<()> {
    if n > scratch.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "read of {} bytes does not fit a {}-byte scratch region",
                n,
                scratch.len()
            ),
        ));
    }
    Ok(())
}
