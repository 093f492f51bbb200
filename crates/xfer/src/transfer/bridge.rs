// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `std::io` adapter over a [`Transfer`].
//!
//! Lets code written against `Read`/`Write` (serde writers, `io::copy`)
//! drive a transfer. `read` keeps the exact-read contract underneath: a
//! request is served in full, or cut short only at end of stream, where the
//! bytes delivered before exhaustion are returned as a short count.
//!
//! The unbuffered transfer has no notion of end of stream; reading past its
//! data surfaces the transport's `UnexpectedEof`.

use std::io;

use super::Transfer;
use crate::error::TransferError;

/// Wraps a [`Transfer`] as `io::Read + io::Write`.
#[derive(Debug)]
pub struct TransferIo<X> {
    inner: X,
}

impl<X: Transfer> TransferIo<X> {
    /// Wrap `inner`.
    pub fn new(inner: X) -> Self {
        Self { inner }
    }

    /// Borrow the transfer.
    pub fn get_ref(&self) -> &X {
        &self.inner
    }

    /// Mutably borrow the transfer.
    pub fn get_mut(&mut self) -> &mut X {
        &mut self.inner
    }

    /// Unwrap. Does not flush.
    pub fn into_inner(self) -> X {
        self.inner
    }
}

impl<X: Transfer> io::Read for TransferIo<X> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(TransferError::Exhausted { delivered, .. }) => Ok(delivered),
            Err(e) => Err(e.into()),
        }
    }
}

impl<X: Transfer> io::Write for TransferIo<X> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(io::Error::from)
    }
}
