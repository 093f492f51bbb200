// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pass-through transfer: every call goes straight to the transport.

use super::{Transfer, TransferKind, TransferStats};
use crate::error::Result;
use crate::transport::Transport;

/// [`Transfer`] without any buffering.
#[derive(Debug)]
pub struct UnbufferedTransfer<T> {
    transport: T,
    stats: TransferStats,
}

impl<T: Transport> UnbufferedTransfer<T> {
    /// Wrap `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            stats: TransferStats::default(),
        }
    }

    /// Borrow the transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Hand back the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: Transport> Transfer for UnbufferedTransfer<T> {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }
        let n = dst.len();
        self.transport.read_into(dst, n)?;
        self.stats.refills += 1;
        self.stats.bytes_read += n as u64;
        Ok(n)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        self.transport.write(src)?;
        self.stats.flushes += 1;
        self.stats.bytes_written += src.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> TransferKind {
        TransferKind::Unbuffered
    }

    fn stats(&self) -> TransferStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_each_write_is_one_transport_call() {
        let mut transfer = UnbufferedTransfer::new(MemoryTransport::new());
        transfer.write(b"ab").unwrap();
        transfer.write(b"").unwrap();
        transfer.write(b"cde").unwrap();
        transfer.flush().unwrap();

        assert_eq!(transfer.get_ref().write_sizes(), &[2, 3]);
        assert_eq!(transfer.stats().flushes, 2);
    }

    #[test]
    fn test_read_skips_available() {
        let mut transfer = UnbufferedTransfer::new(MemoryTransport::from_bytes(b"xyz".to_vec()));
        let mut dst = [0u8; 2];
        transfer.read(&mut dst).unwrap();
        assert_eq!(&dst, b"xy");
        assert_eq!(transfer.read(&mut []).unwrap(), 0);

        let stats = transfer.into_inner().stats();
        assert_eq!(stats.available_calls, 0);
        assert_eq!(stats.read_into_calls, 1);
    }

    #[test]
    fn test_short_transport_is_a_transport_failure() {
        let mut transfer = UnbufferedTransfer::new(MemoryTransport::from_bytes(vec![1]));
        let err = transfer.read(&mut [0u8; 2]).unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::UnexpectedEof));
    }
}
