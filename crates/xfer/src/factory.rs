// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construction of transfers.
//!
//! Callers get a `Box<dyn Transfer>` and never name the concrete backend, so
//! a protocol layer can be pointed at a different strategy without changing
//! the protocol code.
//! Tear-down is [`Transfer::release`], which drops owned buffers only.

use crate::config::TransferConfig;
use crate::error::Result;
use crate::transfer::{
    BufferedTransfer, CompressedTransfer, FramedTransfer, Transfer, TransferKind,
    UnbufferedTransfer,
};
use crate::transport::Transport;

/// Create a buffered transfer over `transport` using the caller's scratch
/// region and the reference capacities.
///
/// `scratch` must hold at least [`DEFAULT_READ_CAPACITY`](crate::DEFAULT_READ_CAPACITY)
/// bytes. Both `transport` and `scratch` may be borrowed; the transfer
/// never outlives them.
pub fn create<'s, T>(transport: T, scratch: &'s mut [u8]) -> Result<Box<dyn Transfer + 's>>
where
    T: Transport + 's,
{
    Ok(Box::new(BufferedTransfer::new(transport, scratch)?))
}

/// Build the transfer selected by `config.kind`.
///
/// The buffered backend allocates its own scratch region of
/// `config.scratch_capacity` bytes.
pub fn build<'a, T>(transport: T, config: &TransferConfig) -> Result<Box<dyn Transfer + 'a>>
where
    T: Transport + 'a,
{
    config.validate()?;

    let transfer: Box<dyn Transfer + 'a> = match config.kind {
        TransferKind::Buffered => Box::new(BufferedTransfer::with_owned_scratch(transport, config)?),
        TransferKind::Unbuffered => Box::new(UnbufferedTransfer::new(transport)),
        TransferKind::Framed => Box::new(FramedTransfer::with_max_frame_size(
            transport,
            config.max_frame_size,
        )),
        TransferKind::Compressed => Box::new(
            CompressedTransfer::new(transport, config.compression.clone())?
                .with_max_frame_size(config.max_frame_size),
        ),
    };

    log::debug!("[xfer::factory] built {} transfer", config.kind);
    Ok(transfer)
}
