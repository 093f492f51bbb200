// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Backend substitution tests
//!
//! The same length-prefixed message protocol runs unchanged over every
//! transfer kind, over memory and over real files.

use std::io::{self, Read, Seek, SeekFrom, Write};

use xfer::{
    build, MemoryTransport, Pipe, StreamTransport, Transfer, TransferConfig, TransferIo,
    TransferKind,
};

/// Tiny protocol: `[len: u16 LE][bytes]` per message, flush after each batch.
fn encode_messages(transfer: &mut dyn Transfer, messages: &[Vec<u8>]) {
    for message in messages {
        transfer
            .write(&(message.len() as u16).to_le_bytes())
            .unwrap();
        transfer.write(message).unwrap();
    }
    transfer.flush().unwrap();
}

fn decode_messages(transfer: &mut dyn Transfer, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let mut len = [0u8; 2];
            transfer.read(&mut len).unwrap();
            let mut message = vec![0u8; u16::from_le_bytes(len) as usize];
            transfer.read(&mut message).unwrap();
            message
        })
        .collect()
}

fn sample_messages() -> Vec<Vec<u8>> {
    let mut rng = fastrand::Rng::with_seed(99);
    (0..50)
        .map(|_| {
            let len = rng.usize(0..3000);
            let fill = rng.u8(..);
            vec![fill; len]
        })
        .collect()
}

#[test]
fn every_kind_round_trips_over_memory() {
    let messages = sample_messages();
    for kind in TransferKind::ALL {
        let mut transport = MemoryTransport::new();
        {
            let mut writer = build(&mut transport, &TransferConfig::for_kind(kind)).unwrap();
            encode_messages(&mut *writer, &messages);
            writer.release();
        }
        {
            let mut reader = build(&mut transport, &TransferConfig::for_kind(kind)).unwrap();
            assert_eq!(decode_messages(&mut *reader, messages.len()), messages, "{}", kind);
            reader.release();
        }
        assert!(transport.is_empty(), "{} left bytes behind", kind);
    }
}

#[test]
fn every_kind_round_trips_through_a_file() {
    let messages = sample_messages();
    for kind in TransferKind::ALL {
        let mut file = tempfile::tempfile().unwrap();
        {
            let mut transport = StreamTransport::new(&mut file);
            let mut writer = build(&mut transport, &TransferConfig::for_kind(kind)).unwrap();
            encode_messages(&mut *writer, &messages);
        }

        file.seek(SeekFrom::Start(0)).unwrap();
        let mut transport = StreamTransport::new(&mut file);
        let mut reader = build(&mut transport, &TransferConfig::for_kind(kind)).unwrap();
        assert_eq!(decode_messages(&mut *reader, messages.len()), messages, "{}", kind);
    }
}

#[test]
fn framed_wire_format_is_length_prefixed() {
    let mut transport = MemoryTransport::new();
    let mut writer = build(&mut transport, &TransferConfig::for_kind(TransferKind::Framed)).unwrap();
    writer.write(b"abc").unwrap();
    writer.flush().unwrap();
    writer.write(b"de").unwrap();
    writer.flush().unwrap();
    writer.release();

    let mut expected = xfer::encode_frame(b"abc");
    expected.extend(xfer::encode_frame(b"de"));
    assert_eq!(transport.unread(), &expected[..]);
}

#[test]
fn compressed_shrinks_repetitive_payloads() {
    let payload = vec![b'x'; 64 * 1024];

    let mut plain = MemoryTransport::new();
    let mut compressed = MemoryTransport::new();
    for (transport, kind) in [
        (&mut plain, TransferKind::Framed),
        (&mut compressed, TransferKind::Compressed),
    ] {
        let mut writer = build(transport, &TransferConfig::for_kind(kind)).unwrap();
        writer.write(&payload).unwrap();
        writer.flush().unwrap();
    }

    assert!(compressed.len() * 10 < plain.len());
}

#[test]
fn config_from_toml_drives_construction() {
    let config = TransferConfig::from_toml_str(
        r#"
kind = "buffered"
write_capacity = 64
read_capacity = 32
scratch_capacity = 32
refill_policy = "demand"
"#,
    )
    .unwrap();

    let mut transport = MemoryTransport::new();
    let mut transfer = build(&mut transport, &config).unwrap();
    transfer.write(&[1u8; 100]).unwrap();
    transfer.flush().unwrap();
    transfer.release();

    assert_eq!(transport.write_sizes(), &[64, 36]);
}

#[test]
fn io_copy_through_transfer_io() {
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 97) as u8).collect();

    for kind in [
        TransferKind::Buffered,
        TransferKind::Framed,
        TransferKind::Compressed,
    ] {
        let mut transport = MemoryTransport::new();
        {
            let writer = build(&mut transport, &TransferConfig::for_kind(kind)).unwrap();
            let mut sink = TransferIo::new(writer);
            io::copy(&mut &data[..], &mut sink).unwrap();
            sink.flush().unwrap();
        }

        let reader = build(&mut transport, &TransferConfig::for_kind(kind)).unwrap();
        let mut out = Vec::new();
        TransferIo::new(reader).read_to_end(&mut out).unwrap();
        assert_eq!(out, data, "{}", kind);
    }
}

#[test]
fn stream_transport_over_pipe() {
    let input = io::Cursor::new(xfer::encode_frame(b"from stdin"));
    let mut transport = StreamTransport::new(Pipe::new(input, Vec::new()));
    {
        let mut transfer =
            build(&mut transport, &TransferConfig::for_kind(TransferKind::Framed)).unwrap();
        let mut message = [0u8; 10];
        transfer.read(&mut message).unwrap();
        assert_eq!(&message, b"from stdin");
        transfer.write(b"reply").unwrap();
        transfer.flush().unwrap();
    }

    let (_, output) = transport.into_inner().into_parts();
    assert_eq!(output, xfer::encode_frame(b"reply"));
}
