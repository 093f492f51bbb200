// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! xfer-cat - Copy bytes through an xfer transfer backend
//!
//! `encode` pushes raw input through the write side of a transfer (framing,
//! compression, ...); `decode` pulls it back out through the read side.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use xfer::{
    build, Pipe, RefillPolicy, StreamTransport, Transfer, TransferConfig, TransferIo,
    TransferKind,
};

#[derive(Parser, Debug)]
#[command(name = "xfer-cat")]
#[command(version)]
#[command(about = "Copy bytes through a buffered, framed or compressed transfer")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    transfer: TransferArgs,

    /// Print transfer counters to stderr when done
    #[arg(short, long, global = true)]
    stats: bool,
}

#[derive(Args, Debug)]
struct TransferArgs {
    /// TOML transfer configuration
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Transfer kind (buffered, unbuffered, framed, compressed)
    #[arg(short, long, global = true)]
    kind: Option<TransferKind>,

    /// Deflate level for the compressed kind (1-9)
    #[arg(long, global = true)]
    level: Option<u32>,

    /// Keep refilling until a read's outstanding bytes are buffered
    #[arg(long, global = true)]
    demand: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Raw input -> transfer write side -> output
    Encode {
        #[command(flatten)]
        files: IoArgs,

        /// Flush after every chunk of this many bytes (one frame/envelope each)
        #[arg(long, default_value = "65536")]
        chunk: usize,
    },

    /// Input -> transfer read side -> raw output
    Decode {
        #[command(flatten)]
        files: IoArgs,
    },
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input file (stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl IoArgs {
    fn open_input(&self) -> Result<Box<dyn Read>> {
        Ok(match &self.input {
            Some(path) => Box::new(BufReader::new(
                File::open(path).with_context(|| format!("opening {}", path.display()))?,
            )),
            None => Box::new(io::stdin().lock()),
        })
    }

    fn open_output(&self) -> Result<Box<dyn Write>> {
        Ok(match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            )),
            None => Box::new(io::stdout().lock()),
        })
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(&cli.transfer)?;
    log::debug!("using {:?}", config);

    let stats = match &cli.command {
        Command::Encode { files, chunk } => encode(&config, files, *chunk)?,
        Command::Decode { files } => decode(&config, files)?,
    };

    if cli.stats {
        eprintln!(
            "{}: {} bytes in, {} bytes out, {} refills ({} direct), {} flushes",
            config.kind,
            stats.bytes_read,
            stats.bytes_written,
            stats.refills,
            stats.direct_reads,
            stats.flushes
        );
    }
    Ok(())
}

fn load_config(args: &TransferArgs) -> Result<TransferConfig> {
    let mut config = match &args.config {
        Some(path) => TransferConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TransferConfig::default(),
    };

    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    if let Some(level) = args.level {
        config.compression.level = level;
    }
    if args.demand {
        config.refill_policy = RefillPolicy::Demand;
    }

    config.validate()?;
    Ok(config)
}

fn encode(config: &TransferConfig, files: &IoArgs, chunk: usize) -> Result<xfer::TransferStats> {
    if chunk == 0 {
        bail!("--chunk must be non-zero");
    }

    let mut input = files.open_input()?;
    let transport = StreamTransport::new(Pipe::new(io::empty(), files.open_output()?));
    let mut transfer = build(transport, config)?;

    let mut buf = vec![0u8; chunk];
    loop {
        let n = fill(&mut input, &mut buf)?;
        if n == 0 {
            break;
        }
        transfer.write(&buf[..n])?;
        transfer.flush()?;
        if n < chunk {
            break;
        }
    }

    let stats = transfer.stats();
    transfer.release();
    Ok(stats)
}

fn decode(config: &TransferConfig, files: &IoArgs) -> Result<xfer::TransferStats> {
    if config.kind == TransferKind::Unbuffered {
        bail!("unbuffered transfers have no end-of-stream; decode with --kind buffered");
    }

    let transport = StreamTransport::new(Pipe::new(files.open_input()?, io::sink()));
    let mut reader = TransferIo::new(build(transport, config)?);
    let mut output = files.open_output()?;

    io::copy(&mut reader, &mut output).context("decoding")?;
    output.flush()?;

    let transfer = reader.into_inner();
    let stats = transfer.stats();
    transfer.release();
    Ok(stats)
}

/// Read until `buf` is full or the input ends.
fn fill(input: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
