//! xx - Hex dump
//!
//! Unix-style hex dumper for files and pipes.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::Level;

use xxfb::dump::{self, DEFAULT_COLUMNS, DEFAULT_GROUP, DumpError, DumpOptions, Dumper};
use xxfb::logging;

/// Hex dump a file or standard input
#[derive(Parser, Debug)]
#[command(name = "xx")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "xx [-afk] [-c N] [-g N] [FILE]")]
struct Args {
    /// Toggle the ASCII sidebar (on by default)
    #[arg(short = 'a', long = "ascii", action = ArgAction::Count)]
    ascii: u8,

    /// Bytes per row
    #[arg(short = 'c', long = "columns", value_name = "N", default_value_t = DEFAULT_COLUMNS, overrides_with = "columns")]
    columns: usize,

    /// Toggle the offset column (on by default)
    #[arg(short = 'f', long = "offset", action = ArgAction::Count)]
    offset: u8,

    /// Extra space every N bytes, 0 for none
    #[arg(short = 'g', long = "group", value_name = "N", default_value_t = DEFAULT_GROUP, overrides_with = "group")]
    group: usize,

    /// Toggle collapsing of all-zero rows to `*` (off by default)
    #[arg(short = 'k', long = "skip-zero", action = ArgAction::Count)]
    skip_zero: u8,

    /// Input file (default: stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

impl Args {
    /// Each occurrence of a toggle flips its default
    fn options(&self) -> DumpOptions {
        DumpOptions::new(self.columns, self.group)
            .ascii(self.ascii % 2 == 0)
            .offset(self.offset % 2 == 0)
            .skip_zero(self.skip_zero % 2 == 1)
    }

    fn input_name(&self) -> String {
        match &self.file {
            Some(p) => p.display().to_string(),
            None => "stdin".to_string(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(Level::WARN);

    let mut out = BufWriter::new(io::stdout().lock());
    match run(&args, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        // 読み手が先に終了した (`xx file | head` など)
        Err(e) if is_broken_pipe(&e) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xx: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    // 入力を開く前に設定を検証する
    let mut dumper = Dumper::new(args.options())?;
    tracing::debug!(options = ?dumper.options(), "starting dump");

    let mut input = dump::open_input(args.file.as_deref())?;

    dumper
        .dump(&mut input, out)
        .with_context(|| args.input_name())?;
    Ok(())
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(cause.downcast_ref::<DumpError>(), Some(DumpError::Write(e)) if e.kind() == io::ErrorKind::BrokenPipe)
    })
}
