use std::collections::TryReserveError;
use std::fmt::Write as _;
use std::io::{self, Read, Write};

use super::{DumpError, DumpOptions};

/// Streaming hex dumper
///
/// Carries the zero-run state between windows, so one `Dumper` should be used
/// per input stream.
pub struct Dumper {
    options: DumpOptions,
    /// Read window, `options.columns` bytes
    window: Vec<u8>,
    /// Reused output line
    line: String,
    /// The previous full window was collapsed to `*`
    skipping: bool,
}

impl Dumper {
    /// Validate `options` and allocate the read window and line buffer
    ///
    /// Column counts whose buffers cannot be allocated are rejected with
    /// `DumpError::TooWide` instead of aborting.
    pub fn new(options: DumpOptions) -> Result<Self, DumpError> {
        options.validate()?;
        let columns = options.columns;
        let too_wide = |source: Option<TryReserveError>| DumpError::TooWide { columns, source };

        // 1バイトあたり最大 "xx " + グループ区切り + ASCII 1文字
        let line_capacity = columns
            .checked_mul(5)
            .and_then(|n| n.checked_add(16))
            .ok_or(too_wide(None))?;

        let mut window = Vec::new();
        window.try_reserve_exact(columns).map_err(|e| too_wide(Some(e)))?;
        window.resize(columns, 0);

        let mut line = String::new();
        line.try_reserve_exact(line_capacity).map_err(|e| too_wide(Some(e)))?;

        Ok(Self {
            options,
            window,
            line,
            skipping: false,
        })
    }

    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Dump `input` to `out` until end of stream
    ///
    /// Returns the number of bytes consumed. A read error is returned only
    /// after every row read before it has been written and flushed.
    pub fn dump<R, W>(&mut self, input: &mut R, out: &mut W) -> Result<u64, DumpError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let columns = self.options.columns;
        let mut offset: u64 = 0;

        loop {
            let (len, pending) = fill_window(input, &mut self.window);
            if len > 0 {
                self.emit(offset, len, out)?;
                offset += len as u64;
            }

            if let Some(err) = pending {
                out.flush().map_err(DumpError::Write)?;
                return Err(DumpError::Read(err));
            }

            // 短い読み込み = ストリーム終端
            if len < columns {
                break;
            }
        }

        out.flush().map_err(DumpError::Write)?;
        tracing::debug!(bytes = offset, "dump finished");
        Ok(offset)
    }

    fn emit<W>(&mut self, offset: u64, len: usize, out: &mut W) -> Result<(), DumpError>
    where
        W: Write + ?Sized,
    {
        let bytes = &self.window[..len];

        if self.options.skip_zero && len == self.options.columns {
            if bytes.iter().all(|&b| b == 0) {
                if !self.skipping {
                    out.write_all(b"*\n").map_err(DumpError::Write)?;
                }
                self.skipping = true;
                return Ok(());
            }
            self.skipping = false;
        }

        self.line.clear();
        format_row(&self.options, offset, bytes, &mut self.line);
        out.write_all(self.line.as_bytes()).map_err(DumpError::Write)
    }
}

/// Fill `buf` from `input` the way stdio `fread` does
///
/// Reads until the buffer is full, the stream ends, or an error occurs.
/// Returns how many bytes landed in `buf` and the error that stopped it, if any.
pub fn fill_window<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> (usize, Option<io::Error>) {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (filled, Some(e)),
        }
    }
    (filled, None)
}

/// Render one row, newline included, into `out`
pub fn format_row(options: &DumpOptions, offset: u64, bytes: &[u8], out: &mut String) {
    let group = options.group;

    // String への書き込みは失敗しない
    if options.offset {
        let _ = write!(out, "{offset:08x}:  ");
    }

    for (i, &byte) in bytes.iter().enumerate() {
        if group != 0 && i != 0 && i % group == 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x} ");
    }

    if options.ascii {
        // 短い行も右側の ASCII 列が揃うようにパディング
        for i in bytes.len()..options.columns {
            if group != 0 && i % group == 0 {
                out.push_str("    ");
            } else {
                out.push_str("   ");
            }
        }
        out.push(' ');
        out.extend(bytes.iter().map(|&b| if is_printable(b) { b as char } else { '.' }));
    }

    out.push('\n');
}

/// `isprint` in the C locale
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}
