//! Digital clock drawn into a pixel surface
//!
//! The time string is right-aligned in the top-right corner and framed by a
//! one pixel separator on its left and below it.

mod time;

pub use time::{LocalClock, TIME_FORMAT, TimeSource, WallTime};

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::{Duration, SystemTimeError};

use thiserror::Error;

use crate::fb::{FbError, Surface};
use crate::font::{FontError, GlyphFont};

/// sysexits.h exit statuses
pub mod exit {
    pub const DATAERR: i32 = 65;
    pub const NOINPUT: i32 = 66;
    pub const OSERR: i32 = 71;
    pub const OSFILE: i32 = 72;
    pub const IOERR: i32 = 74;
}

/// デフォルトカラー設定
pub struct Colors;

impl Colors {
    pub const BACKGROUND: u32 = 0x1D_2021;
    pub const FOREGROUND: u32 = 0xA9_9A84;
}

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("{}: {source}", path.display())]
    Font {
        path: PathBuf,
        #[source]
        source: FontError,
    },

    #[error("{}: {source}", path.display())]
    Framebuffer {
        path: PathBuf,
        #[source]
        source: FbError,
    },

    #[error("time: {0}")]
    Time(#[source] SystemTimeError),

    #[error("localtime: cannot represent {0}")]
    LocalTime(u64),

    #[error("display is {width} px wide, clock needs {needed}")]
    TooNarrow { width: u32, needed: u64 },
}

impl ClockError {
    /// Exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ClockError::Font { source, .. } => match source {
                FontError::Open(_) => exit::NOINPUT,
                FontError::Io(_) | FontError::Truncated | FontError::NoGlyphs => exit::IOERR,
                FontError::BadMagic(_) | FontError::HeaderSize(_) | FontError::Geometry { .. } => {
                    exit::DATAERR
                }
            },
            ClockError::Framebuffer { source, .. } => match source {
                FbError::Open(_) => exit::OSFILE,
                FbError::Geometry(_) | FbError::Map(_) => exit::IOERR,
            },
            ClockError::Time(_) | ClockError::LocalTime(_) => exit::OSERR,
            ClockError::TooNarrow { .. } => exit::DATAERR,
        }
    }
}

/// Renders time strings with a bitmap font
pub struct ClockFace {
    font: GlyphFont,
    foreground: u32,
    background: u32,
}

impl ClockFace {
    pub fn new(font: GlyphFont) -> Self {
        Self {
            font,
            foreground: Colors::FOREGROUND,
            background: Colors::BACKGROUND,
        }
    }

    /// Draw `text` right-aligned against the top-right corner
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, text: &str) -> Result<(), ClockError> {
        let glyph_width = self.font.width();
        let glyph_height = self.font.height();
        let width = surface.width();

        let needed = u64::from(glyph_width) * text.len() as u64;
        if needed > u64::from(width) {
            return Err(ClockError::TooNarrow { width, needed });
        }
        let mut left = width - needed as u32;

        // 区切り線
        if left > 0 {
            for y in 0..glyph_height {
                surface.put(left - 1, y, self.foreground);
            }
        }
        for x in left.saturating_sub(1)..width {
            surface.put(x, glyph_height, self.foreground);
        }

        for &byte in text.as_bytes() {
            let glyph = self.font.glyph(byte);
            for y in 0..glyph_height {
                for x in 0..glyph_width {
                    let set = glyph.is_some_and(|g| self.font.pixel(g, x, y));
                    let color = if set { self.foreground } else { self.background };
                    surface.put(left + x, y, color);
                }
            }
            left += glyph_width;
        }

        Ok(())
    }

    /// Read the time once and redraw it every second until the minute is over
    ///
    /// Returns the number of redraws, `60 - second`.
    pub fn run_minute<S, T, F>(&self, surface: &mut S, source: &mut T, sleep: &mut F) -> Result<u32, ClockError>
    where
        S: Surface + ?Sized,
        T: TimeSource + ?Sized,
        F: FnMut(Duration),
    {
        let now = source.now()?;
        let redraws = 60u32.saturating_sub(now.second);

        for _ in 0..redraws {
            self.draw(surface, &now.text)?;
            sleep(Duration::from_secs(1));
        }

        Ok(redraws)
    }

    /// Keep the clock on screen until an error occurs
    pub fn run<S, T, F>(&self, surface: &mut S, source: &mut T, mut sleep: F) -> Result<Infallible, ClockError>
    where
        S: Surface + ?Sized,
        T: TimeSource + ?Sized,
        F: FnMut(Duration),
    {
        loop {
            let redraws = self.run_minute(surface, source, &mut sleep)?;
            tracing::debug!(redraws, "minute done");
        }
    }
}
