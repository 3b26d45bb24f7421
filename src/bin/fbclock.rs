//! fbclock - Linux framebuffer clock
//!
//! Draws "HH:MM" in the top-right corner of the framebuffer until killed.

use std::convert::Infallible;
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use tracing::{Level, info};

use xxfb::clock::{ClockError, ClockFace, LocalClock};
use xxfb::fb::{DEFAULT_FRAMEBUFFER_PATH, Framebuffer, Surface};
use xxfb::font::{DEFAULT_FONT_PATH, GlyphFont};
use xxfb::logging;

/// Digital clock for the Linux framebuffer console
#[derive(Parser, Debug)]
#[command(name = "fbclock")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PSF2 console font, optionally gzipped
    #[arg(long, env = "FONT", default_value = DEFAULT_FONT_PATH)]
    font: PathBuf,

    /// Framebuffer device node
    #[arg(long, env = "FRAMEBUFFER", default_value = DEFAULT_FRAMEBUFFER_PATH)]
    framebuffer: PathBuf,
}

fn main() {
    let args = Args::parse();
    logging::init(Level::INFO);

    let err = match run(&args) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    eprintln!("fbclock: {err}");
    process::exit(err.exit_code());
}

fn run(args: &Args) -> Result<Infallible, ClockError> {
    let font = GlyphFont::open(&args.font).map_err(|source| ClockError::Font {
        path: args.font.clone(),
        source,
    })?;
    info!(
        path = %args.font.display(),
        width = font.width(),
        height = font.height(),
        glyphs = font.len(),
        "font loaded"
    );

    let mut fb = Framebuffer::open(&args.framebuffer).map_err(|source| ClockError::Framebuffer {
        path: args.framebuffer.clone(),
        source,
    })?;
    info!(
        path = %args.framebuffer.display(),
        width = fb.width(),
        height = fb.height(),
        "framebuffer mapped"
    );

    ClockFace::new(font).run(&mut fb, &mut LocalClock, thread::sleep)
}
