//! Pixel surfaces
//!
//! `Framebuffer` maps a Linux fbdev node shared with the display, `Canvas` is
//! a plain in-memory buffer with the same interface.

mod device;

pub use device::{DEFAULT_FRAMEBUFFER_PATH, FbBitfield, FbVarScreeninfo, Framebuffer, screen_info};

use std::io;

use thiserror::Error;

/// Bytes per pixel assumed for every framebuffer
pub const BYTES_PER_PIXEL: usize = 4;

/// Framebuffer errors
#[derive(Debug, Error)]
pub enum FbError {
    #[error("{0}")]
    Open(#[source] io::Error),

    #[error("{0}")]
    Geometry(#[source] io::Error),

    #[error("{0}")]
    Map(#[source] io::Error),
}

/// A 32-bit pixel buffer
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Write one pixel; coordinates outside the surface are ignored
    fn put(&mut self, x: u32, y: u32, color: u32);
}

/// In-memory surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn put(&mut self, x: u32, y: u32, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_ignores_out_of_range() {
        let mut canvas = Canvas::new(4, 3, 0);
        canvas.put(3, 2, 7);
        canvas.put(4, 0, 9);
        canvas.put(0, 3, 9);

        assert_eq!(canvas.get(3, 2), Some(7));
        assert_eq!(canvas.get(4, 0), None);
        assert_eq!(canvas.pixels().iter().filter(|&&p| p == 9).count(), 0);
    }
}
