//! PSF2 bitmap console fonts
//!
//! Only the glyphs for the first 128 byte values are kept; text is looked up
//! by raw byte value.

mod psf2;

pub use psf2::{MAX_GLYPH_SIZE, PSF2_HEADER_SIZE, PSF2_MAGIC, Psf2Header};

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use thiserror::Error;

/// Default console font
pub const DEFAULT_FONT_PATH: &str = "/usr/share/kbd/consolefonts/Lat2-Terminus16.psfu.gz";
/// Number of leading glyphs loaded into memory
pub const LOADED_GLYPHS: usize = 128;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// フォント読み込みエラー
#[derive(Debug, Error)]
pub enum FontError {
    #[error("{0}")]
    Open(#[source] io::Error),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("truncated header")]
    Truncated,

    #[error("invalid header magic {0:#x}")]
    BadMagic(u32),

    #[error("weird header size {0}")]
    HeaderSize(u32),

    #[error("unusable glyph geometry {width}x{height} in {size} bytes")]
    Geometry { width: u32, height: u32, size: u32 },

    #[error("no glyph data")]
    NoGlyphs,
}

/// A PSF2 font with its leading glyph bitmaps in memory
#[derive(Debug, Clone)]
pub struct GlyphFont {
    header: Psf2Header,
    /// `glyph_size` bytes per glyph, back to back
    glyphs: Vec<u8>,
}

impl GlyphFont {
    /// Open a font file, gunzipping it when it carries the gzip magic
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let file = File::open(path.as_ref()).map_err(FontError::Open)?;
        let mut reader = BufReader::new(file);

        let compressed = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        if compressed {
            Self::from_reader(MultiGzDecoder::new(reader))
        } else {
            Self::from_reader(reader)
        }
    }

    /// Parse an uncompressed PSF2 stream
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, FontError> {
        let mut raw = [0u8; PSF2_HEADER_SIZE];
        reader.read_exact(&mut raw).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FontError::Truncated,
            _ => FontError::Io(e),
        })?;

        let header = Psf2Header::parse(&raw);
        header.validate()?;

        let glyph_size = header.glyph_size as usize;
        let wanted = LOADED_GLYPHS.min(header.glyph_count as usize) * glyph_size;

        let mut glyphs = Vec::with_capacity(wanted);
        reader.take(wanted as u64).read_to_end(&mut glyphs)?;

        // 途中で切れたグリフは捨てる
        let whole = glyphs.len() / glyph_size;
        if whole == 0 {
            return Err(FontError::NoGlyphs);
        }
        glyphs.truncate(whole * glyph_size);

        Ok(Self { header, glyphs })
    }

    pub fn header(&self) -> &Psf2Header {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.glyph_width
    }

    pub fn height(&self) -> u32 {
        self.header.glyph_height
    }

    /// Number of glyphs held in memory
    pub fn len(&self) -> usize {
        self.glyphs.len() / self.header.glyph_size as usize
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Bitmap for a byte value, if it was loaded
    pub fn glyph(&self, byte: u8) -> Option<&[u8]> {
        let size = self.header.glyph_size as usize;
        let start = byte as usize * size;
        self.glyphs.get(start..start + size)
    }

    /// Whether pixel (`x`, `y`) of `glyph` is set; rows are MSB first
    pub fn pixel(&self, glyph: &[u8], x: u32, y: u32) -> bool {
        let index = y as usize * self.header.stride() + x as usize / 8;
        glyph
            .get(index)
            .is_some_and(|&bits| (bits >> (7 - x % 8)) & 1 == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn font_bytes(header: &Psf2Header, glyph_data: &[u8]) -> Vec<u8> {
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(glyph_data);
        bytes
    }

    #[test]
    fn loads_at_most_128_glyphs() {
        let header = Psf2Header::new(8, 2, 256);
        let data: Vec<u8> = (0..512).map(|i| (i / 2) as u8).collect();

        let font = GlyphFont::from_reader(Cursor::new(font_bytes(&header, &data))).unwrap();

        assert_eq!(font.len(), LOADED_GLYPHS);
        assert_eq!(font.glyph(b'A'), Some(&[b'A', b'A'][..]));
        assert_eq!(font.glyph(127), Some(&[127, 127][..]));
        assert_eq!(font.glyph(128), None);
        assert_eq!(font.glyph(0xff), None);
    }

    #[test]
    fn small_font_bounds_lookup() {
        let header = Psf2Header::new(8, 1, 4);
        let font = GlyphFont::from_reader(Cursor::new(font_bytes(&header, &[1, 2, 3, 4]))).unwrap();
        assert_eq!(font.len(), 4);
        assert_eq!(font.glyph(3), Some(&[4][..]));
        assert_eq!(font.glyph(4), None);
    }

    #[test]
    fn partial_trailing_glyph_dropped() {
        let header = Psf2Header::new(8, 2, 10);
        let font = GlyphFont::from_reader(Cursor::new(font_bytes(&header, &[1, 2, 3]))).unwrap();
        assert_eq!(font.len(), 1);
    }

    #[test]
    fn empty_body_is_an_error() {
        let header = Psf2Header::new(8, 16, 10);
        let err = GlyphFont::from_reader(Cursor::new(font_bytes(&header, &[]))).unwrap_err();
        assert!(matches!(err, FontError::NoGlyphs));
    }

    #[test]
    fn short_header_is_truncated() {
        let err = GlyphFont::from_reader(Cursor::new(vec![0x72u8, 0xb5])).unwrap_err();
        assert!(matches!(err, FontError::Truncated));
    }

    #[test]
    fn pixel_reads_msb_first_with_stride() {
        // 10 px wide: two bytes per row
        let header = Psf2Header::new(10, 2, 1);
        let glyph = [0b1000_0000, 0b0100_0000, 0b0000_0001, 0b0000_0000];
        let font = GlyphFont::from_reader(Cursor::new(font_bytes(&header, &glyph))).unwrap();
        let g = font.glyph(0).unwrap();

        assert!(font.pixel(g, 0, 0));
        assert!(!font.pixel(g, 1, 0));
        assert!(font.pixel(g, 9, 0));
        assert!(font.pixel(g, 7, 1));
        assert!(!font.pixel(g, 8, 1));
    }

    #[test]
    fn open_reports_missing_path() {
        let err = GlyphFont::open("/nonexistent/xxfb-font.psf").unwrap_err();
        assert!(matches!(err, FontError::Open(_)));
    }
}
