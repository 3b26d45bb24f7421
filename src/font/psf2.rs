use super::FontError;

/// PSF2 マジックナンバー
pub const PSF2_MAGIC: u32 = 0x864A_B572;
/// Size of the only header layout we accept
pub const PSF2_HEADER_SIZE: usize = 32;
/// Largest per-glyph bitmap we are willing to allocate for
pub const MAX_GLYPH_SIZE: u32 = 64 * 1024;

/// PSF2 font header, eight little-endian `u32` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Psf2Header {
    pub magic: u32,
    pub version: u32,
    pub header_size: u32,
    pub flags: u32,
    pub glyph_count: u32,
    /// Bytes per glyph bitmap
    pub glyph_size: u32,
    pub glyph_height: u32,
    pub glyph_width: u32,
}

impl Psf2Header {
    /// Header for a font with no unicode table and tightly packed rows
    pub fn new(glyph_width: u32, glyph_height: u32, glyph_count: u32) -> Self {
        Self {
            magic: PSF2_MAGIC,
            version: 0,
            header_size: PSF2_HEADER_SIZE as u32,
            flags: 0,
            glyph_count,
            glyph_size: glyph_width.div_ceil(8) * glyph_height,
            glyph_height,
            glyph_width,
        }
    }

    pub fn parse(raw: &[u8; PSF2_HEADER_SIZE]) -> Self {
        let field = |i: usize| u32::from_le_bytes([raw[i * 4], raw[i * 4 + 1], raw[i * 4 + 2], raw[i * 4 + 3]]);
        Self {
            magic: field(0),
            version: field(1),
            header_size: field(2),
            flags: field(3),
            glyph_count: field(4),
            glyph_size: field(5),
            glyph_height: field(6),
            glyph_width: field(7),
        }
    }

    pub fn to_bytes(&self) -> [u8; PSF2_HEADER_SIZE] {
        let fields = [
            self.magic,
            self.version,
            self.header_size,
            self.flags,
            self.glyph_count,
            self.glyph_size,
            self.glyph_height,
            self.glyph_width,
        ];
        let mut raw = [0u8; PSF2_HEADER_SIZE];
        for (chunk, value) in raw.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        raw
    }

    /// Check magic, header size and that the glyph geometry is usable
    pub fn validate(&self) -> Result<(), FontError> {
        if self.magic != PSF2_MAGIC {
            return Err(FontError::BadMagic(self.magic));
        }
        if self.header_size as usize != PSF2_HEADER_SIZE {
            return Err(FontError::HeaderSize(self.header_size));
        }

        let geometry_ok = self.glyph_width > 0
            && self.glyph_height > 0
            && self.glyph_size <= MAX_GLYPH_SIZE
            && u64::from(self.glyph_size)
                >= u64::from(self.glyph_height) * u64::from(self.glyph_width.div_ceil(8));
        if !geometry_ok {
            return Err(FontError::Geometry {
                width: self.glyph_width,
                height: self.glyph_height,
                size: self.glyph_size,
            });
        }
        Ok(())
    }

    /// Bytes per glyph row
    pub fn stride(&self) -> usize {
        (self.glyph_size / self.glyph_height) as usize
    }
}
