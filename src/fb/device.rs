use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use super::{BYTES_PER_PIXEL, FbError, Surface};

/// Default framebuffer device node
pub const DEFAULT_FRAMEBUFFER_PATH: &str = "/dev/fb0";

/// `FBIOGET_VSCREENINFO` from `<linux/fb.h>`
const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FbBitfield {
    pub offset: u32,
    pub length: u32,
    pub msb_right: u32,
}

/// `struct fb_var_screeninfo`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FbVarScreeninfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    pub grayscale: u32,
    pub red: FbBitfield,
    pub green: FbBitfield,
    pub blue: FbBitfield,
    pub transp: FbBitfield,
    pub nonstd: u32,
    pub activate: u32,
    pub height: u32,
    pub width: u32,
    pub accel_flags: u32,
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: u32,
    pub vmode: u32,
    pub rotate: u32,
    pub colorspace: u32,
    pub reserved: [u32; 4],
}

/// A memory-mapped framebuffer device
///
/// Writes land in the shared mapping and show up on the display at once.
pub struct Framebuffer {
    width: u32,
    height: u32,
    map: MmapMut,
    _file: File,
}

impl Framebuffer {
    /// Open a device node, read its visible resolution and map it
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FbError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())
            .map_err(FbError::Open)?;

        let info = screen_info(&file).map_err(FbError::Geometry)?;
        if info.bits_per_pixel != 32 {
            tracing::warn!(bpp = info.bits_per_pixel, "framebuffer is not 32 bpp, colors will be off");
        }

        Self::map(file, info.xres, info.yres)
    }

    /// Map `width × height` 32-bit pixels of an already opened file
    pub fn map(file: File, width: u32, height: u32) -> Result<Self, FbError> {
        let len = BYTES_PER_PIXEL * width as usize * height as usize;
        // SAFETY: the file is kept open for as long as the mapping lives
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file) }.map_err(FbError::Map)?;

        Ok(Self {
            width,
            height,
            map,
            _file: file,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn flush(&self) -> io::Result<()> {
        self.map.flush()
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn put(&mut self, x: u32, y: u32, color: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let at = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.map[at..at + BYTES_PER_PIXEL].copy_from_slice(&color.to_ne_bytes());
    }
}

/// Query the variable screen info of a framebuffer device
pub fn screen_info(file: &File) -> io::Result<FbVarScreeninfo> {
    let mut info = FbVarScreeninfo::default();
    // SAFETY: FBIOGET_VSCREENINFO fills exactly one fb_var_screeninfo
    let ret = unsafe { libc::ioctl(file.as_raw_fd(), FBIOGET_VSCREENINFO as _, &mut info as *mut FbVarScreeninfo) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    fn scratch_file(name: &str, len: u64) -> (std::path::PathBuf, File) {
        let path = std::env::temp_dir().join(format!("xxfb-{}-{name}", std::process::id()));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        file.set_len(len).unwrap();
        (path, file)
    }

    #[test]
    fn screeninfo_matches_kernel_layout() {
        assert_eq!(mem::size_of::<FbVarScreeninfo>(), 160);
    }

    #[test]
    fn missing_device_fails_to_open() {
        let err = Framebuffer::open("/nonexistent/xxfb-fb0").err().unwrap();
        assert!(matches!(err, FbError::Open(_)));
    }

    #[test]
    fn regular_file_has_no_geometry() {
        let (path, _file) = scratch_file("geometry", 64);
        let err = Framebuffer::open(&path).err().unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, FbError::Geometry(_)));
    }

    #[test]
    fn pixels_land_in_the_mapping() {
        let (path, file) = scratch_file("map", 4 * 3 * 2);
        let mut fb = Framebuffer::map(file, 3, 2).unwrap();

        fb.put(2, 1, 0x00A9_9A84);
        fb.put(3, 0, 0xffff_ffff);

        // (2, 1) in a 3 px wide buffer
        let at = 5 * BYTES_PER_PIXEL;
        assert_eq!(&fb.as_bytes()[at..at + 4], &0x00A9_9A84u32.to_ne_bytes());
        assert_eq!(fb.as_bytes().iter().filter(|&&b| b == 0xff).count(), 0);

        fb.flush().unwrap();
        drop(fb);
        let on_disk = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(&on_disk[at..at + 4], &0x00A9_9A84u32.to_ne_bytes());
    }
}
