//! Memory-mapped Linux framebuffer device.

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::Path;

use anyhow::{Context, Result};
use facebox::compositor::{FrameSink, Geometry};
use memmap2::{MmapMut, MmapOptions};

const FBIOGET_VSCREENINFO: u32 = 0x4600;
const FBIOGET_FSCREENINFO: u32 = 0x4602;

// Layouts from linux/fb.h. Most fields are filled in by the kernel and
// never read here.

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

#[repr(C)]
#[derive(Debug, Default)]
#[allow(dead_code)]
struct FbVarScreeninfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Default)]
#[allow(dead_code)]
struct FbFixScreeninfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

nix::ioctl_read_bad!(fbioget_vscreeninfo, FBIOGET_VSCREENINFO, FbVarScreeninfo);
nix::ioctl_read_bad!(fbioget_fscreeninfo, FBIOGET_FSCREENINFO, FbFixScreeninfo);

/// An open framebuffer with its visible memory mapped read-write. The
/// mapping is released when this is dropped.
pub struct Framebuffer {
    _file: File,
    map: MmapMut,
    geometry: Geometry,
}

impl Framebuffer {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let mut var = FbVarScreeninfo::default();
        let mut fix = FbFixScreeninfo::default();
        // SAFETY: both structs match the kernel layouts the ioctls fill in
        unsafe {
            fbioget_vscreeninfo(file.as_raw_fd(), &mut var)
                .context("failed to read variable screen info")?;
            fbioget_fscreeninfo(file.as_raw_fd(), &mut fix)
                .context("failed to read fixed screen info")?;
        }

        let geometry = Geometry {
            width: var.xres as usize,
            height: var.yres as usize,
            bits_per_pixel: var.bits_per_pixel,
            line_length: fix.line_length as usize,
        };

        // SAFETY: the framebuffer is only mapped by one renderer at a time,
        // which the supervising daemon guarantees
        let map = unsafe {
            MmapOptions::new()
                .len(geometry.buffer_size())
                .map_mut(&file)
                .with_context(|| format!("failed to map {}", path.display()))?
        };

        Ok(Self {
            _file: file,
            map,
            geometry,
        })
    }
}

impl FrameSink for Framebuffer {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn write_line(&mut self, y: usize, line: &[u8]) {
        let start = y * self.geometry.line_length;
        self.map[start..start + line.len()].copy_from_slice(line);
    }
}
