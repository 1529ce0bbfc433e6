//! Double-buffered frame composition for 16bpp displays.
//!
//! Frames are drawn centered into an off-screen buffer with the same layout
//! as the display memory (including any row padding), then copied to the
//! display one scanline at a time.

use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::pixel::rgb565;

#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("unsupported pixel depth: {0} bits per pixel (only 16 is supported)")]
    UnsupportedDepth(u32),
    #[error("line length {line_length} too short for {width} pixels")]
    BadLineLength { line_length: usize, width: usize },
    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),
}

/// Display layout as reported by the framebuffer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub bits_per_pixel: u32,
    /// Bytes per scanline, possibly larger than `width * 2`.
    pub line_length: usize,
}

impl Geometry {
    pub fn buffer_size(&self) -> usize {
        self.line_length * self.height
    }
}

/// Visible display memory.
pub trait FrameSink {
    fn geometry(&self) -> Geometry;

    /// Overwrite scanline `y` with `line`, which is exactly `line_length`
    /// bytes long.
    fn write_line(&mut self, y: usize, line: &[u8]);
}

pub struct Compositor<S: FrameSink> {
    sink: S,
    geometry: Geometry,
    back: Vec<u8>,
}

impl<S: FrameSink> Compositor<S> {
    /// The back buffer starts out black.
    pub fn new(sink: S) -> Result<Self, CompositorError> {
        let geometry = sink.geometry();
        if geometry.bits_per_pixel != 16 {
            return Err(CompositorError::UnsupportedDepth(geometry.bits_per_pixel));
        }
        if geometry.line_length < geometry.width * 2 {
            return Err(CompositorError::BadLineLength {
                line_length: geometry.line_length,
                width: geometry.width,
            });
        }
        Ok(Self {
            sink,
            geometry,
            back: vec![0; geometry.buffer_size()],
        })
    }

    #[cfg(test)]
    fn back_buffer(&self) -> &[u8] {
        &self.back
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Draw a tightly packed RGB888 image centered in the back buffer.
    /// Pixels falling outside the display are clipped. Areas the image does
    /// not cover keep whatever the previous frame left there.
    pub fn draw_rgb888(&mut self, img_width: usize, img_height: usize, rgb: &[u8]) {
        let Geometry {
            width,
            height,
            line_length,
            ..
        } = self.geometry;
        if img_width == 0 || img_height == 0 {
            return;
        }
        let offset_x = (width as i64 - img_width as i64) / 2;
        let offset_y = (height as i64 - img_height as i64) / 2;

        for (y, row) in rgb.chunks_exact(img_width * 3).take(img_height).enumerate() {
            let fb_y = y as i64 + offset_y;
            if fb_y < 0 || fb_y >= height as i64 {
                continue;
            }
            let row_start = fb_y as usize * line_length;
            for (x, px) in row.chunks_exact(3).enumerate() {
                let fb_x = x as i64 + offset_x;
                if fb_x < 0 || fb_x >= width as i64 {
                    continue;
                }
                let at = row_start + fb_x as usize * 2;
                let color = rgb565(px[0], px[1], px[2]);
                self.back[at..at + 2].copy_from_slice(&color.to_ne_bytes());
            }
        }
    }

    /// Copy the back buffer to the display line by line.
    pub fn present(&mut self) {
        let line_length = self.geometry.line_length;
        for (y, line) in self.back.chunks_exact(line_length).enumerate() {
            self.sink.write_line(y, line);
        }
    }

    /// Decode the image at `path`, compose it and present it.
    pub fn show_file(&mut self, path: &Path) -> Result<(), CompositorError> {
        let img = image::open(path)?.to_rgb8();
        let (w, h) = (img.width() as usize, img.height() as usize);
        debug!("drawing {} ({w}x{h})", path.display());
        self.draw_rgb888(w, h, img.as_raw());
        self.present();
        Ok(())
    }
}
