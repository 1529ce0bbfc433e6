//! RGB888 to RGB565 conversion for 16bpp framebuffers.

/// Pack an 8-bit-per-channel color into 5-6-5 bits.
pub fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r >> 3) as u16) << 11) | (((g >> 2) as u16) << 5) | (b >> 3) as u16
}
