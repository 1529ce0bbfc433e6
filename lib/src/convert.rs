//! Turn an animated GIF into a directory of `.bmp` frames the player can
//! use.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage};
use log::debug;
use thiserror::Error;

/// The appliance's display size.
pub const DEFAULT_MAX_WIDTH: u32 = 162;
pub const DEFAULT_MAX_HEIGHT: u32 = 132;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Zero-padded so that string order matches playback order.
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:04}.bmp")
}

/// Write every frame of `gif` into `out_dir`, scaled (keeping aspect ratio)
/// to fit `max_width` x `max_height`. Returns the number of frames written.
pub fn convert_gif(
    gif: &Path,
    out_dir: &Path,
    max_width: u32,
    max_height: u32,
) -> Result<usize, ConvertError> {
    std::fs::create_dir_all(out_dir)?;
    let decoder = GifDecoder::new(BufReader::new(File::open(gif)?))?;

    let mut written = 0;
    for (index, frame) in decoder.into_frames().enumerate() {
        let img = DynamicImage::from(frame?.into_buffer());
        let scaled = img.resize(max_width, max_height, FilterType::Lanczos3);
        let path = out_dir.join(frame_file_name(index));
        debug!(
            "writing {} ({}x{})",
            path.display(),
            scaled.width(),
            scaled.height()
        );
        scaled.to_rgb8().save(&path)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameSequence;
    use image::codecs::gif::GifEncoder;
    use image::{Frame, Rgba, RgbaImage};

    fn write_gif(path: &Path, width: u32, height: u32, colors: &[[u8; 4]]) {
        let mut encoder = GifEncoder::new(File::create(path).unwrap());
        let frames = colors
            .iter()
            .map(|c| Frame::new(RgbaImage::from_pixel(width, height, Rgba(*c))));
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn test_frame_names_sort_in_order() {
        assert_eq!(frame_file_name(7), "frame_0007.bmp");
        assert!(frame_file_name(2) < frame_file_name(10));
    }

    #[test]
    fn test_convert_scales_to_fit() {
        let dir = tempfile::tempdir().unwrap();
        let gif = dir.path().join("happy.gif");
        write_gif(
            &gif,
            324,
            132,
            &[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]],
        );

        let out = dir.path().join("happy");
        let written = convert_gif(&gif, &out, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT).unwrap();
        assert_eq!(written, 3);

        let frames = FrameSequence::scan(&out).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["frame_0000.bmp", "frame_0001.bmp", "frame_0002.bmp"]
        );

        // width-bound: 324x132 halves to 162x66
        let first = image::open(out.join("frame_0000.bmp")).unwrap().to_rgb8();
        assert_eq!(first.dimensions(), (162, 66));
        let [r, g, b] = first.get_pixel(80, 30).0;
        assert!(r > 200 && g < 50 && b < 50, "{:?}", [r, g, b]);
    }

    #[test]
    fn test_convert_scales_small_gif_up() {
        let dir = tempfile::tempdir().unwrap();
        let gif = dir.path().join("tiny.gif");
        write_gif(&gif, 10, 10, &[[255, 255, 255, 255]]);

        let out = dir.path().join("tiny");
        convert_gif(&gif, &out, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT).unwrap();
        let frame = image::open(out.join("frame_0000.bmp")).unwrap();
        assert_eq!((frame.width(), frame.height()), (132, 132));
    }

    #[test]
    fn test_convert_rejects_non_gif() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not.gif");
        std::fs::write(&bogus, b"hello").unwrap();
        assert!(matches!(
            convert_gif(&bogus, &dir.path().join("out"), 162, 132),
            Err(ConvertError::Image(_))
        ));
    }

    #[test]
    fn test_convert_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            convert_gif(&dir.path().join("gone.gif"), &dir.path().join("out"), 162, 132),
            Err(ConvertError::Io(_))
        ));
    }
}
