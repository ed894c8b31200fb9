use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::Result;
use crate::frame::FrameBuffer;

/// 8-bit channel of a clamped color: scaled by 255 and truncated.
fn channel(value: f32) -> u8 {
    (value.max(0.0).min(1.0) * 255.0) as u8
}

pub fn to_rgb_image(frame: &FrameBuffer) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |column, row| {
        let color = frame.get(column, row);
        Rgb([channel(color.r), channel(color.g), channel(color.b)])
    })
}

/// Raster-ordered RGBA8 bytes with opaque alpha, as uploaded to the live view.
pub fn to_rgba_bytes(frame: &FrameBuffer) -> Vec<u8> {
    frame
        .pixels()
        .iter()
        .flat_map(|color| [channel(color.r), channel(color.g), channel(color.b), u8::MAX])
        .collect()
}

/// Encodes the frame as PNG at `path`, replacing any existing file.
pub fn save_png(frame: &FrameBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    to_rgb_image(frame).save_with_format(path, image::ImageFormat::Png)?;
    tracing::info!(path = %path.display(), "image written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;

    #[test]
    fn channels_truncate() {
        assert_eq!(channel(0.0), 0);
        assert_eq!(channel(1.0), 255);
        assert_eq!(channel(0.5), 127);
        assert_eq!(channel(f32::NAN), 0);
    }

    #[test]
    fn image_keeps_raster_order() {
        let mut frame = FrameBuffer::new(2, 2);
        // scene row 0 is the bottom raster row
        frame.put(1, 0, Color::new(1.0, 0.2, 0.0));
        let image = to_rgb_image(&frame);
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(*image.get_pixel(1, 1), Rgb([255, 51, 0]));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn rgba_bytes_match_image() {
        let mut frame = FrameBuffer::new(2, 1);
        frame.put(0, 0, Color::new(0.5, 1.0, 0.0));
        assert_eq!(to_rgba_bytes(&frame), vec![127, 255, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn png_is_written_to_disk() {
        let path = std::env::temp_dir().join(format!("sphere-tracer-{}.png", std::process::id()));
        let mut frame = FrameBuffer::new(3, 2);
        frame.put(0, 0, Color::WHITE);
        save_png(&frame, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded, to_rgb_image(&frame));
        std::fs::remove_file(&path).unwrap();
    }
}
