use std::fs;
use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag, Value};
use image::{DynamicImage, ImageFormat};
use raylib::prelude::*;

use crate::error::{SceneError, SceneResult};

/// A frame decoded off the main thread, re-encoded as QOI so raylib can turn
/// it into a texture without decoding the source format again.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub qoi: Vec<u8>,
}

impl DecodedFrame {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// --- Read, Decode, Apply EXIF Rotation ---
pub fn decode_frame(image_path: &Path) -> SceneResult<DecodedFrame> {
    let file_bytes = fs::read(image_path)
        .map_err(|e| SceneError::load(format!("failed to read {}: {e}", image_path.display())))?;

    let extension = image_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    // EXIF orientation is only reliable in JPEG containers
    let orientation = if extension == "jpg" || extension == "jpeg" {
        read_orientation(image_path, &file_bytes)
    } else {
        1
    };

    let image = image::load_from_memory(&file_bytes)
        .map_err(|e| SceneError::load(format!("failed to decode {}: {e}", image_path.display())))?;

    // 1 = normal, 3 = 180 deg, 6 = 90 deg CW, 8 = 90 deg CCW. Flipped variants are ignored.
    let image = match orientation {
        3 => image.rotate180(),
        6 => image.rotate90(),
        8 => image.rotate270(),
        _ => image,
    };

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut qoi = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut qoi), ImageFormat::Qoi)
        .map_err(|e| SceneError::load(format!("failed to re-encode {}: {e}", image_path.display())))?;

    Ok(DecodedFrame { width, height, qoi })
}

fn read_orientation(image_path: &Path, file_bytes: &[u8]) -> u16 {
    match Reader::new().read_from_container(&mut Cursor::new(file_bytes)) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Short(values) => values.first().copied(),
                _ => None,
            })
            .unwrap_or(1),
        Err(e) => {
            tracing::debug!(path = %image_path.display(), error = %e, "no EXIF orientation");
            1
        }
    }
}

// --- Create Texture On The Main Thread ---
pub fn upload_frame(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    frame: &DecodedFrame,
) -> SceneResult<Texture2D> {
    if frame.is_empty() {
        return Err(SceneError::load("frame has zero dimensions"));
    }

    let image = Image::load_image_from_mem(".qoi", &frame.qoi)
        .map_err(|e| SceneError::load(format!("failed to load frame pixels: {e}")))?;

    let texture = rl
        .load_texture_from_image(thread, &image)
        .map_err(|e| SceneError::load(format!("failed to create texture: {e}")))?;

    // CPU copy is no longer needed once the texture lives on the GPU
    drop(image);

    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 10, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn decodes_png_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.png");
        write_png(&path, 4, 3);

        let frame = decode_frame(&path).unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
        assert!(frame.qoi.starts_with(b"qoif"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_frame(&dir.path().join("404.webp")).unwrap_err();
        assert!(matches!(err, SceneError::Load(_)));
    }

    #[test]
    fn garbage_bytes_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.webp");
        fs::write(&path, b"not an image").unwrap();
        assert!(decode_frame(&path).is_err());
    }
}
