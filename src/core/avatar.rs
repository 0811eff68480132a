use crate::utils::error::Result;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

pub const AVATAR_MAX_WIDTH: u32 = 150;
pub const AVATAR_JPEG_QUALITY: u8 = 70;

/// Shrinks an uploaded picture to at most [`AVATAR_MAX_WIDTH`] pixels wide,
/// re-encodes it as JPEG and returns it as an inline `data:` reference
/// suitable for [`Student::image_url`](crate::domain::model::Student).
pub fn compress_avatar(bytes: &[u8]) -> Result<String> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());

    let img = if width > AVATAR_MAX_WIDTH {
        let scaled_height =
            ((height as f64) * (AVATAR_MAX_WIDTH as f64) / (width as f64)).round().max(1.0) as u32;
        img.resize_exact(AVATAR_MAX_WIDTH, scaled_height, FilterType::Triangle)
    } else {
        img
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, AVATAR_JPEG_QUALITY).encode_image(&img.to_rgb8())?;

    tracing::debug!(
        "Compressed avatar {}x{} -> {}x{} ({} bytes)",
        width,
        height,
        img.width(),
        img.height(),
        jpeg.len()
    );

    Ok(format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&jpeg)
    ))
}
