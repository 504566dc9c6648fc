use crate::foundation::core::Rgba8;
use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::{mul_div255_u8, unpremultiply};

/// Encoded image container produced by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Quality used for finished composites.
pub const COMPOSITE_JPEG_QUALITY: u8 = 95;
/// Quality used for camera captures and padded uploads.
pub const CAPTURE_JPEG_QUALITY: u8 = 90;

/// Straight-alpha image from premultiplied RGBA8 bytes.
pub fn rgba_image_from_premul(width: u32, height: u32, premul: &[u8]) -> BoothResult<image::RgbaImage> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if premul.len() != expected {
        return Err(BoothError::encoding(format!(
            "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
            premul.len()
        )));
    }
    let mut straight = Vec::with_capacity(expected);
    for px in premul.chunks_exact(4) {
        straight.extend_from_slice(&unpremultiply([px[0], px[1], px[2], px[3]]));
    }
    image::RgbaImage::from_raw(width, height, straight)
        .ok_or_else(|| BoothError::encoding("failed to build rgba image"))
}

/// Flatten straight RGBA over an opaque matte; JPEG carries no alpha.
pub fn flatten_onto(img: &image::RgbaImage, matte: Rgba8) -> image::RgbImage {
    let (w, h) = img.dimensions();
    let mut out = image::RgbImage::new(w, h);
    for (dst, src) in out.pixels_mut().zip(img.pixels()) {
        let a = u16::from(src[3]);
        let inv = 255 - a;
        let mix = |c: u8, m: u8| -> u8 {
            mul_div255_u8(u16::from(c), a).saturating_add(mul_div255_u8(u16::from(m), inv))
        };
        *dst = image::Rgb([
            mix(src[0], matte.r),
            mix(src[1], matte.g),
            mix(src[2], matte.b),
        ]);
    }
    out
}

pub fn encode_jpeg(img: &image::RgbaImage, quality: u8) -> BoothResult<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(BoothError::validation(format!(
            "jpeg quality must be in 1..=100, got {quality}"
        )));
    }
    let rgb = flatten_onto(img, Rgba8::WHITE);
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| BoothError::encoding(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

pub fn encode_png(img: &image::RgbaImage) -> BoothResult<Vec<u8>> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| BoothError::encoding(format!("png encode failed: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raster.rs"]
mod tests;
