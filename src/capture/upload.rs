use chrono::Utc;

use crate::assets::source::ImageSource;
use crate::capture::session::CaptureSession;
use crate::encode::raster::{CAPTURE_JPEG_QUALITY, encode_jpeg, encode_png};
use crate::foundation::core::{PixelSize, Rect, Rgba8};
use crate::foundation::error::{BoothError, BoothResult};

/// A width:height ratio in lowest terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AspectRatio {
    pub w: u32,
    pub h: u32,
}

impl AspectRatio {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Reduce `w:h` by their gcd.
    pub fn of(w: u32, h: u32) -> Self {
        fn gcd(a: u32, b: u32) -> u32 {
            if b == 0 { a } else { gcd(b, a % b) }
        }
        let g = gcd(w, h).max(1);
        Self { w: w / g, h: h / g }
    }

    pub fn value(self) -> f64 {
        f64::from(self.w) / f64::from(self.h)
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.w, self.h)
    }
}

/// What to do with an upload whose ratio is not accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Letterbox into the pad target.
    #[default]
    Pad,
    /// Hand back to the caller for manual cropping.
    Crop,
    Reject,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub accepted_ratios: Vec<AspectRatio>,
    /// Relative tolerance when comparing ratios.
    pub ratio_tolerance: f64,
    pub on_mismatch: MismatchPolicy,
    pub pad_target: PixelSize,
    pub jpeg_quality: u8,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            accepted_ratios: vec![
                AspectRatio::new(1, 1),
                AspectRatio::new(4, 3),
                AspectRatio::new(3, 4),
                AspectRatio::new(16, 9),
                AspectRatio::new(9, 16),
            ],
            ratio_tolerance: 0.05,
            on_mismatch: MismatchPolicy::Pad,
            pad_target: PixelSize {
                width: 800,
                height: 600,
            },
            jpeg_quality: CAPTURE_JPEG_QUALITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectCheck {
    pub valid: bool,
    pub ratio: AspectRatio,
}

pub fn validate_aspect_ratio(width: u32, height: u32, policy: &UploadPolicy) -> AspectCheck {
    let ratio = AspectRatio::of(width, height);
    if width == 0 || height == 0 {
        return AspectCheck {
            valid: false,
            ratio,
        };
    }
    let actual = f64::from(width) / f64::from(height);
    let valid = policy
        .accepted_ratios
        .iter()
        .any(|r| ((actual - r.value()) / r.value()).abs() <= policy.ratio_tolerance);
    AspectCheck { valid, ratio }
}

#[derive(Clone, Debug)]
pub enum UploadOutcome {
    /// Ready to store in a slot.
    Ready(ImageSource),
    /// Ratio not accepted; the caller should crop and then call [`finish_upload`].
    NeedsCrop {
        image: image::RgbaImage,
        ratio: AspectRatio,
    },
}

/// Validate and normalize one uploaded file.
#[tracing::instrument(skip(bytes, policy), fields(len = bytes.len()))]
pub fn prepare_upload(bytes: &[u8], mime: Option<&str>, policy: &UploadPolicy) -> BoothResult<UploadOutcome> {
    if bytes.len() > policy.max_bytes {
        return Err(BoothError::validation(format!(
            "upload is {} bytes, limit is {}",
            bytes.len(),
            policy.max_bytes
        )));
    }
    if let Some(m) = mime
        && !m.starts_with("image/")
    {
        return Err(BoothError::validation(format!("not an image upload: {m}")));
    }
    let image = image::load_from_memory(bytes)
        .map_err(|e| BoothError::validation(format!("unreadable image upload: {e}")))?
        .to_rgba8();

    let check = validate_aspect_ratio(image.width(), image.height(), policy);
    if !check.valid {
        match policy.on_mismatch {
            MismatchPolicy::Pad => {
                tracing::debug!(ratio = %check.ratio, "unsupported ratio, padding");
            }
            MismatchPolicy::Crop => {
                return Ok(UploadOutcome::NeedsCrop {
                    image,
                    ratio: check.ratio,
                });
            }
            MismatchPolicy::Reject => {
                return Err(BoothError::validation(format!(
                    "unsupported aspect ratio {}",
                    check.ratio
                )));
            }
        }
    }
    finish_upload(&image, policy).map(UploadOutcome::Ready)
}

/// Pad to the policy target and encode as JPEG.
pub fn finish_upload(image: &image::RgbaImage, policy: &UploadPolicy) -> BoothResult<ImageSource> {
    let padded = pad_to_fit(image, policy.pad_target)?;
    Ok(ImageSource::encoded(encode_jpeg(&padded, policy.jpeg_quality)?))
}

/// Scale `image` to fit inside `target` (contain) and center it on white.
pub fn pad_to_fit(image: &image::RgbaImage, target: PixelSize) -> BoothResult<image::RgbaImage> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(BoothError::validation("cannot pad an empty image"));
    }
    if target.width == 0 || target.height == 0 {
        return Err(BoothError::validation(format!(
            "pad target must be non-empty, got {}x{}",
            target.width, target.height
        )));
    }
    let scale = (f64::from(target.width) / f64::from(w)).min(f64::from(target.height) / f64::from(h));
    let sw = ((f64::from(w) * scale).round() as u32).clamp(1, target.width);
    let sh = ((f64::from(h) * scale).round() as u32).clamp(1, target.height);
    let scaled = image::imageops::resize(image, sw, sh, image::imageops::FilterType::Triangle);

    let white = Rgba8::WHITE;
    let mut canvas = image::RgbaImage::from_pixel(
        target.width,
        target.height,
        image::Rgba([white.r, white.g, white.b, white.a]),
    );
    let x = i64::from((target.width - sw) / 2);
    let y = i64::from((target.height - sh) / 2);
    image::imageops::overlay(&mut canvas, &scaled, x, y);
    Ok(canvas)
}

/// Cut `rect` (image pixels) out of `image`, clamped to its bounds.
pub fn crop_image(image: &image::RgbaImage, rect: Rect) -> BoothResult<image::RgbaImage> {
    let (w, h) = image.dimensions();
    let r = rect.intersect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    let x0 = r.x0.round().max(0.0) as u32;
    let y0 = r.y0.round().max(0.0) as u32;
    let x1 = (r.x1.round().max(0.0) as u32).min(w);
    let y1 = (r.y1.round().max(0.0) as u32).min(h);
    if x1 <= x0 || y1 <= y0 {
        return Err(BoothError::validation(format!(
            "crop rectangle {rect:?} does not overlap a {w}x{h} image"
        )));
    }
    Ok(image::imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image())
}

/// Lossless crop preview shown before the user confirms.
pub fn crop_review_png(image: &image::RgbaImage, rect: Rect) -> BoothResult<Vec<u8>> {
    encode_png(&crop_image(image, rect)?)
}

/// Replace the session's frames with uploaded sources, in order from slot 0.
///
/// Returns how many slots were filled; extra uploads are dropped.
pub fn fill_from_uploads(session: &mut CaptureSession, sources: Vec<ImageSource>) -> BoothResult<usize> {
    let n = session.buffer.len();
    if sources.len() > n {
        tracing::warn!(uploaded = sources.len(), slots = n, "dropping extra uploads");
    }
    session.buffer.clear();
    let now = Utc::now();
    let mut placed = 0;
    for (i, src) in sources.into_iter().take(n).enumerate() {
        session.set_frame(i, src, now)?;
        placed += 1;
    }
    Ok(placed)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/upload.rs"]
mod tests;
