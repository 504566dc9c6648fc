use chrono::Utc;

use crate::assets::source::ImageSource;
use crate::capture::session::CaptureSession;
use crate::encode::raster::{CAPTURE_JPEG_QUALITY, encode_jpeg};
use crate::foundation::error::{BoothError, BoothResult};

/// A live camera (or anything that can produce still frames on demand).
pub trait CaptureDevice {
    /// Grab the current frame as straight RGBA8.
    fn grab_frame(&mut self) -> BoothResult<image::RgbaImage>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOpts {
    /// Flip horizontally so the saved photo matches the selfie preview.
    pub mirrored: bool,
    pub jpeg_quality: u8,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            mirrored: false,
            jpeg_quality: CAPTURE_JPEG_QUALITY,
        }
    }
}

/// Grab one frame, encode it and store it at `index`.
///
/// Returns the slot the booth should advance to next, or `None` once the strip is complete.
#[tracing::instrument(skip(session, device), fields(layout = %session.layout_id))]
pub fn capture_into(
    session: &mut CaptureSession,
    device: &mut dyn CaptureDevice,
    index: usize,
    opts: CaptureOpts,
) -> BoothResult<Option<usize>> {
    if index >= session.buffer.len() {
        return Err(BoothError::IndexOutOfRange {
            index,
            len: session.buffer.len(),
        });
    }

    let frame = device.grab_frame()?;
    if frame.width() == 0 || frame.height() == 0 {
        return Err(BoothError::capture_device("device produced an empty frame"));
    }
    let frame = if opts.mirrored {
        image::imageops::flip_horizontal(&frame)
    } else {
        frame
    };

    let bytes = encode_jpeg(&frame, opts.jpeg_quality)?;
    session.set_frame(index, ImageSource::encoded(bytes), Utc::now())?;
    tracing::debug!(index, "frame captured");
    Ok(session.buffer.first_empty_index())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/device.rs"]
mod tests;
