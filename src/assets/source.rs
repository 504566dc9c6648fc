use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::error::{BoothError, BoothResult};

/// Where the bytes of an image come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes already in memory (a fresh capture).
    Encoded(Arc<Vec<u8>>),
    /// `data:` URI with a base64 payload.
    DataUri(String),
    /// Asset reference resolved through an [`AssetFetcher`](crate::assets::store::AssetFetcher).
    Asset(String),
}

impl ImageSource {
    pub fn encoded(bytes: Vec<u8>) -> Self {
        Self::Encoded(Arc::new(bytes))
    }

    /// Classify a stored reference string.
    pub fn from_reference(s: &str) -> Self {
        if s.trim_start().starts_with("data:") {
            Self::DataUri(s.trim().to_owned())
        } else {
            Self::Asset(s.to_owned())
        }
    }

    /// Serializable reference; in-memory bytes become a data URI.
    pub fn to_reference(&self) -> String {
        match self {
            Self::Encoded(bytes) => encode_data_uri(sniff_mime(bytes), bytes),
            Self::DataUri(s) | Self::Asset(s) => s.clone(),
        }
    }

    /// Whether the reference itself announces SVG content.
    pub fn hints_svg(&self) -> bool {
        match self {
            Self::Encoded(bytes) => looks_like_svg(bytes),
            Self::DataUri(s) => s.trim_start().starts_with("data:image/svg+xml"),
            Self::Asset(s) => {
                let path = s.split(['?', '#']).next().unwrap_or(s);
                path.to_ascii_lowercase().ends_with(".svg")
            }
        }
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

/// Split a base64 `data:` URI into its media type and decoded payload.
pub fn decode_data_uri(uri: &str) -> BoothResult<(String, Vec<u8>)> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| BoothError::validation("data uri must start with 'data:'"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BoothError::validation("data uri is missing ','"))?;
    let Some(mime) = header.strip_suffix(";base64") else {
        return Err(BoothError::validation(
            "only base64 data uris are supported",
        ));
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| BoothError::validation(format!("invalid base64 payload: {e}")))?;
    let mime = if mime.is_empty() {
        "text/plain".to_owned()
    } else {
        mime.to_owned()
    };
    Ok((mime, bytes))
}

pub(crate) fn sniff_mime(bytes: &[u8]) -> &'static str {
    if looks_like_svg(bytes) {
        return "image/svg+xml";
    }
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
