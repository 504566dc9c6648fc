use crate::foundation::error::{BoothError, BoothResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Print resolution used to convert physical paper units into pixels.
pub const PRINT_DPI: f64 = 300.0;

/// Output pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> BoothResult<Self> {
        if width == 0 || height == 0 {
            return Err(BoothError::validation("pixel size must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Multiply both axes by `factor`, rounding to the nearest pixel.
    pub fn scaled(self, factor: f64) -> BoothResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(BoothError::validation("scale factor must be finite and > 0"));
        }
        let w = (f64::from(self.width) * factor).round();
        let h = (f64::from(self.height) * factor).round();
        if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
            return Err(BoothError::validation(format!(
                "scaled size out of range: {w}x{h}"
            )));
        }
        Ok(Self {
            width: w as u32,
            height: h as u32,
        })
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// A length in a layout's paper unit system.
///
/// Serialized as `"2in"`, `"600px"`, or a bare number (inches).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
    /// Physical inches, converted at [`PRINT_DPI`].
    Inches(f64),
    /// Literal pixels.
    Pixels(f64),
}

impl Dimension {
    /// Raw magnitude, ignoring the unit.
    pub fn value(self) -> f64 {
        match self {
            Self::Inches(v) | Self::Pixels(v) => v,
        }
    }

    pub fn to_pixels(self) -> f64 {
        match self {
            Self::Inches(v) => v * PRINT_DPI,
            Self::Pixels(v) => v,
        }
    }

    pub fn is_physical(self) -> bool {
        matches!(self, Self::Inches(_))
    }

    pub fn parse(s: &str) -> BoothResult<Self> {
        let t = s.trim();
        let (num, ctor): (&str, fn(f64) -> Self) = if let Some(v) = t.strip_suffix("px") {
            (v, Self::Pixels)
        } else if let Some(v) = t.strip_suffix("in") {
            (v, Self::Inches)
        } else {
            (t, Self::Inches)
        };
        let v: f64 = num
            .trim()
            .parse()
            .map_err(|_| BoothError::configuration(format!("invalid dimension \"{s}\"")))?;
        if !v.is_finite() || v < 0.0 {
            return Err(BoothError::configuration(format!(
                "dimension must be finite and >= 0: \"{s}\""
            )));
        }
        Ok(ctor(v))
    }
}

impl serde::Serialize for Dimension {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Inches(v) => serializer.serialize_str(&format!("{v}in")),
            Self::Pixels(v) => serializer.serialize_str(&format!("{v}px")),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::Number(v) => Self::parse(&v.to_string()).map_err(serde::de::Error::custom),
        }
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Premultiplied byte order used by surfaces.
    pub fn to_premul_bytes(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
