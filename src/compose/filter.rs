use rayon::prelude::*;

/// Whole-image color treatment applied after drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    None,
    /// Full grayscale.
    Bw,
    Sepia,
    Vivid,
    Fade,
}

impl Filter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "bw" | "grayscale" => Some(Self::Bw),
            "sepia" => Some(Self::Sepia),
            "vivid" => Some(Self::Vivid),
            "fade" => Some(Self::Fade),
            _ => None,
        }
    }

    /// 4x5 row-major matrix over straight RGBA in `[0, 1]`.
    pub fn matrix(self) -> ColorMatrix {
        match self {
            Self::None => IDENTITY,
            Self::Bw => grayscale(1.0),
            Self::Sepia => sepia(0.8),
            Self::Vivid => chain(&[contrast(1.2), saturate(1.3)]),
            Self::Fade => chain(&[contrast(0.9), brightness(1.1), saturate(0.8)]),
        }
    }
}

pub type ColorMatrix = [f32; 20];

#[rustfmt::skip]
pub const IDENTITY: ColorMatrix = [
    1.0, 0.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0, //
];

#[rustfmt::skip]
pub fn grayscale(amount: f32) -> ColorMatrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k, 0.0, 0.0,
        0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k, 0.0, 0.0,
        0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

#[rustfmt::skip]
pub fn sepia(amount: f32) -> ColorMatrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k, 0.0, 0.0,
        0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k, 0.0, 0.0,
        0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

#[rustfmt::skip]
pub fn saturate(s: f32) -> ColorMatrix {
    [
        0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0, 0.0,
        0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0, 0.0,
        0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

#[rustfmt::skip]
pub fn contrast(c: f32) -> ColorMatrix {
    let t = 0.5 - 0.5 * c;
    [
        c, 0.0, 0.0, 0.0, t,
        0.0, c, 0.0, 0.0, t,
        0.0, 0.0, c, 0.0, t,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

#[rustfmt::skip]
pub fn brightness(b: f32) -> ColorMatrix {
    [
        b, 0.0, 0.0, 0.0, 0.0,
        0.0, b, 0.0, 0.0, 0.0,
        0.0, 0.0, b, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

/// Compose as `a(b(x))`.
pub fn mul_color_matrix(a: ColorMatrix, b: ColorMatrix) -> ColorMatrix {
    let mut out = [0.0f32; 20];
    for row in 0..4 {
        let base = row * 5;
        for col in 0..4 {
            let mut v = 0.0f32;
            for k in 0..4 {
                v += a[row * 5 + k] * b[k * 5 + col];
            }
            out[base + col] = v;
        }
        out[base + 4] = a[base + 4]
            + a[base] * b[4]
            + a[base + 1] * b[9]
            + a[base + 2] * b[14]
            + a[base + 3] * b[19];
    }
    out
}

/// Apply `stages` in order, first stage first.
pub fn chain(stages: &[ColorMatrix]) -> ColorMatrix {
    stages
        .iter()
        .fold(IDENTITY, |acc, m| mul_color_matrix(*m, acc))
}

pub fn is_identity(m: &ColorMatrix) -> bool {
    let eps = 1.0e-6;
    m.iter().zip(IDENTITY.iter()).all(|(a, b)| (*a - *b).abs() <= eps)
}

fn apply_px(px: &mut [u8], m: &ColorMatrix) {
    let pa = f32::from(px[3]) / 255.0;
    let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
    let r = f32::from(px[0]) / 255.0 * inv_a;
    let g = f32::from(px[1]) / 255.0 * inv_a;
    let b = f32::from(px[2]) / 255.0 * inv_a;
    let a = pa;

    let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
    let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
    let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
    let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

    px[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    px[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    px[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Apply `m` to a premultiplied RGBA8 surface, one row per rayon task.
pub fn apply_color_matrix_in_place(rgba_premul: &mut [u8], width: u32, m: &ColorMatrix) {
    if is_identity(m) || width == 0 {
        return;
    }
    let stride = (width as usize) * 4;
    rgba_premul
        .par_chunks_mut(stride)
        .for_each(|row| row.chunks_exact_mut(4).for_each(|px| apply_px(px, m)));
}

#[cfg(test)]
#[path = "../../tests/unit/compose/filter.rs"]
mod tests;
