use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{Dimension, PixelSize};
use crate::foundation::error::{BoothError, BoothResult};

/// How a layout distributes its frames over the output surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Equal slices along [`StripAxis`].
    Strip,
    /// `ceil(sqrt(n))` columns, rows as needed.
    Grid,
    /// Explicit slots in paper units.
    Absolute,
}

/// Direction in which strip slices are stacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripAxis {
    /// Slices stacked top to bottom.
    #[default]
    Vertical,
    /// Slices placed left to right.
    Horizontal,
}

/// Explicit slot rectangle, in the same unit as the layout's output dimensions.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A decorative overlay offered for a layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameArtEntry {
    pub id: String,
    pub name: String,
    /// Asset reference (relative path, web-rooted path, or data URI).
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutConfig {
    pub id: String,
    pub name: String,
    pub frame_count: usize,
    pub arrangement: Arrangement,
    pub output_width: Dimension,
    pub output_height: Dimension,
    #[serde(default)]
    pub strip_axis: StripAxis,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frame_art: Vec<FrameArtEntry>,
}

impl LayoutConfig {
    pub fn validate(&self) -> BoothResult<()> {
        if self.id.trim().is_empty() {
            return Err(BoothError::configuration("layout id must be non-empty"));
        }
        if self.frame_count == 0 {
            return Err(BoothError::configuration(format!(
                "layout '{}' must have frame_count >= 1",
                self.id
            )));
        }
        if self.output_width.value() <= 0.0 || self.output_height.value() <= 0.0 {
            return Err(BoothError::configuration(format!(
                "layout '{}' output dimensions must be > 0",
                self.id
            )));
        }
        if self.output_width.is_physical() != self.output_height.is_physical() {
            return Err(BoothError::configuration(format!(
                "layout '{}' output width and height must share a unit",
                self.id
            )));
        }

        match self.arrangement {
            Arrangement::Absolute => {
                if self.slots.len() != self.frame_count {
                    return Err(BoothError::configuration(format!(
                        "layout '{}' declares {} frames but {} slots",
                        self.id,
                        self.frame_count,
                        self.slots.len()
                    )));
                }
                for (i, s) in self.slots.iter().enumerate() {
                    let finite = [s.x, s.y, s.width, s.height]
                        .iter()
                        .all(|v| v.is_finite());
                    if !finite || s.x < 0.0 || s.y < 0.0 || s.width <= 0.0 || s.height <= 0.0 {
                        return Err(BoothError::configuration(format!(
                            "layout '{}' slot {i} must have x,y >= 0 and width,height > 0",
                            self.id
                        )));
                    }
                }
            }
            Arrangement::Strip | Arrangement::Grid => {
                if !self.slots.is_empty() {
                    return Err(BoothError::configuration(format!(
                        "layout '{}' is {:?} and must not declare explicit slots",
                        self.id, self.arrangement
                    )));
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for art in &self.frame_art {
            if !seen.insert(art.id.as_str()) {
                return Err(BoothError::configuration(format!(
                    "layout '{}' has duplicate frame art id '{}'",
                    self.id, art.id
                )));
            }
        }
        Ok(())
    }

    /// Output size at print resolution, before any export scale.
    pub fn output_pixels(&self) -> BoothResult<PixelSize> {
        let w = self.output_width.to_pixels().round();
        let h = self.output_height.to_pixels().round();
        if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
            return Err(BoothError::configuration(format!(
                "layout '{}' output size out of range: {w}x{h}",
                self.id
            )));
        }
        PixelSize::new(w as u32, h as u32)
    }

    pub fn frame_art(&self, id: &str) -> Option<&FrameArtEntry> {
        self.frame_art.iter().find(|a| a.id == id)
    }
}

/// Ordered, immutable table of layouts.
#[derive(Clone, Debug)]
pub struct LayoutRegistry {
    layouts: Vec<LayoutConfig>,
}

#[derive(serde::Deserialize)]
struct RegistryFile {
    layouts: Vec<LayoutConfig>,
}

impl LayoutRegistry {
    pub fn new(layouts: Vec<LayoutConfig>) -> BoothResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for layout in &layouts {
            layout.validate()?;
            if !seen.insert(layout.id.clone()) {
                return Err(BoothError::configuration(format!(
                    "duplicate layout id '{}'",
                    layout.id
                )));
            }
        }
        Ok(Self { layouts })
    }

    /// Layouts shipped with the booth.
    pub fn builtin() -> Self {
        Self {
            layouts: builtin_layouts(),
        }
    }

    /// Parse `{"layouts": [...]}`.
    pub fn from_json(s: &str) -> BoothResult<Self> {
        let file: RegistryFile = serde_json::from_str(s)
            .map_err(|e| BoothError::configuration(format!("invalid layout registry: {e}")))?;
        Self::new(file.layouts)
    }

    pub fn from_path(path: &Path) -> BoothResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read layout registry '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn resolve(&self, id: &str) -> BoothResult<&LayoutConfig> {
        self.layouts
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| BoothError::UnknownLayout(id.to_owned()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(|l| l.id.as_str())
    }

    pub fn layouts(&self) -> &[LayoutConfig] {
        &self.layouts
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn art(id: &str, name: &str, source: &str) -> FrameArtEntry {
    FrameArtEntry {
        id: id.to_owned(),
        name: name.to_owned(),
        source: source.to_owned(),
    }
}

fn strip(n: usize) -> LayoutConfig {
    LayoutConfig {
        id: format!("strip_{n}"),
        name: format!("{n}-frame strip"),
        frame_count: n,
        arrangement: Arrangement::Strip,
        output_width: Dimension::Inches(2.0),
        output_height: Dimension::Inches(6.0),
        strip_axis: StripAxis::Vertical,
        slots: Vec::new(),
        frame_art: vec![
            art(
                "classic",
                "Classic",
                &format!("frames/strip-{n}/classic.svg"),
            ),
            art("floral", "Floral", &format!("frames/strip-{n}/floral.svg")),
        ],
    }
}

fn builtin_layouts() -> Vec<LayoutConfig> {
    vec![
        strip(2),
        strip(3),
        strip(4),
        LayoutConfig {
            id: "grid_6".to_owned(),
            name: "6-frame grid".to_owned(),
            frame_count: 6,
            arrangement: Arrangement::Grid,
            output_width: Dimension::Inches(4.0),
            output_height: Dimension::Inches(6.0),
            strip_axis: StripAxis::Vertical,
            slots: Vec::new(),
            frame_art: vec![art("classic", "Classic", "frames/grid-6/classic.svg")],
        },
        LayoutConfig {
            id: "postcard_2".to_owned(),
            name: "Postcard".to_owned(),
            frame_count: 2,
            arrangement: Arrangement::Absolute,
            output_width: Dimension::Inches(6.0),
            output_height: Dimension::Inches(4.0),
            strip_axis: StripAxis::Vertical,
            slots: vec![
                Slot {
                    x: 0.25,
                    y: 0.25,
                    width: 2.625,
                    height: 3.0,
                },
                Slot {
                    x: 3.125,
                    y: 0.25,
                    width: 2.625,
                    height: 3.0,
                },
            ],
            frame_art: vec![art("kraft", "Kraft", "frames/postcard-2/kraft.svg")],
        },
        LayoutConfig {
            id: "polaroid_4".to_owned(),
            name: "Polaroid 2x2".to_owned(),
            frame_count: 4,
            arrangement: Arrangement::Absolute,
            output_width: Dimension::Pixels(1200.0),
            output_height: Dimension::Pixels(1800.0),
            strip_axis: StripAxis::Vertical,
            slots: vec![
                Slot {
                    x: 60.0,
                    y: 60.0,
                    width: 510.0,
                    height: 680.0,
                },
                Slot {
                    x: 630.0,
                    y: 60.0,
                    width: 510.0,
                    height: 680.0,
                },
                Slot {
                    x: 60.0,
                    y: 800.0,
                    width: 510.0,
                    height: 680.0,
                },
                Slot {
                    x: 630.0,
                    y: 800.0,
                    width: 510.0,
                    height: 680.0,
                },
            ],
            frame_art: Vec::new(),
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/layout/registry.rs"]
mod tests;
