use chrono::{DateTime, TimeZone};

use crate::assets::source::ImageSource;
use crate::compose::filter::Filter;

/// Language of the logo overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoLanguage {
    #[default]
    En,
    Vi,
}

impl LogoLanguage {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "vi" => Some(Self::Vi),
            _ => None,
        }
    }

    /// Brand text before upper-casing.
    pub fn brand(self) -> &'static str {
        match self {
            Self::En => "BluBooth",
            Self::Vi => "blubooth",
        }
    }

    /// Text drawn on the composite.
    pub fn logo_text(self) -> String {
        self.brand().to_uppercase()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    #[default]
    Date,
    Time,
    #[serde(rename = "datetime")]
    DateTime,
}

impl TimestampFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "datetime" | "date_time" => Some(Self::DateTime),
            _ => None,
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            Self::Date => "%d/%m/%Y",
            Self::Time => "%H:%M",
            Self::DateTime => "%d/%m/%Y %H:%M",
        }
    }

    pub fn format<Tz>(self, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        at.format(self.pattern()).to_string()
    }
}

/// Per-export decoration choices.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomizationState {
    pub frame_art: Option<ImageSource>,
    pub filter: Filter,
    pub show_logo: bool,
    pub logo_language: LogoLanguage,
    pub show_timestamp: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for CustomizationState {
    fn default() -> Self {
        Self {
            frame_art: None,
            filter: Filter::None,
            show_logo: true,
            logo_language: LogoLanguage::En,
            show_timestamp: false,
            timestamp_format: TimestampFormat::Date,
        }
    }
}

impl CustomizationState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/customize.rs"]
mod tests;
