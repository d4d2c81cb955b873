//! Display configuration model.

use serde::{Deserialize, Serialize};

/// Base map rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    Standard,
    Hybrid,
    Imagery,
}

impl MapStyle {
    pub const ALL: [MapStyle; 3] = [Self::Standard, Self::Hybrid, Self::Imagery];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hybrid => "hybrid",
            Self::Imagery => "imagery",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Standard => "標準",
            Self::Hybrid => "ハイブリッド",
            Self::Imagery => "航空写真",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "hybrid" => Some(Self::Hybrid),
            "imagery" => Some(Self::Imagery),
            _ => None,
        }
    }
}

/// Display settings owned by `SettingsStore`.
///
/// `overlay_opacity` is nominally in `[0, 1]` but is not clamped here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub overlay_opacity: f64,
    pub map_style: MapStyle,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            overlay_opacity: 0.6,
            map_style: MapStyle::Standard,
        }
    }
}
