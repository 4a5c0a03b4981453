//! Encode settings

use crate::error::{Result, VideoError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest CRF libx265 accepts
pub const MAX_CRF: u8 = 51;

/// Lossless by default
pub const DEFAULT_CRF: u8 = 0;

/// x265 speed/efficiency presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum X265Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl X265Preset {
    pub const ALL: [Self; 9] = [
        Self::Ultrafast,
        Self::Superfast,
        Self::Veryfast,
        Self::Faster,
        Self::Fast,
        Self::Medium,
        Self::Slow,
        Self::Slower,
        Self::Veryslow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl fmt::Display for X265Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for X265Preset {
    type Err = VideoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == wanted)
            .ok_or_else(|| VideoError::UnsupportedParameter {
                name: "preset",
                reason: format!("unknown x265 preset '{}'", s),
            })
    }
}

/// Caller-controlled encode settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoRequest {
    /// 0 is lossless, higher is smaller and worse
    pub crf: u8,
    pub preset: X265Preset,
}

impl VideoRequest {
    pub fn validate(&self) -> Result<()> {
        if self.crf > MAX_CRF {
            return Err(VideoError::UnsupportedParameter {
                name: "crf",
                reason: format!("{} is outside 0..={}", self.crf, MAX_CRF),
            });
        }
        Ok(())
    }

    pub fn is_lossless(&self) -> bool {
        self.crf == 0
    }

    /// Value for `-x265-params`
    pub fn x265_params(&self) -> String {
        if self.is_lossless() {
            "log-level=error:lossless=1".to_string()
        } else {
            "log-level=error".to_string()
        }
    }
}
