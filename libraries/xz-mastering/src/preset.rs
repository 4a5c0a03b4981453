//! Compression presets
//!
//! Each mode is a fixed acompressor configuration. The threshold is not part
//! of the preset: it is derived per input from measured loudness, with the
//! preset only contributing `base_offset_db`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compressor character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompressionMode {
    /// Quick attack and release, dense result
    Fast,
    #[default]
    Balanced,
    /// Gentle, transparent levelling
    Slow,
}

impl CompressionMode {
    pub const ALL: [Self; 3] = [Self::Fast, Self::Balanced, Self::Slow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Balanced => "Balanced",
            Self::Slow => "Slow",
        }
    }

    pub const fn preset(self) -> CompressionPreset {
        match self {
            Self::Fast => CompressionPreset {
                base_offset_db: 6.0,
                ratio: 3.0,
                attack_ms: 10.0,
                release_ms: 50.0,
                knee_db: 2.0,
                makeup_db: 2.0,
            },
            Self::Balanced => CompressionPreset {
                base_offset_db: 4.0,
                ratio: 2.0,
                attack_ms: 20.0,
                release_ms: 250.0,
                knee_db: 2.8,
                makeup_db: 0.0,
            },
            Self::Slow => CompressionPreset {
                base_offset_db: 2.0,
                ratio: 1.5,
                attack_ms: 50.0,
                release_ms: 500.0,
                knee_db: 4.0,
                makeup_db: 3.0,
            },
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "slow" => Ok(Self::Slow),
            other => Err(format!("unknown compression mode '{}'", other)),
        }
    }
}

/// Fixed compressor settings for one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionPreset {
    /// Added to the loudness-derived threshold
    pub base_offset_db: f64,
    pub ratio: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
    pub knee_db: f64,
    pub makeup_db: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_table() {
        let fast = CompressionMode::Fast.preset();
        assert_eq!(fast.base_offset_db, 6.0);
        assert_eq!(fast.ratio, 3.0);
        assert_eq!((fast.attack_ms, fast.release_ms), (10.0, 50.0));

        let balanced = CompressionMode::Balanced.preset();
        assert_eq!(balanced.ratio, 2.0);
        assert_eq!(balanced.knee_db, 2.8);

        let slow = CompressionMode::Slow.preset();
        assert_eq!(slow.base_offset_db, 2.0);
        assert_eq!(slow.release_ms, 500.0);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("fast".parse::<CompressionMode>(), Ok(CompressionMode::Fast));
        assert_eq!(" Slow ".parse::<CompressionMode>(), Ok(CompressionMode::Slow));
        assert!("medium".parse::<CompressionMode>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        for mode in CompressionMode::ALL {
            assert_eq!(mode.to_string(), mode.as_str());
        }
    }
}
