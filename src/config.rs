//! Run configuration.
//!
//! Every tunable of the pipeline lives here with a named default, so a run is
//! fully described by one [`Config`] value. Configs load from JSON; any field
//! left out takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{CountError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preprocess: PreprocessConfig,
    pub retrieval: RetrievalMode,
    pub scoring: ScoringConfig,
    pub grouping: GroupingConfig,
    pub render: RenderStyle,
    pub catalog: Catalog,
    /// Known shape count; enables top-N selection and wins over the catalog.
    pub expected_count: Option<usize>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.preprocess.validate()?;
        self.scoring.validate()?;
        self.grouping.validate()?;
        if self.render.stroke_width == 0 {
            return Err(CountError::InvalidConfig("stroke_width must be at least 1".into()));
        }
        Ok(())
    }
}

/// Binarization strategy. Foreground pixels become 255 in the mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum PreprocessStrategy {
    /// Foreground iff luma < `cutoff`.
    Global { cutoff: u8 },
    /// Foreground iff luma <= local box mean - `offset`.
    AdaptiveMean { block_size: u32, offset: f32 },
    /// Foreground iff luma <= local Gaussian-weighted mean - `offset`.
    AdaptiveGaussian { block_size: u32, offset: f32 },
    /// Foreground iff the RGB distance to the top-left pixel exceeds `threshold`.
    #[serde(alias = "bg-color-distance")]
    BgDistance { threshold: f32 },
}

impl Default for PreprocessStrategy {
    fn default() -> Self {
        PreprocessStrategy::AdaptiveGaussian { block_size: 21, offset: 7.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub strategy: PreprocessStrategy,
    /// Gaussian blur applied to the grayscale image before thresholding.
    pub blur_sigma: Option<f32>,
}

impl PreprocessConfig {
    pub fn validate(&self) -> Result<()> {
        match self.strategy {
            PreprocessStrategy::AdaptiveMean { block_size, .. }
            | PreprocessStrategy::AdaptiveGaussian { block_size, .. } => {
                if block_size < 3 || block_size % 2 == 0 {
                    return Err(CountError::InvalidConfig(format!(
                        "block_size must be odd and at least 3, got {block_size}"
                    )));
                }
            }
            PreprocessStrategy::BgDistance { threshold } if threshold < 0.0 => {
                return Err(CountError::InvalidConfig(format!(
                    "color distance threshold must be non-negative, got {threshold}"
                )));
            }
            _ => {}
        }
        if let Some(sigma) = self.blur_sigma {
            if sigma <= 0.0 {
                return Err(CountError::InvalidConfig(format!(
                    "blur_sigma must be positive, got {sigma}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Every contour with its nesting hierarchy.
    #[default]
    Tree,
    /// Top-level contours only.
    External,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptanceMode {
    /// Accept when at least `score_threshold` of the four predicates hold.
    #[default]
    Majority,
    /// Accept only when size, solidity and aspect ratio all hold.
    Strict,
}

/// Which contours compete in top-N ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPool {
    #[default]
    All,
    /// Only contours that pass strict filtering; may yield fewer than N.
    Filtered,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Contours below this many square pixels are rejected before scoring.
    pub min_area_px: f64,
    pub min_relative_area: f64,
    pub max_relative_area: f64,
    pub min_solidity: f64,
    /// Open interval the bounding-box aspect ratio must fall in.
    pub aspect_ratio_band: (f64, f64),
    pub score_threshold: u8,
    pub hole_bonus: i64,
    pub mode: AcceptanceMode,
    pub rank_pool: RankPool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_area_px: 10.0,
            min_relative_area: 0.0005,
            max_relative_area: 1.0,
            min_solidity: 0.3,
            aspect_ratio_band: (0.1, 10.0),
            score_threshold: 3,
            hole_bonus: 5000,
            mode: AcceptanceMode::Majority,
            rank_pool: RankPool::All,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_relative_area >= self.max_relative_area {
            return Err(CountError::InvalidConfig(format!(
                "relative area bounds are empty: ({}, {}]",
                self.min_relative_area, self.max_relative_area
            )));
        }
        if !(0.0..1.0).contains(&self.min_solidity) {
            return Err(CountError::InvalidConfig(format!(
                "min_solidity must be in [0, 1), got {}",
                self.min_solidity
            )));
        }
        let (lo, hi) = self.aspect_ratio_band;
        if lo >= hi {
            return Err(CountError::InvalidConfig(format!("aspect ratio band is empty: ({lo}, {hi})")));
        }
        if self.score_threshold > 4 {
            return Err(CountError::InvalidConfig(format!(
                "score_threshold must be at most 4, got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingPolicy {
    #[default]
    None,
    Proximity,
    Iou,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Closure {
    /// Candidates are compared with the group seed only.
    #[default]
    Seed,
    /// Connected components of the merge relation.
    Transitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub policy: GroupingPolicy,
    pub margin: i32,
    pub iou_threshold: f64,
    pub closure: Closure,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            policy: GroupingPolicy::None,
            margin: 10,
            iou_threshold: 0.2,
            closure: Closure::Seed,
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.margin < 0 {
            return Err(CountError::InvalidConfig(format!(
                "proximity margin must be non-negative, got {}",
                self.margin
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(CountError::InvalidConfig(format!(
                "iou_threshold must be in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub color: [u8; 3],
    pub stroke_width: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self { color: [0, 255, 0], stroke_width: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().expect("default config should validate");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{
                "preprocess": { "strategy": { "method": "global", "cutoff": 180 } },
                "scoring": { "min_solidity": 0.2 },
                "grouping": { "policy": "proximity", "margin": 15 }
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.preprocess.strategy, PreprocessStrategy::Global { cutoff: 180 });
        assert_eq!(config.scoring.min_solidity, 0.2);
        assert_eq!(config.scoring.score_threshold, 3);
        assert_eq!(config.grouping.policy, GroupingPolicy::Proximity);
        assert_eq!(config.grouping.margin, 15);
        assert_eq!(config.grouping.iou_threshold, 0.2);
        assert_eq!(config.retrieval, RetrievalMode::Tree);
        assert!(config.expected_count.is_none());
    }

    #[test]
    fn test_even_block_size_rejected() {
        let result = Config::from_json(
            r#"{ "preprocess": { "strategy": { "method": "adaptive-mean", "block_size": 10, "offset": 5 } } }"#,
        );
        assert!(matches!(result, Err(CountError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_aspect_band_rejected() {
        let scoring = ScoringConfig { aspect_ratio_band: (5.0, 0.2), ..Default::default() };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(Config::from_json("{ nope"), Err(CountError::Config(_))));
    }
}
