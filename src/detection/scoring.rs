//! Contour scoring and selection.
//!
//! Each contour is judged on four independent predicates:
//!
//! 1. relative size: `area / image_area` in `(min_relative_area, max_relative_area]`
//! 2. solidity: `area / hull_area` in `(min_solidity, 1.0]`
//! 3. aspect ratio: `width / height` strictly inside `aspect_ratio_band`
//! 4. hole: the contour has a parent in the hierarchy
//!
//! Contours under `min_area_px`, or with a zero-area hull, are degenerate and
//! score 0 without evaluating any predicate.
//!
//! Top-N selection ranks non-degenerate contours by
//! `floor(area) + hole_bonus * is_hole` and is only meaningful for logos whose
//! shape count is already known.

use tracing::{debug, trace};

use crate::config::{AcceptanceMode, RankPool, ScoringConfig};
use crate::models::{Contour, ContourMetrics, ContourSet, ScoredContour, aspect_ratio};

/// How the accepted set was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Threshold(AcceptanceMode),
    TopN(usize),
}

/// Result of one filtering pass over a [`ContourSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// One entry per contour, in extraction order.
    pub scored: Vec<ScoredContour>,
    /// Accepted indices: extraction order for threshold modes, rank order for top-N.
    pub accepted: Vec<usize>,
}

impl Selection {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// Geometry for a contour, or `None` when it is degenerate.
pub fn metrics(contour: &Contour, image_area: f64, config: &ScoringConfig) -> Option<ContourMetrics> {
    let area = contour.area();
    if area < config.min_area_px {
        return None;
    }
    let hull_area = contour.convex_hull_area();
    if hull_area <= 0.0 {
        return None;
    }
    let bbox = contour.bounding_box();
    let relative_area = if image_area > 0.0 { area / image_area } else { 0.0 };
    Some(ContourMetrics {
        area,
        hull_area,
        solidity: (area / hull_area).min(1.0),
        aspect_ratio: aspect_ratio(&bbox),
        relative_area,
        bbox,
        is_hole: contour.is_hole(),
    })
}

pub fn passes_relative_size(m: &ContourMetrics, config: &ScoringConfig) -> bool {
    m.relative_area > config.min_relative_area && m.relative_area <= config.max_relative_area
}

pub fn passes_solidity(m: &ContourMetrics, config: &ScoringConfig) -> bool {
    m.solidity > config.min_solidity && m.solidity <= 1.0
}

pub fn passes_aspect_ratio(m: &ContourMetrics, config: &ScoringConfig) -> bool {
    let (lo, hi) = config.aspect_ratio_band;
    m.aspect_ratio > lo && m.aspect_ratio < hi
}

/// All hard filters pass; the hole predicate is a bonus, not a filter.
pub fn passes_strict(m: &ContourMetrics, config: &ScoringConfig) -> bool {
    passes_relative_size(m, config) && passes_solidity(m, config) && passes_aspect_ratio(m, config)
}

/// Number of satisfied predicates, 0 to 4.
pub fn predicate_score(m: &ContourMetrics, config: &ScoringConfig) -> u8 {
    [
        passes_relative_size(m, config),
        passes_solidity(m, config),
        passes_aspect_ratio(m, config),
        m.is_hole,
    ]
    .into_iter()
    .filter(|&p| p)
    .count() as u8
}

/// Score a contour in `0..=4`; degenerate contours score 0.
pub fn score(contour: &Contour, image_area: f64, config: &ScoringConfig) -> u8 {
    metrics(contour, image_area, config).map_or(0, |m| predicate_score(&m, config))
}

/// Top-N ranking key.
pub fn rank_score(area: f64, is_hole: bool, hole_bonus: i64) -> i64 {
    area.floor() as i64 + if is_hole { hole_bonus } else { 0 }
}

/// Score every contour and pick the accepted ones.
pub fn select(set: &ContourSet, config: &ScoringConfig, selector: Selector) -> Selection {
    let image_area = set.image_area();
    let mut scored: Vec<ScoredContour> = set
        .contours
        .iter()
        .enumerate()
        .map(|(index, contour)| {
            let metrics = metrics(contour, image_area, config);
            let score = metrics.as_ref().map_or(0, |m| predicate_score(m, config));
            let rank_score = rank_score(contour.area(), contour.is_hole(), config.hole_bonus);
            trace!(index, score, rank_score, ?metrics, "scored contour");
            ScoredContour { index, score, rank_score, accepted: false, metrics }
        })
        .collect();

    let accepted = match selector {
        Selector::Threshold(mode) => scored
            .iter()
            .filter(|s| accepts(s, mode, config))
            .map(|s| s.index)
            .collect(),
        Selector::TopN(count) => top_n(&scored, count, config),
    };

    for &index in &accepted {
        scored[index].accepted = true;
    }

    debug!(
        total = scored.len(),
        accepted = accepted.len(),
        ?selector,
        "selected contours"
    );
    Selection { scored, accepted }
}

fn accepts(s: &ScoredContour, mode: AcceptanceMode, config: &ScoringConfig) -> bool {
    match (mode, &s.metrics) {
        (_, None) => false,
        (AcceptanceMode::Majority, Some(_)) => s.score >= config.score_threshold,
        (AcceptanceMode::Strict, Some(m)) => passes_strict(m, config),
    }
}

fn top_n(scored: &[ScoredContour], count: usize, config: &ScoringConfig) -> Vec<usize> {
    let mut pool: Vec<&ScoredContour> = match config.rank_pool {
        RankPool::All => scored.iter().filter(|s| s.metrics.is_some()).collect(),
        RankPool::Filtered => scored
            .iter()
            .filter(|s| accepts(s, AcceptanceMode::Strict, config))
            .collect(),
    };
    // Stable: equal keys keep extraction order.
    pool.sort_by(|a, b| b.rank_score.cmp(&a.rank_score));
    pool.into_iter().take(count).map(|s| s.index).collect()
}
