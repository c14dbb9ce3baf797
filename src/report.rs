use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use serde::Serialize;

use crate::config::RenderStyle;
use crate::models::{Contour, ContourSet, Group, ScoredContour};

/// Where the final count came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "basis", rename_all = "kebab-case")]
pub enum CountBasis {
    /// Threshold scoring, no known count for this image.
    Heuristic,
    /// Top-N with a count supplied by the caller.
    Override,
    /// Top-N with a count taken from the catalog entry `key`.
    Catalog { key: String },
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub count: usize,
    pub expected: Option<usize>,
    pub basis: CountBasis,
    pub image_width: u32,
    pub image_height: u32,
    /// Every extracted contour with its score, in extraction order.
    pub contours: Vec<ScoredContour>,
    /// Groups over contour indices; one representative each is counted.
    pub groups: Vec<Group>,
}

impl Report {
    /// Representative contour index of every counted shape.
    pub fn shape_indices(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.representative).collect()
    }

    pub fn summary_line(&self) -> String {
        match (&self.basis, self.expected) {
            (CountBasis::Heuristic, _) => {
                format!("Detected closed contours: {} (using heuristic count)", self.count)
            }
            (_, Some(expected)) => {
                format!("Detected closed contours: {} (expected {})", self.count, expected)
            }
            (_, None) => format!("Detected closed contours: {}", self.count),
        }
    }

    /// One line per contour: index, area and how it fared.
    pub fn listing(&self) -> Vec<String> {
        self.contours
            .iter()
            .map(|s| match &s.metrics {
                Some(m) => format!(
                    "  #{:<4} area={:<10.1} hull={:<10.1} solidity={:.3} aspect={:.2} hole={} score={} rank={} {}",
                    s.index,
                    m.area,
                    m.hull_area,
                    m.solidity,
                    m.aspect_ratio,
                    m.is_hole,
                    s.score,
                    s.rank_score,
                    if s.accepted { "accepted" } else { "rejected" },
                ),
                None => format!(
                    "  #{:<4} degenerate rank={} {}",
                    s.index,
                    s.rank_score,
                    if s.accepted { "accepted" } else { "rejected" },
                ),
            })
            .collect()
    }
}

/// Draw the given contours over a grayscale copy of the image.
pub fn render_overlay(
    base: &GrayImage,
    set: &ContourSet,
    indices: &[usize],
    style: &RenderStyle,
) -> RgbImage {
    let mut canvas = image::DynamicImage::ImageLuma8(base.clone()).to_rgb8();
    let color = Rgb(style.color);
    for contour in indices.iter().filter_map(|&i| set.get(i)) {
        draw_contour(&mut canvas, contour, color, style.stroke_width);
    }
    canvas
}

fn draw_contour(canvas: &mut RgbImage, contour: &Contour, color: Rgb<u8>, stroke_width: u32) {
    let n = contour.points.len();
    if n == 0 {
        return;
    }
    let lo = -((stroke_width.max(1) as i32 - 1) / 2);
    let hi = lo + stroke_width.max(1) as i32 - 1;

    for i in 0..n {
        let a = contour.points[i];
        let b = contour.points[(i + 1) % n];
        for ox in lo..=hi {
            for oy in lo..=hi {
                draw_line_segment_mut(
                    canvas,
                    ((a.x + ox) as f32, (a.y + oy) as f32),
                    ((b.x + ox) as f32, (b.y + oy) as f32),
                    color,
                );
            }
        }
    }
}
