use imageproc::contours::BorderType;
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use serde::Serialize;

/// Whether a boundary was traced around a foreground region or around a hole in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderKind {
    Outer,
    Hole,
}

impl From<BorderType> for BorderKind {
    fn from(border: BorderType) -> Self {
        match border {
            BorderType::Outer => BorderKind::Outer,
            BorderType::Hole => BorderKind::Hole,
        }
    }
}

/// Axis-aligned box in pixel coordinates.
///
/// `width` and `height` are pixel-inclusive, so a single pixel has a 1x1 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> i64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0 || h <= 0 {
            return 0;
        }
        w as i64 * h as i64
    }

    pub fn union_area(&self, other: &BoundingBox) -> i64 {
        self.area() + other.area() - self.intersection_area(other)
    }

    /// Intersection over union, 0 when both boxes are empty.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let union = self.union_area(other);
        if union <= 0 {
            return 0.0;
        }
        self.intersection_area(other) as f64 / union as f64
    }

    /// True when the boxes overlap or are closer than `margin` pixels on both axes.
    pub fn expanded_overlaps(&self, other: &BoundingBox, margin: i32) -> bool {
        !(self.right() + margin < other.x
            || other.right() + margin < self.x
            || self.bottom() + margin < other.y
            || other.bottom() + margin < self.y)
    }
}

/// A closed polygon boundary produced by one extraction pass.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    /// Index of the enclosing contour in the same [`ContourSet`].
    pub parent: Option<usize>,
    pub border: BorderKind,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>, parent: Option<usize>, border: BorderKind) -> Self {
        Self { points, parent, border }
    }

    /// Shoelace area; positive for counter-clockwise traversal in image coordinates.
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn convex_hull(&self) -> Vec<Point<i32>> {
        if self.points.len() < 3 {
            return self.points.clone();
        }
        convex_hull(self.points.as_slice())
    }

    pub fn convex_hull_area(&self) -> f64 {
        shoelace(&self.convex_hull()).abs()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let Some(first) = self.points.first() else {
            return BoundingBox::new(0, 0, 0, 0);
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// `width / height` of the bounding box, 0 for a zero-height box.
    pub fn aspect_ratio(&self) -> f64 {
        aspect_ratio(&self.bounding_box())
    }

    pub fn is_hole(&self) -> bool {
        self.parent.is_some()
    }
}

pub fn aspect_ratio(bbox: &BoundingBox) -> f64 {
    if bbox.height == 0 {
        return 0.0;
    }
    bbox.width as f64 / bbox.height as f64
}

fn shoelace(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    twice as f64 / 2.0
}

/// All contours from one extraction pass plus the dimensions of the source image.
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    pub contours: Vec<Contour>,
    pub width: u32,
    pub height: u32,
}

impl ContourSet {
    pub fn new(contours: Vec<Contour>, width: u32, height: u32) -> Self {
        Self { contours, width, height }
    }

    pub fn image_area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contour> {
        self.contours.get(index)
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.contours.get(index).and_then(|c| c.parent)
    }

    /// Indices of top-level contours.
    pub fn roots(&self) -> Vec<usize> {
        self.contours
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn children_of(&self, index: usize) -> Vec<usize> {
        self.contours
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Geometry derived from a non-degenerate contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContourMetrics {
    pub area: f64,
    pub hull_area: f64,
    pub solidity: f64,
    pub aspect_ratio: f64,
    pub relative_area: f64,
    pub bbox: BoundingBox,
    pub is_hole: bool,
}

/// Outcome of scoring one contour within a single filtering pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredContour {
    pub index: usize,
    /// Number of predicates satisfied, 0 for degenerate contours.
    pub score: u8,
    /// Ranking key used by top-N selection.
    pub rank_score: i64,
    pub accepted: bool,
    /// `None` when the contour was rejected by the degenerate-geometry guard.
    pub metrics: Option<ContourMetrics>,
}

/// Contour indices judged to be one logical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub members: Vec<usize>,
    /// The seed member; drawn and counted for the group.
    pub representative: usize,
}

impl Group {
    pub fn singleton(index: usize) -> Self {
        Self { members: vec![index], representative: index }
    }
}
