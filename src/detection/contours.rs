use imageproc::contours::find_contours;
use tracing::debug;

use crate::config::RetrievalMode;
use crate::detection::preprocessing::BinaryMask;
use crate::models::{Contour, ContourSet};

/// Trace the boundaries of foreground regions in a binary mask.
///
/// In [`RetrievalMode::Tree`] every outer border and hole border is kept along
/// with the index of its enclosing contour. [`RetrievalMode::External`] keeps
/// only top-level borders.
pub fn extract_contours(mask: &BinaryMask, mode: RetrievalMode) -> ContourSet {
    let (width, height) = mask.dimensions();
    let traced = find_contours::<i32>(mask.as_image());

    let contours: Vec<Contour> = match mode {
        RetrievalMode::Tree => traced
            .into_iter()
            .map(|c| Contour::new(c.points, c.parent, c.border_type.into()))
            .collect(),
        RetrievalMode::External => traced
            .into_iter()
            .filter(|c| c.parent.is_none())
            .map(|c| Contour::new(c.points, None, c.border_type.into()))
            .collect(),
    };

    debug!(count = contours.len(), ?mode, "extracted contours");
    ContourSet::new(contours, width, height)
}
