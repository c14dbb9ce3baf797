pub mod preprocessing;
pub mod contours;
pub mod scoring;
pub mod grouping;

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageReader, RgbImage};
use tracing::{debug, info};

use crate::config::Config;
use crate::debug::DebugOutput;
use crate::error::Result;
use crate::models::{ContourSet, Group};
use crate::report::{CountBasis, Report, render_overlay};
use scoring::Selector;

/// Everything produced by one run: the report plus what is needed to draw it.
#[derive(Debug, Clone)]
pub struct Detection {
    pub report: Report,
    pub contours: ContourSet,
    pub gray: GrayImage,
}

impl Detection {
    /// Grayscale image with every counted shape outlined.
    pub fn overlay(&self, config: &Config) -> RgbImage {
        render_overlay(&self.gray, &self.contours, &self.report.shape_indices(), &config.render)
    }
}

/// Counts closed shapes in a logo image.
///
/// Runs binarize → extract → score → group → report once per call; nothing is
/// carried between calls.
pub struct ShapeCounter {
    config: Config,
    debug: Option<DebugOutput>,
}

impl ShapeCounter {
    pub fn new(config: Config) -> Self {
        Self { config, debug: None }
    }

    /// Save intermediate images to `output_dir`, which must be empty or missing.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(DebugOutput::new(output_dir)?);
        Ok(self)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode an image file and count its shapes, using the file name for catalog lookup.
    pub fn count_path<P: AsRef<Path>>(&self, path: P) -> Result<Detection> {
        let path = path.as_ref();
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        self.count(&img, name.as_deref())
    }

    /// Decode in-memory image bytes (an upload) and count its shapes.
    pub fn count_bytes(&self, bytes: &[u8], name: Option<&str>) -> Result<Detection> {
        let img = image::load_from_memory(bytes)?;
        self.count(&img, name)
    }

    /// Run the full pipeline on a decoded image.
    pub fn count(&self, img: &DynamicImage, name: Option<&str>) -> Result<Detection> {
        self.config.validate()?;
        info!(width = img.width(), height = img.height(), name, "counting shapes");

        // Step 1: Binarize
        let mask = preprocessing::binarize(img, &self.config.preprocess)?;

        // Step 2: Extract contours with hierarchy
        let contours = contours::extract_contours(&mask, self.config.retrieval);
        info!(count = contours.len(), "found contours");

        // Step 3: Score and select
        let (selector, basis, expected) = self.resolve_selector(name);
        let selection = scoring::select(&contours, &self.config.scoring, selector);
        info!(accepted = selection.accepted_count(), "scored contours");

        // Step 4: Group, only when the count is not pinned by top-N
        let groups = match selector {
            Selector::Threshold(_) => self.group_accepted(&contours, &selection.accepted),
            Selector::TopN(_) => selection.accepted.iter().copied().map(Group::singleton).collect(),
        };

        let report = Report {
            count: groups.len(),
            expected,
            basis,
            image_width: img.width(),
            image_height: img.height(),
            contours: selection.scored,
            groups,
        };
        info!("{}", report.summary_line());

        let gray = preprocessing::to_grayscale(img);
        let detection = Detection { report, contours, gray };

        if let Some(debug) = &self.debug {
            debug.save(0, "input", img)?;
            debug.save(1, "binarized", &DynamicImage::ImageLuma8(mask.into_image()))?;
            let all: Vec<usize> = (0..detection.contours.len()).collect();
            let everything =
                render_overlay(&detection.gray, &detection.contours, &all, &self.config.render);
            debug.save(2, "all contours", &DynamicImage::ImageRgb8(everything))?;
            let accepted = detection.overlay(&self.config);
            debug.save(3, "accepted", &DynamicImage::ImageRgb8(accepted))?;
        }

        Ok(detection)
    }

    /// Explicit count beats a catalog match; with neither, fall back to threshold scoring.
    /// A known count of zero is treated as unknown.
    fn resolve_selector(&self, name: Option<&str>) -> (Selector, CountBasis, Option<usize>) {
        if let Some(n) = self.config.expected_count.filter(|&n| n > 0) {
            debug!(expected = n, "using caller-supplied shape count");
            return (Selector::TopN(n), CountBasis::Override, Some(n));
        }
        if let Some(entry) = name
            .and_then(|n| self.config.catalog.lookup(n))
            .filter(|entry| entry.expected_count > 0)
        {
            debug!(key = %entry.key, expected = entry.expected_count, "matched catalog entry");
            return (
                Selector::TopN(entry.expected_count),
                CountBasis::Catalog { key: entry.key.clone() },
                Some(entry.expected_count),
            );
        }
        info!(name, "no known shape count, using heuristic count");
        (Selector::Threshold(self.config.scoring.mode), CountBasis::Heuristic, None)
    }

    fn group_accepted(&self, contours: &ContourSet, accepted: &[usize]) -> Vec<Group> {
        let boxes: Vec<_> = accepted
            .iter()
            .map(|&i| contours.contours[i].bounding_box())
            .collect();
        grouping::group(&boxes, &self.config.grouping)
            .into_iter()
            .map(|g| Group {
                members: g.members.iter().map(|&m| accepted[m]).collect(),
                representative: accepted[g.representative],
            })
            .collect()
    }
}

impl Default for ShapeCounter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
