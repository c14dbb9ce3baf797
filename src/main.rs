use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use logo_contours::ShapeCounter;
use logo_contours::config::{
    AcceptanceMode, Closure, Config, GroupingPolicy, PreprocessStrategy,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Strategy {
    Global,
    AdaptiveMean,
    AdaptiveGaussian,
    BgDistance,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Grouping {
    None,
    Proximity,
    Iou,
}

#[derive(Parser)]
#[command(name = "logo-contours")]
#[command(about = "Count the closed shapes in a logo image")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON configuration file; flags below override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Binarization strategy
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Global threshold cutoff
    #[arg(long)]
    cutoff: Option<u8>,

    /// Adaptive threshold neighbourhood size (odd)
    #[arg(long)]
    block_size: Option<u32>,

    /// Adaptive threshold offset subtracted from the local mean
    #[arg(long)]
    offset: Option<f32>,

    /// Background colour distance threshold
    #[arg(long)]
    color_distance: Option<f32>,

    #[arg(long)]
    min_relative_area: Option<f64>,

    #[arg(long)]
    min_solidity: Option<f64>,

    #[arg(long)]
    aspect_min: Option<f64>,

    #[arg(long)]
    aspect_max: Option<f64>,

    /// Predicates (of 4) a contour must satisfy
    #[arg(long)]
    score_threshold: Option<u8>,

    /// Require size, solidity and aspect ratio to all pass instead of a majority
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum)]
    grouping: Option<Grouping>,

    /// Proximity grouping margin in pixels
    #[arg(long)]
    margin: Option<i32>,

    #[arg(long)]
    iou_threshold: Option<f64>,

    /// Merge chains of nearby contours instead of comparing with the seed only
    #[arg(long)]
    transitive: bool,

    /// Known shape count; keeps exactly the top N contours
    #[arg(long)]
    expected: Option<usize>,

    /// Where to write the overlay image
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// List every contour with its metrics
    #[arg(long)]
    list: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn build_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.preprocess.strategy = self.merge_strategy(config.preprocess.strategy);

        let scoring = &mut config.scoring;
        if let Some(v) = self.min_relative_area {
            scoring.min_relative_area = v;
        }
        if let Some(v) = self.min_solidity {
            scoring.min_solidity = v;
        }
        if let Some(v) = self.aspect_min {
            scoring.aspect_ratio_band.0 = v;
        }
        if let Some(v) = self.aspect_max {
            scoring.aspect_ratio_band.1 = v;
        }
        if let Some(v) = self.score_threshold {
            scoring.score_threshold = v;
        }
        if self.strict {
            scoring.mode = AcceptanceMode::Strict;
        }

        let grouping = &mut config.grouping;
        if let Some(policy) = self.grouping {
            grouping.policy = match policy {
                Grouping::None => GroupingPolicy::None,
                Grouping::Proximity => GroupingPolicy::Proximity,
                Grouping::Iou => GroupingPolicy::Iou,
            };
        }
        if let Some(v) = self.margin {
            grouping.margin = v;
        }
        if let Some(v) = self.iou_threshold {
            grouping.iou_threshold = v;
        }
        if self.transitive {
            grouping.closure = Closure::Transitive;
        }

        if self.expected.is_some() {
            config.expected_count = self.expected;
        }

        config.validate()?;
        Ok(config)
    }

    /// Keep the configured strategy's parameters unless `--strategy` switches method,
    /// then apply whichever parameter flags were given.
    fn merge_strategy(&self, current: PreprocessStrategy) -> PreprocessStrategy {
        let (block_size, offset) = match current {
            PreprocessStrategy::AdaptiveMean { block_size, offset }
            | PreprocessStrategy::AdaptiveGaussian { block_size, offset } => (block_size, offset),
            _ => (21, 7.0),
        };

        let base = match (self.strategy, current) {
            (None, _)
            | (Some(Strategy::Global), PreprocessStrategy::Global { .. })
            | (Some(Strategy::BgDistance), PreprocessStrategy::BgDistance { .. }) => current,
            (Some(Strategy::Global), _) => PreprocessStrategy::Global { cutoff: 127 },
            (Some(Strategy::AdaptiveMean), _) => PreprocessStrategy::AdaptiveMean { block_size, offset },
            (Some(Strategy::AdaptiveGaussian), _) => {
                PreprocessStrategy::AdaptiveGaussian { block_size, offset }
            }
            (Some(Strategy::BgDistance), _) => PreprocessStrategy::BgDistance { threshold: 30.0 },
        };

        match base {
            PreprocessStrategy::Global { cutoff } => PreprocessStrategy::Global {
                cutoff: self.cutoff.unwrap_or(cutoff),
            },
            PreprocessStrategy::AdaptiveMean { block_size, offset } => PreprocessStrategy::AdaptiveMean {
                block_size: self.block_size.unwrap_or(block_size),
                offset: self.offset.unwrap_or(offset),
            },
            PreprocessStrategy::AdaptiveGaussian { block_size, offset } => {
                PreprocessStrategy::AdaptiveGaussian {
                    block_size: self.block_size.unwrap_or(block_size),
                    offset: self.offset.unwrap_or(offset),
                }
            }
            PreprocessStrategy::BgDistance { threshold } => PreprocessStrategy::BgDistance {
                threshold: self.color_distance.unwrap_or(threshold),
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.build_config()?;

    let mut counter = ShapeCounter::new(config);
    if let Some(debug_dir) = args.debug_out.clone() {
        counter = counter.with_debug(debug_dir)?;
    }

    tracing::info!(path = %args.image_path.display(), "loading image");
    let detection = counter
        .count_path(&args.image_path)
        .map_err(|e| anyhow::anyhow!("{}: {}", args.image_path.display(), e))?;
    let report = &detection.report;

    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.summary_line());
        if args.list {
            println!("\nContours ({} total):", report.contours.len());
            for line in report.listing() {
                println!("{}", line);
            }
        }
    }

    if let Some(output) = &args.output {
        detection
            .overlay(counter.config())
            .save(output)
            .map_err(|e| anyhow::anyhow!("Failed to save overlay: {}", e))?;
        tracing::info!(path = %output.display(), "saved overlay");
    }

    Ok(())
}
