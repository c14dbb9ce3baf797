#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from logo_contours for tests
pub use logo_contours::config::{
    AcceptanceMode, Closure, Config, GroupingConfig, GroupingPolicy, PreprocessConfig,
    PreprocessStrategy,
};
pub use logo_contours::{Catalog, CountBasis, CountError, ShapeCounter};

/// Default config with a global threshold at the given cutoff.
pub fn global_config(cutoff: u8) -> Config {
    Config {
        preprocess: PreprocessConfig {
            strategy: PreprocessStrategy::Global { cutoff },
            blur_sigma: None,
        },
        ..Config::default()
    }
}
