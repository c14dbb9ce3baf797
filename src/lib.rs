pub mod catalog;
pub mod config;
pub mod debug;
pub mod detection;
pub mod error;
pub mod models;
pub mod report;

pub use catalog::{Catalog, CatalogEntry};
pub use config::Config;
pub use detection::{Detection, ShapeCounter};
pub use error::{CountError, Result};
pub use models::{BoundingBox, Contour, ContourSet, Group, ScoredContour};
pub use report::{CountBasis, Report};
