//! Loading inputs and writing outputs.
//!
//! Tests cover:
//! - Counting from a file path, using the file name for catalog lookup
//! - Rejecting corrupt uploads before any contour work
//! - Loading configuration from a JSON file
//! - Debug image output and the overlay

mod common;

use common::*;
use image::Rgb;

#[test]
fn test_count_path_uses_file_name_for_catalog() -> anyhow::Result<()> {
    let (_dir, path) = save_png(&ring(), "Ring Logo.png");
    let mut config = global_config(127);
    config.catalog.insert("ring logo", 1);

    let detection = ShapeCounter::new(config).count_path(&path)?;
    assert_eq!(detection.report.count, 1);
    assert_eq!(detection.report.image_width, 500);
    assert_eq!(detection.report.image_height, 500);
    assert_eq!(detection.report.basis, CountBasis::Catalog { key: "ring logo".into() });
    Ok(())
}

#[test]
fn test_corrupt_upload_fails_fast() {
    let counter = ShapeCounter::default();
    let result = counter.count_bytes(b"definitely not a png", Some("broken.png"));
    assert!(matches!(result, Err(CountError::ImageLoad(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = ShapeCounter::default().count_path("/nonexistent/logo.png");
    assert!(matches!(result, Err(CountError::Io(_))));
}

#[test]
fn test_count_bytes_decodes_png() -> anyhow::Result<()> {
    let mut bytes = Vec::new();
    centered_square().write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    let detection = ShapeCounter::new(global_config(127)).count_bytes(&bytes, None)?;
    assert_eq!(detection.report.count, 1);
    Ok(())
}

#[test]
fn test_config_file_drives_the_run() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{
            "preprocess": { "strategy": { "method": "global", "cutoff": 127 } },
            "grouping": { "policy": "proximity", "margin": 10, "closure": "transitive" },
            "catalog": [ { "key": "hands", "expected_count": 1 } ]
        }"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.grouping.closure, Closure::Transitive);
    assert_eq!(config.catalog.entries().len(), 1);

    let detection = ShapeCounter::new(config).count(&near_pair_and_loner(), Some("logo.png"))?;
    assert_eq!(detection.report.count, 2);
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() {
    let mut config = global_config(127);
    config.scoring.score_threshold = 9;
    let result = ShapeCounter::new(config).count(&ring(), None);
    assert!(matches!(result, Err(CountError::InvalidConfig(_))));
}

#[test]
fn test_debug_output_writes_every_stage() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    let debug_dir = root.path().join("debug");
    let counter = ShapeCounter::new(global_config(127)).with_debug(debug_dir.clone())?;
    counter.count(&ring(), None)?;

    for name in ["00_input.png", "01_binarized.png", "02_all_contours.png", "03_accepted.png"] {
        assert!(debug_dir.join(name).is_file(), "missing {name}");
    }

    let binarized = image::open(debug_dir.join("01_binarized.png"))?.to_luma8();
    assert_eq!(binarized.get_pixel(150, 150)[0], 255);
    assert_eq!(binarized.get_pixel(250, 250)[0], 0);
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    std::fs::write(root.path().join("old.png"), b"x")?;
    let result = ShapeCounter::default().with_debug(root.path().to_path_buf());
    assert!(matches!(result, Err(CountError::DebugDirNotEmpty(_))));
    Ok(())
}

#[test]
fn test_overlay_outlines_counted_shapes() -> anyhow::Result<()> {
    let config = global_config(127);
    let detection = ShapeCounter::new(config.clone()).count(&centered_square(), None)?;
    let overlay = detection.overlay(&config);

    assert_eq!(overlay.dimensions(), (500, 500));
    // Top-left corner of the square lies on its outline.
    assert_eq!(overlay.get_pixel(150, 150), &Rgb([0, 255, 0]));
    // Background and the square's interior keep their gray levels.
    assert_eq!(overlay.get_pixel(20, 20), &Rgb([255, 255, 255]));
    assert_eq!(overlay.get_pixel(250, 250), &Rgb([0, 0, 0]));
    Ok(())
}

#[test]
fn test_example_config_parses() -> anyhow::Result<()> {
    let config = Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config/example.json"))?;
    assert_eq!(config.scoring.mode, AcceptanceMode::Strict);
    assert_eq!(config.scoring.max_relative_area, 0.7);
    assert_eq!(config.catalog.lookup("Sitka Salmon.png").map(|e| e.expected_count), Some(12));
    Ok(())
}
