use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use tempfile::TempDir;

pub const WHITE: u8 = 255;
pub const BLACK: u8 = 0;

/// A white grayscale canvas.
pub fn canvas(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([WHITE]))
}

/// Paint an axis-aligned rectangle of `value` onto the canvas.
pub fn fill_rect(img: &mut GrayImage, x: u32, y: u32, width: u32, height: u32, value: u8) {
    for py in y..y + height {
        for px in x..x + width {
            img.put_pixel(px, py, Luma([value]));
        }
    }
}

/// 200x200 filled black square centred in a 500x500 white canvas.
pub fn centered_square() -> DynamicImage {
    let mut img = canvas(500, 500);
    fill_rect(&mut img, 150, 150, 200, 200, BLACK);
    DynamicImage::ImageLuma8(img)
}

/// 300x300 black square with a 100x100 white hole, centred in 500x500.
pub fn ring() -> DynamicImage {
    let mut img = canvas(500, 500);
    fill_rect(&mut img, 100, 100, 300, 300, BLACK);
    fill_rect(&mut img, 200, 200, 100, 100, WHITE);
    DynamicImage::ImageLuma8(img)
}

/// 60x60 black square in a 200x200 canvas with a single white pixel inside.
pub fn square_with_speck() -> DynamicImage {
    let mut img = canvas(200, 200);
    fill_rect(&mut img, 70, 70, 60, 60, BLACK);
    img.put_pixel(100, 100, Luma([WHITE]));
    DynamicImage::ImageLuma8(img)
}

/// Two 50x50 squares 5px apart plus one far away.
pub fn near_pair_and_loner() -> DynamicImage {
    let mut img = canvas(400, 400);
    fill_rect(&mut img, 50, 50, 50, 50, BLACK);
    fill_rect(&mut img, 105, 50, 50, 50, BLACK);
    fill_rect(&mut img, 300, 300, 50, 50, BLACK);
    DynamicImage::ImageLuma8(img)
}

/// A red square on an off-white RGB background.
pub fn colored_square() -> DynamicImage {
    let img = ImageBuffer::from_fn(200, 200, |x, y| {
        if (60..140).contains(&x) && (60..140).contains(&y) {
            Rgb([200u8, 30, 30])
        } else {
            Rgb([245u8, 245, 240])
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Saves the image as PNG under a temp directory with the given file name.
/// Returns the directory (keep it alive) and the file path.
pub fn save_png(img: &DynamicImage, file_name: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(file_name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    (dir, path)
}
