use image::{DynamicImage, GrayImage, Luma, Rgb};
use imageproc::filter::{box_filter, gaussian_blur_f32};
use tracing::debug;

use crate::config::{PreprocessConfig, PreprocessStrategy};
use crate::error::Result;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Foreground/background bitmap: 255 marks foreground, 0 background.
#[derive(Debug, Clone)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    pub fn from_gray(image: GrayImage) -> Self {
        Self(image)
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel_checked(x, y).is_some_and(|p| p[0] > 0)
    }

    pub fn foreground_count(&self) -> usize {
        self.0.pixels().filter(|p| p[0] > 0).count()
    }
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Binarize an image with the configured strategy.
pub fn binarize(img: &DynamicImage, config: &PreprocessConfig) -> Result<BinaryMask> {
    config.validate()?;

    let mask = match config.strategy {
        PreprocessStrategy::Global { cutoff } => {
            global_threshold(&prepared_gray(img, config.blur_sigma), cutoff)
        }
        PreprocessStrategy::AdaptiveMean { block_size, offset } => {
            adaptive_mean_threshold(&prepared_gray(img, config.blur_sigma), block_size, offset)
        }
        PreprocessStrategy::AdaptiveGaussian { block_size, offset } => {
            adaptive_gaussian_threshold(&prepared_gray(img, config.blur_sigma), block_size, offset)
        }
        PreprocessStrategy::BgDistance { threshold } => background_distance_mask(img, threshold),
    };

    debug!(
        strategy = ?config.strategy,
        foreground = mask.foreground_count(),
        "binarized image"
    );
    Ok(mask)
}

fn prepared_gray(img: &DynamicImage, blur_sigma: Option<f32>) -> GrayImage {
    let gray = to_grayscale(img);
    match blur_sigma {
        Some(sigma) => gaussian_blur_f32(&gray, sigma),
        None => gray,
    }
}

/// Foreground where intensity is strictly below `cutoff`.
pub fn global_threshold(gray: &GrayImage, cutoff: u8) -> BinaryMask {
    BinaryMask(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] < cutoff { FOREGROUND } else { BACKGROUND }
    }))
}

/// Foreground where a pixel is at least `offset` darker than the plain mean of
/// its `block_size x block_size` neighbourhood. Borders replicate edge pixels.
pub fn adaptive_mean_threshold(gray: &GrayImage, block_size: u32, offset: f32) -> BinaryMask {
    let radius = block_size / 2;
    let local_mean = box_filter(gray, radius, radius);
    compare_to_local(gray, &local_mean, offset)
}

/// Like [`adaptive_mean_threshold`] with a Gaussian-weighted neighbourhood mean.
pub fn adaptive_gaussian_threshold(gray: &GrayImage, block_size: u32, offset: f32) -> BinaryMask {
    let local_mean = gaussian_blur_f32(gray, gaussian_sigma(block_size));
    compare_to_local(gray, &local_mean, offset)
}

/// Sigma used for an odd Gaussian window of `block_size` pixels.
pub fn gaussian_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn compare_to_local(gray: &GrayImage, local_mean: &GrayImage, offset: f32) -> BinaryMask {
    BinaryMask(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y)[0] as f32;
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        if pixel <= mean - offset { FOREGROUND } else { BACKGROUND }
    }))
}

/// Foreground where the RGB distance from the top-left pixel exceeds `threshold`.
///
/// The single corner sample is the whole background model; gradients,
/// vignetting or a noisy corner will leak into the foreground.
pub fn background_distance_mask(img: &DynamicImage, threshold: f32) -> BinaryMask {
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return BinaryMask(GrayImage::new(rgb.width(), rgb.height()));
    }
    let background = *rgb.get_pixel(0, 0);
    BinaryMask(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        if color_distance(*rgb.get_pixel(x, y), background) > threshold {
            FOREGROUND
        } else {
            BACKGROUND
        }
    }))
}

fn color_distance(a: Rgb<u8>, b: Rgb<u8>) -> f32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x as f32 - y as f32;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
