// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image quality metrics computed over a grayscale buffer

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Sharpness and contrast of one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    pub sharpness: f64,
    pub contrast: f64,
}

/// Compute both metrics for an image
pub fn measure(image: &GrayImage) -> MetricPair {
    MetricPair {
        sharpness: compute_sharpness(image),
        contrast: compute_contrast(image),
    }
}

/// Mean gradient magnitude over the image.
///
/// The gradient along each axis uses central differences in the interior and
/// one-sided differences on the borders. An axis of length 1 has a zero
/// derivative. Samples are widened to `i32` before subtracting.
pub fn compute_sharpness(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return 0.0;
    }

    let samples = image.as_raw();
    let at = |x: usize, y: usize| samples[y * w + x] as i32;

    let mut total = 0.0;
    for y in 0..h {
        for x in 0..w {
            let gx = partial(x, w, |i| at(i, y));
            let gy = partial(y, h, |j| at(x, j));
            total += (gx * gx + gy * gy).sqrt();
        }
    }

    total / (w * h) as f64
}

/// Population standard deviation of all samples
pub fn compute_contrast(image: &GrayImage) -> f64 {
    let samples = image.as_raw();
    if samples.is_empty() {
        return 0.0;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|&s| {
            let d = s as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    variance.sqrt()
}

/// Derivative at `at` along a line of `len` samples
fn partial(at: usize, len: usize, sample: impl Fn(usize) -> i32) -> f64 {
    if len < 2 {
        0.0
    } else if at == 0 {
        (sample(1) - sample(0)) as f64
    } else if at == len - 1 {
        (sample(len - 1) - sample(len - 2)) as f64
    } else {
        (sample(at + 1) - sample(at - 1)) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn from_rows(rows: &[&[u8]]) -> GrayImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        GrayImage::from_fn(w, h, |x, y| Luma([rows[y as usize][x as usize]]))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_uniform_image_scores_zero() {
        let img = GrayImage::from_pixel(7, 5, Luma([128]));
        assert_eq!(compute_sharpness(&img), 0.0);
        assert_eq!(compute_contrast(&img), 0.0);
    }

    #[test]
    fn test_empty_image_scores_zero() {
        let img = GrayImage::new(0, 0);
        assert_eq!(measure(&img), MetricPair { sharpness: 0.0, contrast: 0.0 });
    }

    #[test]
    fn test_horizontal_ramp_gradient() {
        // Each row is 0, 10, 20, 30: every derivative along x is 10, along y 0.
        let img = from_rows(&[&[0, 10, 20, 30], &[0, 10, 20, 30]]);
        assert!(close(compute_sharpness(&img), 10.0));
    }

    #[test]
    fn test_border_and_interior_differences() {
        // Single row 0, 4, 0: gx = [4, 0, -4], mean |g| = 8/3.
        let img = from_rows(&[&[0, 4, 0]]);
        assert!(close(compute_sharpness(&img), 8.0 / 3.0));
    }

    #[test]
    fn test_decreasing_samples_do_not_wrap() {
        let img = from_rows(&[&[255, 0], &[255, 0]]);
        assert!(close(compute_sharpness(&img), 255.0));
    }

    #[test]
    fn test_diagonal_step_uses_euclidean_norm() {
        // Bright top-left corner: magnitudes are |(-100, -100)|, 100, 100 and 0.
        let img = from_rows(&[&[100, 0], &[0, 0]]);
        let expected = ((100.0f64 * 100.0 + 100.0 * 100.0).sqrt() + 200.0) / 4.0;
        assert!(close(compute_sharpness(&img), expected));
    }

    #[test]
    fn test_contrast_is_population_std() {
        // Samples 0 and 200 in equal measure: mean 100, std 100.
        let img = from_rows(&[&[0, 200], &[200, 0]]);
        assert!(close(compute_contrast(&img), 100.0));

        let img = from_rows(&[&[2, 4, 4, 4, 5, 5, 7, 9]]);
        assert!(close(compute_contrast(&img), 2.0));
    }

    #[test]
    fn test_non_uniform_images_score_positive() {
        let images = [
            from_rows(&[&[0, 1]]),
            from_rows(&[&[5], &[6]]),
            from_rows(&[&[0, 1, 0, 1]]),
            from_rows(&[&[9, 9, 9], &[9, 8, 9], &[9, 9, 9]]),
        ];
        for img in &images {
            assert!(compute_sharpness(img) > 0.0);
            assert!(compute_contrast(img) > 0.0);
        }
    }

    #[test]
    fn test_measure_leaves_input_untouched() {
        let img = from_rows(&[&[1, 2, 3], &[4, 5, 6]]);
        let before = img.clone();
        let _ = measure(&img);
        assert_eq!(img, before);
    }
}
