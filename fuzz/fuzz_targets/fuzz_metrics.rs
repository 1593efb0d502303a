// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use image::GrayImage;
use libfuzzer_sys::fuzz_target;
use photosift::classifier::{classify_by_feature, FeatureThresholds};
use photosift::metrics;

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    samples: Vec<u8>,
    sharpness: f64,
    contrast: f64,
}

fuzz_target!(|input: Input| {
    let width = input.width.max(1) as u32;
    let height = (input.samples.len() as u32) / width;
    let mut samples = input.samples;
    samples.truncate((width * height) as usize);
    let uniform = samples.windows(2).all(|w| w[0] == w[1]);

    let Some(image) = GrayImage::from_raw(width, height, samples) else {
        return;
    };

    let pair = metrics::measure(&image);
    assert!(pair.sharpness >= 0.0 && pair.contrast >= 0.0);
    assert_eq!(pair.sharpness == 0.0, uniform);
    assert_eq!(pair.contrast == 0.0, uniform);

    if let Ok(t) = FeatureThresholds::new(input.sharpness, input.contrast) {
        let _ = classify_by_feature(pair, &t);
    }
});
