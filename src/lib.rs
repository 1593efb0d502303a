// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! photosift: sort image files into folders by sharpness, contrast or age
//!
//! A selection of files is measured (mean gradient magnitude and intensity
//! standard deviation) or dated by modification time, classified against
//! caller-supplied thresholds, and copied into one folder per bucket.

pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod imageio;
pub mod metrics;
pub mod naming;
pub mod pipeline;
pub mod selection;

pub use classifier::{AgeThreshold, Bucket, FeatureThresholds};
pub use config::AppConfig;
pub use error::{Result, SiftError};
pub use pipeline::{CancelToken, ProgressEvent, SortObserver, SortPipeline, SortRequest, SortSummary};
