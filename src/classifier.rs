// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Threshold classification into output buckets

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::metrics::MetricPair;
use crate::{Result, SiftError};

/// Output classification of one item.
///
/// Feature buckets read sharpness first, contrast second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    LowLow,
    HighHigh,
    LowHigh,
    HighLow,
    Before,
    After,
}

impl Bucket {
    /// Buckets produced by a feature run
    pub const FEATURE: [Bucket; 4] = [Bucket::LowLow, Bucket::HighHigh, Bucket::LowHigh, Bucket::HighLow];

    /// Buckets produced by an age run
    pub const AGE: [Bucket; 2] = [Bucket::Before, Bucket::After];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::LowLow => "low_low",
            Bucket::HighHigh => "high_high",
            Bucket::LowHigh => "low_high",
            Bucket::HighLow => "high_low",
            Bucket::Before => "before",
            Bucket::After => "after",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sharpness and contrast boundaries for a feature run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureThresholds {
    pub sharpness: f64,
    pub contrast: f64,
}

impl FeatureThresholds {
    pub fn new(sharpness: f64, contrast: f64) -> Result<Self> {
        if !sharpness.is_finite() {
            return Err(SiftError::InvalidThreshold(format!("sharpness {}", sharpness)));
        }
        if !contrast.is_finite() {
            return Err(SiftError::InvalidThreshold(format!("contrast {}", contrast)));
        }
        Ok(Self { sharpness, contrast })
    }
}

/// Point in local time separating old files from new ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeThreshold(pub NaiveDateTime);

impl AgeThreshold {
    pub fn new(boundary: NaiveDateTime) -> Self {
        Self(boundary)
    }

    pub fn boundary(&self) -> NaiveDateTime {
        self.0
    }

    /// Parse `YYYY-MM-DD HH:MM[:SS]` (a `T` separator is accepted too)
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        const FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

        FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(input, f).ok())
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(Self)
            .ok_or_else(|| SiftError::InvalidThreshold(format!("unrecognised date-time '{}'", input)))
    }
}

/// Place a metric pair relative to the thresholds.
///
/// Returns `None` when either metric equals its threshold exactly.
pub fn classify_by_feature(metrics: MetricPair, thresholds: &FeatureThresholds) -> Option<Bucket> {
    let sharpness = metrics.sharpness.partial_cmp(&thresholds.sharpness)?;
    let contrast = metrics.contrast.partial_cmp(&thresholds.contrast)?;

    match (sharpness, contrast) {
        (Ordering::Less, Ordering::Less) => Some(Bucket::LowLow),
        (Ordering::Greater, Ordering::Greater) => Some(Bucket::HighHigh),
        (Ordering::Less, Ordering::Greater) => Some(Bucket::LowHigh),
        (Ordering::Greater, Ordering::Less) => Some(Bucket::HighLow),
        _ => None,
    }
}

/// Place a timestamp relative to the age boundary; equal yields `None`
pub fn classify_by_age(timestamp: NaiveDateTime, threshold: &AgeThreshold) -> Option<Bucket> {
    match timestamp.cmp(&threshold.0) {
        Ordering::Less => Some(Bucket::Before),
        Ordering::Greater => Some(Bucket::After),
        Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pair(sharpness: f64, contrast: f64) -> MetricPair {
        MetricPair { sharpness, contrast }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_feature_quadrants() {
        let t = FeatureThresholds::new(10.0, 15.0).unwrap();
        assert_eq!(classify_by_feature(pair(5.0, 10.0), &t), Some(Bucket::LowLow));
        assert_eq!(classify_by_feature(pair(15.0, 20.0), &t), Some(Bucket::HighHigh));
        assert_eq!(classify_by_feature(pair(5.0, 20.0), &t), Some(Bucket::LowHigh));
        assert_eq!(classify_by_feature(pair(15.0, 10.0), &t), Some(Bucket::HighLow));
    }

    #[test]
    fn test_feature_equality_on_either_axis_skips() {
        let t = FeatureThresholds::new(10.0, 15.0).unwrap();
        assert_eq!(classify_by_feature(pair(10.0, 20.0), &t), None);
        assert_eq!(classify_by_feature(pair(5.0, 15.0), &t), None);
        assert_eq!(classify_by_feature(pair(10.0, 15.0), &t), None);
    }

    #[test]
    fn test_feature_partition_is_total_off_the_boundary() {
        let t = FeatureThresholds::new(1.5, 2.5).unwrap();
        for s in [0.0, 1.0, 1.49, 1.51, 3.0, 100.0] {
            for c in [0.0, 2.0, 2.49, 2.51, 9.0] {
                let hits = Bucket::FEATURE
                    .iter()
                    .filter(|b| classify_by_feature(pair(s, c), &t) == Some(**b))
                    .count();
                assert_eq!(hits, 1, "sharpness {} contrast {}", s, c);
            }
        }
    }

    #[test]
    fn test_non_finite_thresholds_rejected() {
        assert!(FeatureThresholds::new(f64::NAN, 1.0).is_err());
        assert!(FeatureThresholds::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_age_before_after_equal() {
        let t = AgeThreshold::new(at(12, 0, 0));
        assert_eq!(classify_by_age(at(11, 59, 59), &t), Some(Bucket::Before));
        assert_eq!(classify_by_age(at(12, 0, 1), &t), Some(Bucket::After));
        assert_eq!(classify_by_age(at(12, 0, 0), &t), None);
    }

    #[test]
    fn test_age_parse_formats() {
        assert_eq!(AgeThreshold::parse("2024-03-05 14:30:10").unwrap().boundary(), at(14, 30, 10));
        assert_eq!(AgeThreshold::parse("2024-03-05T14:30").unwrap().boundary(), at(14, 30, 0));
        assert_eq!(AgeThreshold::parse("2024-03-05").unwrap().boundary(), at(0, 0, 0));
        assert!(AgeThreshold::parse("05/03/2024").is_err());
    }
}
