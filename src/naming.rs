// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Destination folder names derived from a run's thresholds

use std::fmt::Write;

use crate::classifier::{AgeThreshold, Bucket};
use crate::config::NamingConfig;
use crate::pipeline::SortRequest;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Scheme mapping a bucket of a run to its folder name
pub trait FolderNaming: Send + Sync {
    fn folder_name(&self, bucket: Bucket, request: &SortRequest) -> String;
}

/// Default naming: `sharpness_LT_{s}contrast_MT_{c}`, `before_{date}`, `after_{date}`
#[derive(Debug, Clone)]
pub struct CanonicalNaming {
    date_format: String,
}

impl CanonicalNaming {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(config.date_format.clone())
    }

    /// Boundary rendered with the configured format, with any path
    /// separator a specifier such as `%D` produces replaced by `-`
    fn render_date(&self, threshold: &AgeThreshold) -> String {
        let mut out = String::new();
        if write!(out, "{}", threshold.boundary().format(&self.date_format)).is_err() {
            out.clear();
            out.push_str(&threshold.boundary().format(DEFAULT_DATE_FORMAT).to_string());
        }
        out.replace(['/', '\\'], "-")
    }
}

impl Default for CanonicalNaming {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}

impl FolderNaming for CanonicalNaming {
    fn folder_name(&self, bucket: Bucket, request: &SortRequest) -> String {
        match request {
            SortRequest::Feature(t) => {
                let (s, c) = match bucket {
                    Bucket::LowLow => ("LT", "LT"),
                    Bucket::HighHigh => ("MT", "MT"),
                    Bucket::LowHigh => ("LT", "MT"),
                    Bucket::HighLow => ("MT", "LT"),
                    other => return other.as_str().to_string(),
                };
                format!(
                    "sharpness_{}_{}contrast_{}_{}",
                    s,
                    format_threshold(t.sharpness),
                    c,
                    format_threshold(t.contrast)
                )
            }
            SortRequest::Age(t) => {
                let date = self.render_date(t);
                match bucket {
                    Bucket::Before => format!("before_{}", date),
                    Bucket::After => format!("after_{}", date),
                    other => other.as_str().to_string(),
                }
            }
        }
    }
}

/// Locale-independent, round-trip exact rendering of a threshold.
///
/// Uses the shortest representation that parses back to the same `f64`,
/// always with a `.` and at least one fractional digit.
pub fn format_threshold(value: f64) -> String {
    // -0.0 and 0.0 classify identically, so they share a name
    let value = if value == 0.0 { 0.0 } else { value };
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FeatureThresholds;

    fn feature(s: f64, c: f64) -> SortRequest {
        SortRequest::Feature(FeatureThresholds::new(s, c).unwrap())
    }

    #[test]
    fn test_format_threshold() {
        assert_eq!(format_threshold(10.0), "10.0");
        assert_eq!(format_threshold(2.5), "2.5");
        assert_eq!(format_threshold(0.1), "0.1");
        assert_eq!(format_threshold(-0.0), "0.0");
        assert_eq!(format_threshold(-3.0), "-3.0");
        assert_eq!(format_threshold(1e20), "100000000000000000000.0");
    }

    #[test]
    fn test_close_thresholds_stay_distinct() {
        let a = format_threshold(0.1 + 0.2);
        let b = format_threshold(0.3);
        assert_ne!(a, b);
        assert_eq!(a.parse::<f64>().unwrap(), 0.1 + 0.2);
    }

    #[test]
    fn test_feature_folder_names() {
        let naming = CanonicalNaming::default();
        let req = feature(10.0, 15.5);
        assert_eq!(naming.folder_name(Bucket::LowLow, &req), "sharpness_LT_10.0contrast_LT_15.5");
        assert_eq!(naming.folder_name(Bucket::HighHigh, &req), "sharpness_MT_10.0contrast_MT_15.5");
        assert_eq!(naming.folder_name(Bucket::LowHigh, &req), "sharpness_LT_10.0contrast_MT_15.5");
        assert_eq!(naming.folder_name(Bucket::HighLow, &req), "sharpness_MT_10.0contrast_LT_15.5");
    }

    #[test]
    fn test_age_folder_names() {
        let naming = CanonicalNaming::default();
        let req = SortRequest::Age(AgeThreshold::parse("2024-03-05 14:30:00").unwrap());
        assert_eq!(naming.folder_name(Bucket::Before, &req), "before_2024-03-05T14-30-00");
        assert_eq!(naming.folder_name(Bucket::After, &req), "after_2024-03-05T14-30-00");
    }

    #[test]
    fn test_custom_date_format() {
        let naming = CanonicalNaming::new("%Y%m%d");
        let req = SortRequest::Age(AgeThreshold::parse("2024-03-05").unwrap());
        assert_eq!(naming.folder_name(Bucket::Before, &req), "before_20240305");
    }

    #[test]
    fn test_rendered_separators_do_not_nest_folders() {
        let req = SortRequest::Age(AgeThreshold::parse("2024-03-05").unwrap());
        assert_eq!(CanonicalNaming::new("%D").folder_name(Bucket::Before, &req), "before_03-05-24");
        assert_eq!(CanonicalNaming::new("%x").folder_name(Bucket::After, &req), "after_03-05-24");
        assert_eq!(CanonicalNaming::new("%Y\\%m").folder_name(Bucket::After, &req), "after_2024-03");
    }

    #[test]
    fn test_broken_date_format_falls_back() {
        let naming = CanonicalNaming::new("%Q");
        let req = SortRequest::Age(AgeThreshold::parse("2024-03-05").unwrap());
        assert_eq!(naming.folder_name(Bucket::After, &req), "after_2024-03-05T00-00-00");
    }
}
