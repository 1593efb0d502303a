// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Sort pipeline: measure or date each selected image and copy it into the
//! folder of its bucket

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::{classify_by_age, classify_by_feature, AgeThreshold, Bucket, FeatureThresholds};
use crate::imageio::{ImageCrateIo, ImageIo};
use crate::metrics;
use crate::naming::{CanonicalNaming, FolderNaming};
use crate::{Result, SiftError};

/// What a run sorts by, with its boundary values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "threshold", rename_all = "snake_case")]
pub enum SortRequest {
    Feature(FeatureThresholds),
    Age(AgeThreshold),
}

impl SortRequest {
    /// Every bucket this kind of run can produce
    pub fn buckets(&self) -> &'static [Bucket] {
        match self {
            SortRequest::Feature(_) => &Bucket::FEATURE,
            SortRequest::Age(_) => &Bucket::AGE,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            SortRequest::Feature(_) => "feature",
            SortRequest::Age(_) => "age",
        }
    }
}

/// Shared flag a caller sets to stop a run between items
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress after one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.processed as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Completion in whole percent, 0..=100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.processed.min(self.total) * 100 / self.total) as u8
    }
}

/// One file written into a bucket folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bucket: Bucket,
}

/// Outcome counts of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortSummary {
    /// Items in the selection
    pub total: usize,
    /// Items written to a bucket folder
    pub processed: usize,
    /// Directories, items sitting exactly on a threshold, and items already
    /// in their destination folder
    pub skipped: usize,
    /// Items that could not be read, dated or written
    pub failed: usize,
    /// Whether the run stopped early on request
    pub cancelled: bool,
    pub buckets: BTreeMap<Bucket, usize>,
    pub placements: Vec<Placement>,
}

/// Receiver of run notifications. Every method defaults to doing nothing.
pub trait SortObserver {
    /// Called once after each item, whatever happened to it
    fn on_progress(&mut self, _event: ProgressEvent) {}

    fn on_item_failure(&mut self, _path: &Path, _error: &SiftError) {}

    /// Called first when the selection is empty; `on_finished` follows with
    /// an empty summary
    fn on_nothing_selected(&mut self) {}

    /// Called once when a run ends normally, is cancelled, or had nothing to
    /// sort. A run aborted by a folder creation failure reports only through
    /// the returned `Err`.
    fn on_finished(&mut self, _summary: &SortSummary) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SortObserver for NoopObserver {}

enum ItemOutcome {
    Written(Placement),
    Directory,
    OnThreshold,
    AlreadyInPlace,
}

/// Sorts a selection of images into bucket folders under `output_root`
pub struct SortPipeline {
    output_root: PathBuf,
    io: Box<dyn ImageIo>,
    naming: Box<dyn FolderNaming>,
    cancel: CancelToken,
}

impl SortPipeline {
    /// Pipeline using the `image` crate codecs and canonical folder names
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            io: Box::new(ImageCrateIo::new()),
            naming: Box::new(CanonicalNaming::default()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_io(mut self, io: Box<dyn ImageIo>) -> Self {
        self.io = io;
        self
    }

    pub fn with_naming(mut self, naming: Box<dyn FolderNaming>) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Folder each bucket of `request` is written to
    pub fn destination_folders(&self, request: &SortRequest) -> BTreeMap<Bucket, PathBuf> {
        request
            .buckets()
            .iter()
            .map(|&b| (b, self.output_root.join(self.naming.folder_name(b, request))))
            .collect()
    }

    /// Create every destination folder; existing folders are fine
    pub fn prepare_folders(&self, request: &SortRequest) -> Result<BTreeMap<Bucket, PathBuf>> {
        let folders = self.destination_folders(request);
        for folder in folders.values() {
            std::fs::create_dir_all(folder).map_err(|source| SiftError::FolderCreation {
                path: folder.clone(),
                source,
            })?;
            debug!("Destination ready: {:?}", folder);
        }
        Ok(folders)
    }

    /// Sort `paths` in the given order.
    ///
    /// Errors only for an empty selection or when a destination folder cannot
    /// be created; both happen before any item is touched. Item failures are
    /// reported to `observer` and counted in the summary.
    pub fn run(
        &self,
        paths: &[PathBuf],
        request: &SortRequest,
        observer: &mut dyn SortObserver,
    ) -> Result<SortSummary> {
        if paths.is_empty() {
            info!("No image selected");
            observer.on_nothing_selected();
            observer.on_finished(&SortSummary::default());
            return Err(SiftError::SelectionEmpty);
        }

        let folders = self.prepare_folders(request)?;
        info!(
            "Sorting {} item(s) by {} into {:?}",
            paths.len(),
            request.mode(),
            self.output_root
        );

        let mut summary = SortSummary {
            total: paths.len(),
            ..SortSummary::default()
        };

        for (i, path) in paths.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Run cancelled after {} of {} item(s)", i, paths.len());
                summary.cancelled = true;
                break;
            }

            match self.process_item(path, request, &folders) {
                Ok(ItemOutcome::Written(placement)) => {
                    debug!("{:?} -> {:?}", placement.source, placement.destination);
                    summary.processed += 1;
                    *summary.buckets.entry(placement.bucket).or_insert(0) += 1;
                    summary.placements.push(placement);
                }
                Ok(ItemOutcome::Directory) => {
                    debug!("Skipping directory {:?}", path);
                    summary.skipped += 1;
                }
                Ok(ItemOutcome::OnThreshold) => {
                    debug!("{:?} sits exactly on a threshold, not written", path);
                    summary.skipped += 1;
                }
                Ok(ItemOutcome::AlreadyInPlace) => {
                    debug!("{:?} is already in its destination folder, not written", path);
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                    observer.on_item_failure(path, &e);
                }
            }

            observer.on_progress(ProgressEvent {
                processed: i + 1,
                total: paths.len(),
            });
        }

        info!(
            "Sorted {} item(s): {} written, {} skipped, {} failed{}",
            summary.total,
            summary.processed,
            summary.skipped,
            summary.failed,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        observer.on_finished(&summary);

        Ok(summary)
    }

    fn process_item(
        &self,
        path: &Path,
        request: &SortRequest,
        folders: &BTreeMap<Bucket, PathBuf>,
    ) -> Result<ItemOutcome> {
        if path.is_dir() {
            return Ok(ItemOutcome::Directory);
        }

        let decoded = self.io.decode(path)?;

        let bucket = match request {
            SortRequest::Feature(thresholds) => {
                let pair = metrics::measure(&decoded.to_gray());
                debug!(
                    "{:?}: sharpness {:.4}, contrast {:.4}",
                    path, pair.sharpness, pair.contrast
                );
                classify_by_feature(pair, thresholds)
            }
            SortRequest::Age(threshold) => classify_by_age(modified_local(path)?, threshold),
        };

        let Some(bucket) = bucket else {
            return Ok(ItemOutcome::OnThreshold);
        };

        let destination = destination_for(path, &folders[&bucket])?;
        // The source must never be overwritten, not even by its own pixels.
        if same_file(path, &destination) {
            return Ok(ItemOutcome::AlreadyInPlace);
        }

        self.io.encode(&decoded, &destination)?;
        Ok(ItemOutcome::Written(Placement {
            source: path.to_path_buf(),
            destination,
            bucket,
        }))
    }
}

fn destination_for(source: &Path, folder: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| SiftError::Encode {
        path: source.to_path_buf(),
        source: image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no file name",
        )),
    })?;
    Ok(folder.join(file_name))
}

/// Both paths exist and resolve to the same file
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Last-modified time of `path` as local wall-clock time
pub fn modified_local(path: &Path) -> Result<NaiveDateTime> {
    let metadata_err = |source| SiftError::Metadata {
        path: path.to_path_buf(),
        source,
    };
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(metadata_err)?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}
