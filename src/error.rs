// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for photosift

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photosift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// photosift error types
///
/// `SelectionEmpty` and `FolderCreation` abort a whole run. `Decode`,
/// `Encode` and `Metadata` are scoped to one item and never stop the loop.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("No image selected")]
    SelectionEmpty,

    #[error("Cannot create destination folder {path:?}: {source}")]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot write {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot read modification time of {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}
