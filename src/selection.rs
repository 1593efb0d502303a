// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Ordered set of items chosen for a run

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::Result;

/// Paths selected for sorting, in selection order, without duplicates
#[derive(Debug, Default, Clone)]
pub struct Selection {
    paths: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path; returns false if it was already selected
    pub fn push(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.seen.contains(&path) {
            debug!("Already selected: {:?}", path);
            return false;
        }
        self.seen.insert(path.clone());
        self.paths.push(path);
        true
    }

    pub fn extend<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for p in paths {
            self.push(p);
        }
    }

    /// Select every entry directly inside `dir`, ordered by name.
    ///
    /// Subdirectories are selected as entries too; the pipeline skips them.
    pub fn add_dir_entries(&mut self, dir: &Path) -> Result<usize> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            match entry {
                Ok(entry) => entries.push(entry.path()),
                Err(e) => warn!("Unreadable entry in {:?}: {}", dir, e),
            }
        }
        entries.sort();

        let before = self.paths.len();
        self.extend(entries);
        Ok(self.paths.len() - before)
    }

    /// Select every path matching a glob pattern, in the order glob yields them
    pub fn add_pattern(&mut self, pattern: &str) -> Result<usize> {
        let before = self.paths.len();
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) => {
                    self.push(path);
                }
                Err(e) => warn!("Unreadable match for {}: {}", pattern, e),
            }
        }
        Ok(self.paths.len() - before)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.seen.clear();
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
