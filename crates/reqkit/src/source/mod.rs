//! Content sources for requirement manifests.
//!
//! The [`ContentSource`] trait is the only I/O boundary of the crate. The tree
//! builder and the planner read manifests through it and never care whether
//! the text comes from a working tree, a git revision or memory.

pub mod git;

use crate::error::{Error, Result};
use crate::types::ManifestPath;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Read access to manifest content at some fixed revision.
pub trait ContentSource {
    /// Return the raw text of the manifest.
    ///
    /// Missing manifests are reported as [`Error::NotFound`].
    fn get_content(&self, path: &ManifestPath) -> Result<String>;

    /// Like [`get_content`](Self::get_content), but a missing manifest is `None`.
    fn try_get_content(&self, path: &ManifestPath) -> Result<Option<String>> {
        match self.get_content(path) {
            Ok(content) => Ok(Some(content)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<T: ContentSource + ?Sized> ContentSource for &T {
    fn get_content(&self, path: &ManifestPath) -> Result<String> {
        (**self).get_content(path)
    }
}

impl<T: ContentSource + ?Sized> ContentSource for Box<T> {
    fn get_content(&self, path: &ManifestPath) -> Result<String> {
        (**self).get_content(path)
    }
}

/// In-memory manifests, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<ManifestPath, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a manifest.
    pub fn insert(&mut self, path: impl Into<ManifestPath>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, path: impl Into<ManifestPath>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl<P: Into<ManifestPath>, C: Into<String>> FromIterator<(P, C)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, content) in iter {
            source.insert(path, content);
        }
        source
    }
}

impl ContentSource for MemorySource {
    fn get_content(&self, path: &ManifestPath) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }
}

/// Manifests read from a directory on disk (a checked-out working tree).
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Read manifests relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory manifests are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for DirSource {
    fn get_content(&self, path: &ManifestPath) -> Result<String> {
        let full = self.root.join(path.as_str());
        log::debug!("Reading {}", full.display());
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}
