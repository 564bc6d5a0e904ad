// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Locating wave streams.
//!
//! A [`WaveSource`] opens the stream for a (base, fragment size, distance).
//! When both formats are available the packed one is preferred.

use crate::error::Result;
use crate::wave::{BatchReader, PackedReader, ReaderOptions, TextReader};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifies one wave stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    pub base: u8,
    /// Bricks on the fragment side, excluding the base layer.
    pub fragment: usize,
    pub distance: usize,
}

impl StreamKey {
    pub fn new(base: u8, fragment: usize, distance: usize) -> Self {
        Self {
            base,
            fragment,
            distance,
        }
    }

    /// Model size including the base layer, as used in directory names.
    pub fn size(&self) -> usize {
        self.base as usize + self.fragment
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base_{}_size_{}/d{}", self.base, self.size(), self.distance)
    }
}

/// Opens wave streams.
pub trait WaveSource {
    /// Open the stream for `key`, or `None` if there is no data for it.
    fn open<'a>(
        &'a self,
        key: StreamKey,
        options: &ReaderOptions,
    ) -> Result<Option<Box<dyn BatchReader + 'a>>>;
}

/// Wave files laid out as `<root>/base_<b>_size_<n>/d<D>.bin` (or `.txt`).
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the stream for `key` with the given extension.
    pub fn path(&self, key: StreamKey, extension: &str) -> PathBuf {
        self.root
            .join(format!("base_{}_size_{}", key.base, key.size()))
            .join(format!("d{}.{}", key.distance, extension))
    }
}

impl WaveSource for DirectorySource {
    fn open<'a>(
        &'a self,
        key: StreamKey,
        options: &ReaderOptions,
    ) -> Result<Option<Box<dyn BatchReader + 'a>>> {
        let packed = self.path(key, "bin");
        if packed.is_file() {
            debug!(path = %packed.display(), "opening packed stream");
            let reader = BufReader::new(File::open(&packed)?);
            let name = packed.display().to_string();
            return Ok(Some(Box::new(PackedReader::new(reader, key.base, *options, name)?)));
        }
        let text = self.path(key, "txt");
        if text.is_file() {
            debug!(path = %text.display(), "opening text stream");
            let reader = BufReader::new(File::open(&text)?);
            let name = text.display().to_string();
            return Ok(Some(Box::new(TextReader::new(reader, key.base, name))));
        }
        debug!(%key, "no wave data");
        Ok(None)
    }
}

/// Contents of one in-memory wave stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveFile {
    Packed(Vec<u8>),
    Text(String),
}

/// Wave streams held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<StreamKey, WaveFile>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StreamKey, file: WaveFile) {
        self.files.insert(key, file);
    }

    pub fn with(mut self, key: StreamKey, file: WaveFile) -> Self {
        self.insert(key, file);
        self
    }
}

impl WaveSource for MemorySource {
    fn open<'a>(
        &'a self,
        key: StreamKey,
        options: &ReaderOptions,
    ) -> Result<Option<Box<dyn BatchReader + 'a>>> {
        let name = format!("memory:{}", key);
        let reader: Box<dyn BatchReader + 'a> = match self.files.get(&key) {
            Some(WaveFile::Packed(bytes)) => {
                Box::new(PackedReader::new(&bytes[..], key.base, *options, name)?)
            }
            Some(WaveFile::Text(text)) => {
                Box::new(TextReader::new(text.as_bytes(), key.base, name))
            }
            None => return Ok(None),
        };
        Ok(Some(reader))
    }
}
