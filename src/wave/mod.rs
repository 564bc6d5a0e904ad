// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Wave data: precomputed per-fragment counts and their file formats.
//!
//! Wave data is produced by an external enumeration, one stream per
//! (base, fragment size, distance). A stream is a sequence of [`Batch`]es;
//! each batch holds the [`Report`]s computed on one base block.
//!
//! ## Module Structure
//!
//! - `bits`: Bit-level reader and writer
//! - `packed`: The bit-packed binary format
//! - `text`: The legacy whitespace-separated text format
//! - `source`: Locating the stream for a (size, distance)

pub mod bits;
pub mod counts;
pub mod packed;
pub mod report;
pub mod source;
pub mod text;

pub use counts::{merge_counts, Counts, CountsMap};
pub use packed::{PackedReader, PackedWriter};
pub use report::{BaseSymmetry, Batch, Report};
pub use source::{DirectorySource, MemorySource, StreamKey, WaveFile, WaveSource};
pub use text::TextReader;

use crate::error::Result;

/// Layout generation of packed wave files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackedLayout {
    /// Symmetry flags only in the batch header.
    #[default]
    Compact,
    /// The `base - 1` non-origin base bricks follow the symmetry flags.
    BrickHeader,
}

/// Options for decoding a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReaderOptions {
    pub layout: PackedLayout,
    /// Check the totals trailer that follows the end-of-stream record.
    pub verify_trailer: bool,
}

/// A stream of batches.
///
/// `next_batch` returns `Ok(None)` once the end-of-stream record has been
/// read. Callers must not call it again after that.
pub trait BatchReader {
    fn next_batch(&mut self) -> Result<Option<Batch>>;

    /// Name for logging.
    fn name(&self) -> &str {
        "stream"
    }
}
