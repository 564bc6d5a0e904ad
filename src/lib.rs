// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Merge precomputed wave data into counts of rectilinear brick models.
//!
//! A model of size `left + base + right` is split at a base layer of `base`
//! bricks. An external enumeration ("wave data") counts, for every fragment
//! that can sit on one side of the base, how many fragments there are for
//! each refinement token and each way the fragment connects the base bricks.
//! This crate joins the two sides and produces totals for every combined
//! token, corrected for base blocks that are symmetric under rotation.
//!
//! # Architecture
//!
//! Data flows through four stages:
//!
//! 1. **Decoding** (`wave`): a [`WaveSource`] opens the packed binary or legacy
//!    text stream for each (size, distance) and yields one [`Batch`] of
//!    [`Report`]s per base block.
//! 2. **Indexing** (`store`): each batch is indexed by token and geometry key
//!    in a [`ReportStore`].
//! 3. **Joining** (`merge`): the [`MergeEngine`] multiplies the counts of every
//!    pair of reports whose connectivities glue into a connected model.
//! 4. **Validation** (`merge::cross_check`): self-joins of each side are kept
//!    for comparison with independently computed counts.
//!
//! There is no global state. Each run returns a [`MergeOutcome`].
//!
//! # Parallelization
//!
//! A single run is sequential. Independent configurations can be run on the
//! rayon thread pool with [`MergeJob::run_parallel`].
//!
//! # Example
//!
//! ```
//! use wave_merge::geometry::{Connectivity, Token};
//! use wave_merge::wave::{BaseSymmetry, Batch, Counts, PackedLayout, PackedWriter, Report};
//! use wave_merge::wave::{MemorySource, StreamKey, WaveFile};
//! use wave_merge::{MergeConfig, MergeEngine};
//!
//! let report = Report {
//!     token: "1".parse().unwrap(),
//!     connectivity: Connectivity::fully_connected(3),
//!     geometry: None,
//!     base_symmetry: BaseSymmetry::NONE,
//!     counts: Counts::new(4, 0, 0),
//! };
//! let mut writer = PackedWriter::new(Vec::new(), 3, PackedLayout::Compact).unwrap();
//! writer.write_batch(&Batch::new(vec![report])).unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let source = MemorySource::new().with(StreamKey::new(3, 1, 2), WaveFile::Packed(bytes));
//! let config = MergeConfig::builder(1, 3, 1).build().unwrap();
//! let outcome = MergeEngine::new(&source, config).run().unwrap();
//! let token: Token = "131".parse().unwrap();
//! assert_eq!(outcome.combined[&token].all, 16);
//! ```

pub mod error;
pub mod geometry;
pub mod merge;
pub mod statistics;
pub mod store;
pub mod wave;

// Re-export commonly used types
pub use error::{MergeError, Result};
pub use merge::{MergeConfig, MergeEngine, MergeJob, MergeOutcome};
pub use store::{DuplicatePolicy, ReportStore};
pub use wave::{Batch, Counts, CountsMap, Report, WaveSource};
