// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use wave_merge::geometry::Connectivity;
use wave_merge::wave::{
    BaseSymmetry, Batch, Counts, PackedLayout, PackedWriter, Report, WaveFile,
};

/// A report with no geometry key.
pub fn report(
    token: &str,
    label: &str,
    base: u8,
    counts: Counts,
    symmetry: BaseSymmetry,
) -> Report {
    Report {
        token: token.parse().unwrap(),
        connectivity: Connectivity::from_label(label, base as usize).unwrap(),
        geometry: None,
        base_symmetry: symmetry,
        counts,
    }
}

/// A fully connected report on a base block without symmetry.
pub fn plain(token: &str, base: u8, all: u128) -> Report {
    Report {
        token: token.parse().unwrap(),
        connectivity: Connectivity::fully_connected(base as usize),
        geometry: None,
        base_symmetry: BaseSymmetry::NONE,
        counts: Counts::new(all, 0, 0),
    }
}

/// Encode `batches` as a packed stream, trailer included.
pub fn packed_bytes(base: u8, batches: &[Vec<Report>]) -> Vec<u8> {
    let mut writer = PackedWriter::new(Vec::new(), base, PackedLayout::Compact).unwrap();
    for reports in batches {
        writer.write_batch(&Batch::new(reports.clone())).unwrap();
    }
    writer.finish().unwrap()
}

pub fn packed(base: u8, batches: &[Vec<Report>]) -> WaveFile {
    WaveFile::Packed(packed_bytes(base, batches))
}
