// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reports and batches decoded from wave data.

use crate::geometry::{Connectivity, Geometry, Token};
use crate::wave::Counts;
use std::fmt;

/// Rotational symmetry of the base block a batch was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BaseSymmetry {
    pub rotation_180: bool,
    /// Only meaningful when the base is a multiple of 4.
    pub rotation_90: bool,
}

impl BaseSymmetry {
    pub const NONE: BaseSymmetry = BaseSymmetry {
        rotation_180: false,
        rotation_90: false,
    };
    pub const HALF: BaseSymmetry = BaseSymmetry {
        rotation_180: true,
        rotation_90: false,
    };
    pub const QUARTER: BaseSymmetry = BaseSymmetry {
        rotation_180: true,
        rotation_90: true,
    };
}

impl fmt::Display for BaseSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rotation_90 {
            write!(f, "[90]")
        } else if self.rotation_180 {
            write!(f, "[180]")
        } else {
            write!(f, "[-]")
        }
    }
}

/// One observed aggregate for a (token, connectivity) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub token: Token,
    pub connectivity: Connectivity,
    /// Base geometry, present in formats that key reports by it.
    pub geometry: Option<Geometry>,
    pub base_symmetry: BaseSymmetry,
    pub counts: Counts,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {}", self.token, self.connectivity)?;
        if let Some(geometry) = &self.geometry {
            write!(f, " {}", geometry)?;
        }
        write!(f, " {}: {}", self.base_symmetry, self.counts)
    }
}

/// All reports between two end-of-batch indicators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    pub reports: Vec<Report>,
}

impl Batch {
    pub fn new(reports: Vec<Report>) -> Self {
        Self { reports }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
