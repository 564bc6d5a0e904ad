// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Model counts.

use crate::geometry::Token;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Number of models, and how many of them are rotationally symmetric.
///
/// `all` includes the models counted in `symmetric180` and `symmetric90`.
/// `symmetric90` is 0 unless the base is a multiple of 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub all: u128,
    pub symmetric180: u128,
    pub symmetric90: u128,
}

/// Counts per refinement token.
pub type CountsMap = BTreeMap<Token, Counts>;

impl Counts {
    pub fn new(all: u128, symmetric180: u128, symmetric90: u128) -> Self {
        Self {
            all,
            symmetric180,
            symmetric90,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all == 0 && self.symmetric180 == 0 && self.symmetric90 == 0
    }

    /// Field-wise sum, or `None` if any field overflows.
    pub fn checked_add(&self, other: &Counts) -> Option<Counts> {
        Some(Counts {
            all: self.all.checked_add(other.all)?,
            symmetric180: self.symmetric180.checked_add(other.symmetric180)?,
            symmetric90: self.symmetric90.checked_add(other.symmetric90)?,
        })
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.all += other.all;
        self.symmetric180 += other.symmetric180;
        self.symmetric90 += other.symmetric90;
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(mut self, other: Counts) -> Counts {
        self += other;
        self
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.all)?;
        if self.symmetric180 > 0 || self.symmetric90 > 0 {
            write!(f, " ({})", self.symmetric180)?;
        }
        if self.symmetric90 > 0 {
            write!(f, " (({}))", self.symmetric90)?;
        }
        Ok(())
    }
}

/// Add every entry of `from` into `into`.
pub fn merge_counts(into: &mut CountsMap, from: &CountsMap) {
    for (token, counts) in from {
        *into.entry(token.clone()).or_default() += *counts;
    }
}
