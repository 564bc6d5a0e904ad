// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters kept by a merge run, and summed over the runs of a job.

use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(Debug, EnumCountMacro, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    /// Batch pairs joined.
    Batches,
    /// Reports decoded, both sides.
    Reports,
    /// Report pairs that glue into a connected model.
    JoinedPairs,
    /// Report pairs skipped by the connectivity test.
    DisconnectedPairs,
    /// Duplicate reports observed.
    Duplicates,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; Counters::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn increment(&mut self, counter: Counters) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counters, amount: u64) {
        self.stats[counter as usize] += amount;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    /// Add all counters of `other`.
    pub fn absorb(&mut self, other: &Statistics) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            *mine += theirs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = Statistics::new();
        stats.increment(Counters::Batches);
        stats.add(Counters::Reports, 7);
        assert_eq!(stats.get(Counters::Batches), 1);
        assert_eq!(stats.get(Counters::Reports), 7);
        assert_eq!(stats.get(Counters::Duplicates), 0);

        let mut total = Statistics::new();
        total.absorb(&stats);
        total.absorb(&stats);
        assert_eq!(total.get(Counters::Reports), 14);
    }
}
