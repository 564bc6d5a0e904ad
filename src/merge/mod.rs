// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Merge-join of left and right wave data.
//!
//! A model is a left fragment and a right fragment glued onto a shared base
//! layer. Wave data counts the fragments of each side by the token of their
//! layers and by how they connect the base bricks. The engine reads the two
//! sides batch by batch, distance by distance, and multiplies the counts of
//! every pair of reports that join into a connected model.
//!
//! # Architecture
//!
//! For each distance `D` in `2..=max_dist`:
//! 1. Open the left stream and, unless `left == right`, the right stream.
//! 2. Read one batch from each side and index it in a [`ReportStore`].
//! 3. For every token pair, sum the products over report pairs with equal
//!    geometry key that pass the connectivity test, then correct each
//!    geometry group for base symmetry.
//! 4. Record the self-join of each side in the [`CrossCheck`].
//!
//! A distance ends when either stream ends. A missing stream ends the run.
//!
//! # Example
//!
//! ```
//! use wave_merge::merge::{MergeConfig, MergeEngine};
//! use wave_merge::wave::MemorySource;
//!
//! let source = MemorySource::new();
//! let config = MergeConfig::builder(1, 3, 1).max_dist(4).build().unwrap();
//! let outcome = MergeEngine::new(&source, config).run().unwrap();
//! assert!(outcome.combined.is_empty());
//! ```

pub mod config;
pub mod correction;
pub mod cross_check;
pub mod job;

pub use config::{MergeConfig, MergeConfigBuilder, Symmetric90Product, MIN_DIST};
pub use correction::corrected_total;
pub use cross_check::{verify_counts, CrossCheck, Mismatch};
pub use job::{JobReport, MergeJob};

use crate::error::{MergeError, Result};
use crate::geometry::Token;
use crate::statistics::{Counters, Statistics};
use crate::store::{ReportGroup, ReportStore, TokenGroups};
use crate::wave::{merge_counts, Batch, Counts, CountsMap, StreamKey, WaveSource};
use tracing::{debug, info};

/// Result of a successful merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Totals by combined token `reverse(left) + base + right`.
    pub combined: CountsMap,
    pub cross_check: CrossCheck,
    pub statistics: Statistics,
}

impl MergeOutcome {
    /// Add the totals of `other`.
    pub fn absorb(&mut self, other: &MergeOutcome) {
        merge_counts(&mut self.combined, &other.combined);
        self.cross_check.absorb(&other.cross_check);
        self.statistics.absorb(&other.statistics);
    }

    /// Tokens of `reference` whose combined totals differ.
    pub fn verify(&self, reference: &CountsMap) -> Vec<Mismatch> {
        verify_counts(&self.combined, reference)
    }
}

/// Runs one [`MergeConfig`] against a [`WaveSource`].
pub struct MergeEngine<'s, S: WaveSource + ?Sized> {
    source: &'s S,
    config: MergeConfig,
}

impl<'s, S: WaveSource + ?Sized> MergeEngine<'s, S> {
    pub fn new(source: &'s S, config: MergeConfig) -> Self {
        Self { source, config }
    }

    /// Merge every distance level.
    ///
    /// Totals are only returned when the whole run succeeds.
    pub fn run(&self) -> Result<MergeOutcome> {
        self.config.validate()?;
        info!(config = %self.config, "merge started");

        let mut outcome = MergeOutcome::default();
        for distance in MIN_DIST..=self.config.max_dist {
            if !self.merge_distance(distance, &mut outcome)? {
                break;
            }
        }

        info!(
            config = %self.config,
            tokens = outcome.combined.len(),
            batches = outcome.statistics.get(Counters::Batches),
            "merge finished"
        );
        Ok(outcome)
    }

    /// Merge the batches at one distance. Returns `false` if a stream is missing.
    fn merge_distance(&self, distance: usize, outcome: &mut MergeOutcome) -> Result<bool> {
        let base = self.config.base;
        let options = &self.config.reader;

        let left_key = StreamKey::new(base, self.config.left, distance);
        let Some(mut left) = self.source.open(left_key, options)? else {
            info!(key = %left_key, "no wave data, stopping");
            return Ok(false);
        };
        let mut right = if self.config.is_symmetric() {
            None
        } else {
            let right_key = StreamKey::new(base, self.config.right, distance);
            match self.source.open(right_key, options)? {
                Some(reader) => Some(reader),
                None => {
                    info!(key = %right_key, "no wave data, stopping");
                    return Ok(false);
                }
            }
        };

        let mut batches = 0usize;
        loop {
            let Some(left_batch) = left.next_batch()? else {
                break;
            };
            let left_store = self.store(left_batch, &mut outcome.statistics)?;
            match right.as_mut() {
                None => {
                    self.join(&left_store, &left_store, outcome)?;
                }
                Some(right) => {
                    let Some(right_batch) = right.next_batch()? else {
                        break;
                    };
                    let right_store = self.store(right_batch, &mut outcome.statistics)?;
                    self.join(&left_store, &right_store, outcome)?;
                    outcome.cross_check.record(&right_store, base)?;
                }
            }
            outcome.cross_check.record(&left_store, base)?;
            batches += 1;
        }

        debug!(stream = left.name(), distance, batches, "distance merged");
        Ok(true)
    }

    fn store(&self, batch: Batch, statistics: &mut Statistics) -> Result<ReportStore> {
        statistics.add(Counters::Reports, batch.len() as u64);
        let store = ReportStore::from_batch(batch, self.config.duplicate_policy)?;
        statistics.add(Counters::Duplicates, store.duplicates() as u64);
        Ok(store)
    }

    /// Join every token of `left` with every token of `right`.
    fn join(
        &self,
        left: &ReportStore,
        right: &ReportStore,
        outcome: &mut MergeOutcome,
    ) -> Result<()> {
        outcome.statistics.increment(Counters::Batches);
        for (token1, groups1) in left.iter() {
            for (token2, groups2) in right.iter() {
                let token = token1.combine(self.config.base, token2);
                let counts = self.join_tokens(&token, groups1, groups2, &mut outcome.statistics)?;
                let entry = outcome.combined.entry(token.clone()).or_default();
                *entry = entry
                    .checked_add(&counts)
                    .ok_or_else(|| MergeError::overflow(&token))?;
            }
        }
        Ok(())
    }

    /// Corrected counts for one token pair, over the geometry keys both share.
    pub fn join_tokens(
        &self,
        token: &Token,
        groups1: &TokenGroups,
        groups2: &TokenGroups,
        statistics: &mut Statistics,
    ) -> Result<Counts> {
        let mut total = Counts::default();
        for (geometry, group1) in groups1 {
            let Some(group2) = groups2.get(geometry) else {
                continue;
            };
            if group1.base_symmetry != group2.base_symmetry {
                return Err(MergeError::InconsistentBaseSymmetry {
                    token: token.to_string(),
                    first: group1.base_symmetry.to_string(),
                    second: group2.base_symmetry.to_string(),
                });
            }
            let raw = self.raw_products(token, group1, group2, statistics)?;
            let all = corrected_total(&raw, group1.base_symmetry, token)?;
            total = total
                .checked_add(&Counts::new(all, raw.symmetric180, raw.symmetric90))
                .ok_or_else(|| MergeError::overflow(token))?;
        }
        Ok(total)
    }

    /// Summed products over the connected report pairs of two groups.
    fn raw_products(
        &self,
        token: &Token,
        group1: &ReportGroup,
        group2: &ReportGroup,
        statistics: &mut Statistics,
    ) -> Result<Counts> {
        let quarter_turns = self.config.base % 4 == 0;
        let mut raw = Counts::default();
        for r1 in &group1.reports {
            for r2 in &group2.reports {
                if !r1.connectivity.connected(&r2.connectivity) {
                    statistics.increment(Counters::DisconnectedPairs);
                    continue;
                }
                statistics.increment(Counters::JoinedPairs);
                let (a, b) = (&r1.counts, &r2.counts);
                let symmetric90 = if quarter_turns {
                    let factor = match self.config.symmetric90_product {
                        Symmetric90Product::RightSquared => b.symmetric90,
                        Symmetric90Product::CrossTerm => a.symmetric90,
                    };
                    factor.checked_mul(b.symmetric90)
                } else {
                    Some(0)
                };
                let product = a.all.checked_mul(b.all).and_then(|all| {
                    let symmetric180 = a.symmetric180.checked_mul(b.symmetric180)?;
                    Some(Counts::new(all, symmetric180, symmetric90?))
                });
                raw = product
                    .and_then(|product| raw.checked_add(&product))
                    .ok_or_else(|| MergeError::overflow(token))?;
            }
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Connectivity;
    use crate::store::DuplicatePolicy;
    use crate::wave::{BaseSymmetry, MemorySource, PackedLayout, PackedWriter, Report, WaveFile};

    fn report(
        token: &str,
        label: &str,
        counts: Counts,
        symmetry: BaseSymmetry,
        base: usize,
    ) -> Report {
        Report {
            token: token.parse().unwrap(),
            connectivity: Connectivity::from_label(label, base).unwrap(),
            geometry: None,
            base_symmetry: symmetry,
            counts,
        }
    }

    fn packed(base: u8, batches: &[Vec<Report>]) -> WaveFile {
        let mut writer = PackedWriter::new(Vec::new(), base, PackedLayout::Compact).unwrap();
        for reports in batches {
            writer.write_batch(&Batch::new(reports.clone())).unwrap();
        }
        WaveFile::Packed(writer.finish().unwrap())
    }

    fn groups(reports: Vec<Report>) -> TokenGroups {
        let batch = Batch::new(reports);
        let store = ReportStore::from_batch(batch, DuplicatePolicy::KeepBoth).unwrap();
        let group = store.iter().next().unwrap().1.clone();
        group
    }

    /// Groups of one fully connected report on base 3.
    fn single(counts: Counts, symmetry: BaseSymmetry) -> TokenGroups {
        groups(vec![report("1", "B0-B1-B2", counts, symmetry, 3)])
    }

    #[test]
    fn test_single_pair() {
        let r = report("1", "B0-B1-B2", Counts::new(4, 0, 0), BaseSymmetry::NONE, 3);
        let source = MemorySource::new().with(StreamKey::new(3, 1, 2), packed(3, &[vec![r]]));
        let config = MergeConfig::builder(1, 3, 1).build().unwrap();
        let outcome = MergeEngine::new(&source, config).run().unwrap();

        assert_eq!(outcome.combined[&"131".parse::<Token>().unwrap()], Counts::new(16, 0, 0));
        assert_eq!(outcome.cross_check.get(&"31".parse().unwrap()), Some(&Counts::new(4, 0, 0)));
        assert_eq!(outcome.statistics.get(Counters::Batches), 1);
        assert_eq!(outcome.statistics.get(Counters::JoinedPairs), 1);
    }

    #[test]
    fn test_disconnected_pair_gives_zero_entry() {
        let r = report("2", "-", Counts::new(3, 0, 0), BaseSymmetry::NONE, 3);
        let source = MemorySource::new().with(StreamKey::new(3, 2, 2), packed(3, &[vec![r]]));
        let config = MergeConfig::builder(2, 3, 2).build().unwrap();
        let outcome = MergeEngine::new(&source, config).run().unwrap();

        assert_eq!(outcome.combined[&"232".parse::<Token>().unwrap()], Counts::default());
        assert_eq!(outcome.statistics.get(Counters::DisconnectedPairs), 1);
    }

    #[test]
    fn test_half_turn_correction() {
        let left = single(Counts::new(5, 1, 0), BaseSymmetry::HALF);
        let right = single(Counts::new(2, 2, 0), BaseSymmetry::HALF);
        let source = MemorySource::new();
        let engine = MergeEngine::new(&source, MergeConfig::builder(1, 3, 1).build().unwrap());
        let token: Token = "131".parse().unwrap();
        let mut statistics = Statistics::new();

        // raw 10 / 2
        let counts = engine.join_tokens(&token, &left, &right, &mut statistics).unwrap();
        assert_eq!(counts, Counts::new(6, 2, 0));

        let odd = single(Counts::new(11, 2, 0), BaseSymmetry::HALF);
        let one = single(Counts::new(1, 1, 0), BaseSymmetry::HALF);
        let err = engine.join_tokens(&token, &odd, &one, &mut statistics).unwrap_err();
        assert!(matches!(err, MergeError::ParityViolation { .. }));
    }

    #[test]
    fn test_symmetry_mismatch_between_sides() {
        let left = single(Counts::new(2, 0, 0), BaseSymmetry::NONE);
        let right = single(Counts::new(2, 0, 0), BaseSymmetry::HALF);
        let source = MemorySource::new();
        let engine = MergeEngine::new(&source, MergeConfig::builder(1, 3, 1).build().unwrap());
        let err = engine
            .join_tokens(&"131".parse().unwrap(), &left, &right, &mut Statistics::new())
            .unwrap_err();
        assert!(matches!(err, MergeError::InconsistentBaseSymmetry { .. }));
    }

    #[test]
    fn test_symmetric90_product() {
        let full = "0-0-0-0";
        let left = groups(vec![report("1", full, Counts::new(6, 2, 4), BaseSymmetry::QUARTER, 4)]);
        let right = groups(vec![report("1", full, Counts::new(6, 2, 2), BaseSymmetry::QUARTER, 4)]);
        let source = MemorySource::new();
        let token: Token = "141".parse().unwrap();

        let squared = MergeEngine::new(&source, MergeConfig::builder(1, 4, 1).build().unwrap());
        let counts = squared
            .join_tokens(&token, &left, &right, &mut Statistics::new())
            .unwrap();
        // raw (36, 4, 4): (36 - 4 - 4) / 4 + 4 / 2 + 4 / 4
        assert_eq!(counts, Counts::new(10, 4, 4));

        let config = MergeConfig::builder(1, 4, 1)
            .symmetric90_product(Symmetric90Product::CrossTerm)
            .build()
            .unwrap();
        let cross = MergeEngine::new(&source, config);
        let counts = cross.join_tokens(&token, &left, &right, &mut Statistics::new()).unwrap();
        // raw (36, 4, 8): (36 - 4 - 8) / 4 + 4 / 2 + 8 / 4
        assert_eq!(counts, Counts::new(10, 4, 8));
    }

    #[test]
    fn test_quarter_turn_terms_must_each_divide() {
        // raw (16, 4, 9): the sum is divisible by 4, but 9 / 4 is not whole.
        let full = "0-0-0-0";
        let left = groups(vec![report("1", full, Counts::new(4, 2, 1), BaseSymmetry::QUARTER, 4)]);
        let right = groups(vec![report("1", full, Counts::new(4, 2, 3), BaseSymmetry::QUARTER, 4)]);
        let source = MemorySource::new();
        let engine = MergeEngine::new(&source, MergeConfig::builder(1, 4, 1).build().unwrap());
        let err = engine
            .join_tokens(&"141".parse().unwrap(), &left, &right, &mut Statistics::new())
            .unwrap_err();
        assert!(matches!(err, MergeError::ParityViolation { .. }));
    }

    #[test]
    fn test_product_overflow() {
        let huge = Counts::new(u128::from(u64::MAX) + 2, 0, 0);
        let left = single(huge, BaseSymmetry::NONE);
        let source = MemorySource::new();
        let engine = MergeEngine::new(&source, MergeConfig::builder(1, 3, 1).build().unwrap());
        let err = engine
            .join_tokens(&"131".parse().unwrap(), &left, &left, &mut Statistics::new())
            .unwrap_err();
        assert!(matches!(err, MergeError::CountOverflow { .. }));

        // Each product fits, their sum does not.
        let half = Counts::new(1u128 << 127, 0, 0);
        let one = Counts::new(1, 0, 0);
        let left = groups(vec![
            report("1", "B0-B1-B2", half, BaseSymmetry::NONE, 3),
            report("1", "B0-B1-B2", half, BaseSymmetry::NONE, 3),
        ]);
        let right = single(one, BaseSymmetry::NONE);
        let err = engine
            .join_tokens(&"131".parse().unwrap(), &left, &right, &mut Statistics::new())
            .unwrap_err();
        assert!(matches!(err, MergeError::CountOverflow { .. }));
    }

    #[test]
    fn test_asymmetric_sides() {
        let left = report("1", "B0-B1-B2", Counts::new(2, 0, 0), BaseSymmetry::NONE, 3);
        let right = report("21", "B0-B1", Counts::new(3, 0, 0), BaseSymmetry::NONE, 3);
        let source = MemorySource::new()
            .with(StreamKey::new(3, 1, 2), packed(3, &[vec![left]]))
            .with(StreamKey::new(3, 3, 2), packed(3, &[vec![right]]));
        let config = MergeConfig::builder(1, 3, 3).max_dist(5).build().unwrap();
        let outcome = MergeEngine::new(&source, config).run().unwrap();

        assert_eq!(outcome.combined.len(), 1);
        assert_eq!(outcome.combined[&"1321".parse::<Token>().unwrap()], Counts::new(6, 0, 0));
        assert_eq!(outcome.cross_check.get(&"31".parse().unwrap()), Some(&Counts::new(2, 0, 0)));
        assert_eq!(outcome.cross_check.get(&"321".parse().unwrap()), Some(&Counts::default()));
    }

    #[test]
    fn test_shorter_right_stream_ends_distance() {
        let r = report("1", "B0-B1-B2", Counts::new(1, 0, 0), BaseSymmetry::NONE, 3);
        let source = MemorySource::new()
            .with(StreamKey::new(3, 1, 2), packed(3, &[vec![r.clone()], vec![r.clone()]]))
            .with(StreamKey::new(3, 2, 2), packed(3, &[vec![r]]));
        let config = MergeConfig::builder(1, 3, 2).build().unwrap();
        let outcome = MergeEngine::new(&source, config).run().unwrap();
        assert_eq!(outcome.statistics.get(Counters::Batches), 1);
    }

    #[test]
    fn test_invalid_config() {
        let source = MemorySource::new();
        let config = MergeConfig {
            max_dist: 0,
            ..MergeConfig::builder(1, 3, 1).build().unwrap()
        };
        let err = MergeEngine::new(&source, config).run().unwrap_err();
        assert!(matches!(err, MergeError::InvalidConfig(_)));
    }

    #[test]
    fn test_outcome_verify() {
        let mut outcome = MergeOutcome::default();
        let token: Token = "131".parse().unwrap();
        outcome.combined.insert(token.clone(), Counts::new(16, 0, 0));
        let mut reference = CountsMap::new();
        reference.insert(token.clone(), Counts::new(16, 0, 0));
        assert!(outcome.verify(&reference).is_empty());

        let copy = outcome.clone();
        outcome.absorb(&copy);
        assert_eq!(outcome.verify(&reference)[0].actual, Some(Counts::new(32, 0, 0)));
    }
}
