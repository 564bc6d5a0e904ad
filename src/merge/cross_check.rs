// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Single-sided self-join totals, used to validate wave data.
//!
//! For each token of a side, the self-connected reports describe the models
//! of size `base + token`. Their corrected totals must agree with counts
//! obtained independently, so they are kept apart from the combined totals.

use crate::error::{MergeError, Result};
use crate::geometry::Token;
use crate::merge::correction::corrected_total;
use crate::store::ReportStore;
use crate::wave::{Counts, CountsMap};
use std::fmt;

/// A token whose accumulated counts differ from the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub token: Token,
    pub expected: Counts,
    /// `None` if nothing was accumulated for the token.
    pub actual: Option<Counts>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected {}, found {}",
                self.token, self.expected, actual
            ),
            None => write!(f, "{}: expected {}, found nothing", self.token, self.expected),
        }
    }
}

/// Compare `actual` with every entry of `reference`.
pub fn verify_counts(actual: &CountsMap, reference: &CountsMap) -> Vec<Mismatch> {
    reference
        .iter()
        .filter_map(|(token, expected)| {
            let found = actual.get(token).copied();
            (found != Some(*expected)).then(|| Mismatch {
                token: token.clone(),
                expected: *expected,
                actual: found,
            })
        })
        .collect()
}

/// Self-join totals by `base + token`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossCheck {
    counts: CountsMap,
}

impl CrossCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate the self-connected reports of `store`.
    pub fn record(&mut self, store: &ReportStore, base: u8) -> Result<()> {
        for (token, groups) in store.iter() {
            let self_token = token.self_token(base);
            let mut total = Counts::default();
            for group in groups.values() {
                let mut raw = Counts::default();
                for report in group
                    .reports
                    .iter()
                    .filter(|r| r.connectivity.is_self_connected())
                {
                    raw = raw
                        .checked_add(&report.counts)
                        .ok_or_else(|| MergeError::overflow(&self_token))?;
                }
                let all = corrected_total(&raw, group.base_symmetry, &self_token)?;
                total = total
                    .checked_add(&Counts::new(all, raw.symmetric180, raw.symmetric90))
                    .ok_or_else(|| MergeError::overflow(&self_token))?;
            }
            let entry = self.counts.entry(self_token.clone()).or_default();
            *entry = entry
                .checked_add(&total)
                .ok_or_else(|| MergeError::overflow(&self_token))?;
        }
        Ok(())
    }

    pub fn get(&self, token: &Token) -> Option<&Counts> {
        self.counts.get(token)
    }

    /// Add the totals of `other`.
    pub fn absorb(&mut self, other: &CrossCheck) {
        crate::wave::merge_counts(&mut self.counts, &other.counts);
    }

    /// Tokens of `reference` whose totals differ from what was accumulated.
    pub fn verify(&self, reference: &CountsMap) -> Vec<Mismatch> {
        verify_counts(&self.counts, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Connectivity;
    use crate::store::DuplicatePolicy;
    use crate::wave::{BaseSymmetry, Batch, Report};

    fn report(token: &str, label: &str, counts: Counts, symmetry: BaseSymmetry) -> Report {
        Report {
            token: token.parse().unwrap(),
            connectivity: Connectivity::from_label(label, 3).unwrap(),
            geometry: None,
            base_symmetry: symmetry,
            counts,
        }
    }

    fn store(reports: Vec<Report>) -> ReportStore {
        ReportStore::from_batch(Batch::new(reports), DuplicatePolicy::KeepBoth).unwrap()
    }

    #[test]
    fn test_only_self_connected() {
        let store = store(vec![
            report("31", "B0-B1-B2", Counts::new(4, 0, 0), BaseSymmetry::NONE),
            report("31", "B0-B1", Counts::new(7, 0, 0), BaseSymmetry::NONE),
            report("2", "-", Counts::new(9, 0, 0), BaseSymmetry::NONE),
        ]);
        let mut check = CrossCheck::new();
        check.record(&store, 3).unwrap();

        assert_eq!(check.get(&"331".parse().unwrap()), Some(&Counts::new(4, 0, 0)));
        // Present with nothing self-connected.
        assert_eq!(check.get(&"32".parse().unwrap()), Some(&Counts::default()));
    }

    #[test]
    fn test_corrected() {
        let store = store(vec![report(
            "1",
            "B0-B1-B2",
            Counts::new(10, 2, 0),
            BaseSymmetry::HALF,
        )]);
        let mut check = CrossCheck::new();
        check.record(&store, 3).unwrap();
        check.record(&store, 3).unwrap();
        assert_eq!(check.get(&"31".parse().unwrap()), Some(&Counts::new(12, 4, 0)));
    }

    #[test]
    fn test_overflow() {
        let huge = Counts::new(u128::MAX, 0, 0);
        let pair = store(vec![
            report("1", "B0-B1-B2", huge, BaseSymmetry::NONE),
            report("1", "B0-B1-B2", Counts::new(1, 0, 0), BaseSymmetry::NONE),
        ]);
        let err = CrossCheck::new().record(&pair, 3).unwrap_err();
        assert!(matches!(err, MergeError::CountOverflow { .. }));

        let single = store(vec![report("1", "B0-B1-B2", huge, BaseSymmetry::NONE)]);
        let mut check = CrossCheck::new();
        check.record(&single, 3).unwrap();
        let err = check.record(&single, 3).unwrap_err();
        assert!(matches!(err, MergeError::CountOverflow { .. }));
    }

    #[test]
    fn test_verify() {
        let store = store(vec![report(
            "1",
            "B0-B1-B2",
            Counts::new(5, 0, 0),
            BaseSymmetry::NONE,
        )]);
        let mut check = CrossCheck::new();
        check.record(&store, 3).unwrap();

        let mut reference = CountsMap::new();
        reference.insert("31".parse().unwrap(), Counts::new(5, 0, 0));
        assert!(check.verify(&reference).is_empty());

        reference.insert("32".parse().unwrap(), Counts::new(1, 0, 0));
        reference.insert("31".parse().unwrap(), Counts::new(6, 0, 0));
        let mismatches = check.verify(&reference);
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].actual, Some(Counts::new(5, 0, 0)));
        assert_eq!(mismatches[1].actual, None);
        assert_eq!(mismatches[1].to_string(), "32: expected 1, found nothing");
    }
}
