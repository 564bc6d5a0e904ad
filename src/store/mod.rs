// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-batch report table.
//!
//! The store indexes the reports of one batch by token and, for formats that
//! carry one, by base geometry. Reports sharing a geometry key were computed
//! on the same base block, so they must agree on its symmetry; the merge
//! applies its overcount correction per [`ReportGroup`].
//!
//! Legacy data sometimes reports the same (token, geometry, connectivity)
//! twice. How that is handled is the [`DuplicatePolicy`].

use crate::error::{MergeError, Result};
use crate::geometry::{Geometry, Token};
use crate::wave::{BaseSymmetry, Batch, Report};
use std::collections::BTreeMap;
use tracing::warn;

/// What to do with a report whose (token, geometry, connectivity) was
/// already seen in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Log and keep both; both contribute to totals.
    #[default]
    KeepBoth,
    /// Log and drop the later report.
    KeepFirst,
}

/// Reports of one token computed on one base block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGroup {
    pub base_symmetry: BaseSymmetry,
    pub reports: Vec<Report>,
}

/// Reports of one token, by geometry key.
pub type TokenGroups = BTreeMap<Option<Geometry>, ReportGroup>;

/// All reports of the current batch.
#[derive(Debug, Clone, Default)]
pub struct ReportStore {
    policy: DuplicatePolicy,
    tokens: BTreeMap<Token, TokenGroups>,
    reports: usize,
    duplicates: usize,
}

impl ReportStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Index every report of `batch`.
    pub fn from_batch(batch: Batch, policy: DuplicatePolicy) -> Result<Self> {
        let mut store = Self::new(policy);
        for report in batch.reports {
            store.insert(report)?;
        }
        Ok(store)
    }

    /// Add a report.
    ///
    /// Fails if the report disagrees on base symmetry with reports already
    /// stored for the same token and geometry.
    pub fn insert(&mut self, report: Report) -> Result<()> {
        let group = self
            .tokens
            .entry(report.token.clone())
            .or_default()
            .entry(report.geometry.clone())
            .or_insert_with(|| ReportGroup {
                base_symmetry: report.base_symmetry,
                reports: Vec::new(),
            });

        if group.base_symmetry != report.base_symmetry {
            return Err(MergeError::InconsistentBaseSymmetry {
                token: report.token.to_string(),
                first: group.base_symmetry.to_string(),
                second: report.base_symmetry.to_string(),
            });
        }

        if group
            .reports
            .iter()
            .any(|seen| seen.connectivity == report.connectivity)
        {
            self.duplicates += 1;
            warn!(report = %report, policy = ?self.policy, "duplicate report observed");
            if self.policy == DuplicatePolicy::KeepFirst {
                return Ok(());
            }
        }
        group.reports.push(report);
        self.reports += 1;
        Ok(())
    }

    /// Groups for `token`, if any report had it.
    pub fn get(&self, token: &Token) -> Option<&TokenGroups> {
        self.tokens.get(token)
    }

    /// Tokens in order, with their groups.
    pub fn iter(&self) -> impl Iterator<Item = (&Token, &TokenGroups)> {
        self.tokens.iter()
    }

    /// Number of stored reports.
    pub fn len(&self) -> usize {
        self.reports
    }

    pub fn is_empty(&self) -> bool {
        self.reports == 0
    }

    /// Number of duplicate observations, whether kept or not.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
