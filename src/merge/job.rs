// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Running many merge configurations.
//!
//! Configurations share nothing but the read-only source, so they can run in
//! parallel. Each run accumulates into its own [`MergeOutcome`], which is
//! added to the job totals only if the run succeeds.

use crate::error::{MergeError, Result};
use crate::merge::{MergeConfig, MergeEngine, MergeOutcome};
use crate::wave::WaveSource;
use rayon::prelude::*;
use tracing::{info, warn};

/// A list of configurations to merge.
#[derive(Debug, Clone, Default)]
pub struct MergeJob {
    configs: Vec<MergeConfig>,
}

/// Totals of the successful runs, and the failures.
#[derive(Debug, Default)]
pub struct JobReport {
    pub totals: MergeOutcome,
    pub completed: Vec<MergeConfig>,
    pub failures: Vec<(MergeConfig, MergeError)>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl MergeJob {
    pub fn new(configs: Vec<MergeConfig>) -> Self {
        Self { configs }
    }

    pub fn push(&mut self, config: MergeConfig) {
        self.configs.push(config);
    }

    pub fn configs(&self) -> &[MergeConfig] {
        &self.configs
    }

    /// Run the configurations one after another, in order.
    pub fn run<S: WaveSource + ?Sized>(&self, source: &S) -> JobReport {
        let results = self
            .configs
            .iter()
            .map(|config| (config, MergeEngine::new(source, config.clone()).run()));
        Self::collect(results)
    }

    /// Run the configurations on the rayon thread pool.
    ///
    /// Totals are added in configuration order, so the report is the same
    /// as from [`run`](Self::run).
    pub fn run_parallel<S: WaveSource + Sync + ?Sized>(&self, source: &S) -> JobReport {
        let results: Vec<(&MergeConfig, Result<MergeOutcome>)> = self
            .configs
            .par_iter()
            .map(|config| (config, MergeEngine::new(source, config.clone()).run()))
            .collect();
        Self::collect(results)
    }

    fn collect<'c>(
        results: impl IntoIterator<Item = (&'c MergeConfig, Result<MergeOutcome>)>,
    ) -> JobReport {
        let mut report = JobReport::default();
        for (config, result) in results {
            match result {
                Ok(outcome) => {
                    report.totals.absorb(&outcome);
                    report.completed.push(config.clone());
                }
                Err(err) => {
                    warn!(config = %config, error = %err, "merge failed");
                    report.failures.push((config.clone(), err));
                }
            }
        }
        info!(
            completed = report.completed.len(),
            failed = report.failures.len(),
            "merge job finished"
        );
        report
    }
}
