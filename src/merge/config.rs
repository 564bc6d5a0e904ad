// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Configuration of a merge run.

use crate::error::{MergeError, Result};
use crate::geometry::MAX_BASE;
use crate::store::DuplicatePolicy;
use crate::wave::{PackedLayout, ReaderOptions};
use std::fmt;

/// Smallest distance level present in wave data.
pub const MIN_DIST: usize = 2;

/// How the 90 degree symmetric product of two reports is formed.
///
/// Existing reference totals were computed with `RightSquared`, which
/// squares the right report's count. `CrossTerm` multiplies the counts of
/// both sides, like the other products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetric90Product {
    #[default]
    RightSquared,
    CrossTerm,
}

/// One (left, base, right) configuration to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Bricks in the left fragment.
    pub left: usize,
    /// Bricks in the base layer.
    pub base: u8,
    /// Bricks in the right fragment.
    pub right: usize,
    /// Largest distance level to read.
    pub max_dist: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub symmetric90_product: Symmetric90Product,
    pub reader: ReaderOptions,
}

impl MergeConfig {
    pub fn builder(left: usize, base: u8, right: usize) -> MergeConfigBuilder {
        MergeConfigBuilder::new(left, base, right)
    }

    /// Both sides read the same stream.
    pub fn is_symmetric(&self) -> bool {
        self.left == self.right
    }

    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_BASE).contains(&(self.base as usize)) {
            return Err(MergeError::InvalidConfig(format!(
                "base {} outside 2..={}",
                self.base, MAX_BASE
            )));
        }
        if self.max_dist < MIN_DIST {
            return Err(MergeError::InvalidConfig(format!(
                "max_dist {} below {}",
                self.max_dist, MIN_DIST
            )));
        }
        Ok(())
    }
}

impl fmt::Display for MergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}+{} up to distance {}",
            self.left, self.base, self.right, self.max_dist
        )
    }
}

/// Builder for [`MergeConfig`].
///
/// # Example
///
/// ```
/// use wave_merge::merge::MergeConfig;
/// use wave_merge::store::DuplicatePolicy;
///
/// let config = MergeConfig::builder(2, 3, 2)
///     .max_dist(6)
///     .duplicate_policy(DuplicatePolicy::KeepFirst)
///     .build()
///     .unwrap();
/// assert!(config.is_symmetric());
/// ```
#[derive(Debug, Clone)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    pub fn new(left: usize, base: u8, right: usize) -> Self {
        Self {
            config: MergeConfig {
                left,
                base,
                right,
                max_dist: MIN_DIST,
                duplicate_policy: DuplicatePolicy::default(),
                symmetric90_product: Symmetric90Product::default(),
                reader: ReaderOptions::default(),
            },
        }
    }

    pub fn max_dist(mut self, max_dist: usize) -> Self {
        self.config.max_dist = max_dist;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    pub fn symmetric90_product(mut self, product: Symmetric90Product) -> Self {
        self.config.symmetric90_product = product;
        self
    }

    pub fn layout(mut self, layout: PackedLayout) -> Self {
        self.config.reader.layout = layout;
        self
    }

    pub fn verify_trailer(mut self, verify: bool) -> Self {
        self.config.reader.verify_trailer = verify;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<MergeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
