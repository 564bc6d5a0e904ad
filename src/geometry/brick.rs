// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bricks of the base layer.
//!
//! Older wave data identifies the base block a report was computed on by the
//! positions of its bricks. The first brick is always horizontal at the
//! origin and is not stored; the remaining `base - 1` bricks form the
//! geometry key that left and right reports must share to be joined.

use crate::error::{MergeError, Result};
use std::fmt;

/// A 2x4 brick: orientation and position of its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brick {
    pub is_vertical: bool,
    pub x: i16,
    pub y: i16,
}

impl Brick {
    /// Create a brick, rejecting a vertical brick at the origin.
    ///
    /// The origin is occupied by the horizontal first brick of every base.
    pub fn new(is_vertical: bool, x: i16, y: i16) -> Result<Self> {
        if is_vertical && x == 0 && y == 0 {
            return Err(MergeError::format(
                "brick",
                "vertical brick at the origin",
            ));
        }
        Ok(Self { is_vertical, x, y })
    }
}

impl fmt::Display for Brick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_vertical {
            write!(f, "|{},{}|", self.x, self.y)
        } else {
            write!(f, "={},{}=", self.x, self.y)
        }
    }
}

/// Bricks identifying the base block a report belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Geometry(pub Vec<Brick>);

impl Geometry {
    pub fn bricks(&self) -> &[Brick] {
        &self.0
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, brick) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", brick)?;
        }
        Ok(())
    }
}
