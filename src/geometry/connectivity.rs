// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Connectivity descriptors for the anchor positions of a base layer.
//!
//! Building on a base layer of `base` bricks, each side of a model ties some
//! of the base bricks together. A descriptor assigns each base position a
//! [`Color`]: positions with the same color are connected through that side.
//! Position 0 always has color 0.
//!
//! Two sides glue into one connected model exactly when the union of the two
//! "same color" relations connects every position:
//!
//! ```
//! use wave_merge::geometry::Connectivity;
//!
//! let left = Connectivity::from_label("B0-B1", 3).unwrap(); // [0, 0, 1]
//! let right = Connectivity::from_label("B1-B2", 3).unwrap(); // [0, 1, 1]
//! assert!(left.connected(&right));
//! assert!(!left.connected(&left));
//! ```

use crate::error::{MergeError, Result};
use crate::geometry::Color;
use std::fmt;

/// Largest supported base layer (tokens spell the base as one digit).
pub const MAX_BASE: usize = 9;

/// Legacy symbolic labels of the base-3 text format and their descriptors.
const LEGACY_LABELS: [(&str, [u8; 3]); 5] = [
    ("B0-B1-B2", [0, 0, 0]),
    ("B0-B1", [0, 0, 1]),
    ("B0-B2", [0, 1, 0]),
    ("B1-B2", [0, 1, 1]),
    ("-", [0, 1, 2]),
];

/// Color partition of the `base` anchor positions seen from one side.
///
/// Unused slots beyond `len` are always color 0, so derived equality and
/// hashing only depend on the used positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Connectivity {
    colors: [Color; MAX_BASE],
    len: u8,
}

impl Connectivity {
    /// Build a descriptor from the colors of positions `1..base`.
    ///
    /// # Panics
    ///
    /// Panics if `tail.len() + 1` exceeds [`MAX_BASE`].
    pub fn new(tail: &[Color]) -> Self {
        assert!(tail.len() < MAX_BASE, "Base too large: {}", tail.len() + 1);
        let mut colors = [Color::FIRST; MAX_BASE];
        colors[1..=tail.len()].copy_from_slice(tail);
        Self {
            colors,
            len: (tail.len() + 1) as u8,
        }
    }

    /// The descriptor where every position is connected to position 0.
    pub fn fully_connected(base: usize) -> Self {
        Self::new(&vec![Color::FIRST; base - 1])
    }

    /// Parse a descriptor from its textual form.
    ///
    /// Accepts the legacy symbolic labels (`B0-B1-B2`, `B0-B1`, `B0-B2`,
    /// `B1-B2`, `-`) for base 3, and the numeric form `0-1-1` for any base.
    pub fn from_label(label: &str, base: usize) -> Result<Self> {
        if let Some((_, colors)) = LEGACY_LABELS.iter().find(|(name, _)| *name == label) {
            if base != 3 {
                return Err(MergeError::format(
                    "connectivity",
                    format!("legacy label {} requires base 3, not {}", label, base),
                ));
            }
            let tail: Vec<Color> = colors[1..].iter().map(|&c| Color::new(c)).collect();
            return Ok(Self::new(&tail));
        }

        let parts: Vec<&str> = label.split('-').collect();
        if parts.len() != base || !(2..=MAX_BASE).contains(&base) {
            return Err(MergeError::format(
                "connectivity",
                format!("expected {} positions in {:?}", base, label),
            ));
        }
        let mut colors = Vec::with_capacity(base);
        for part in parts {
            let color = part
                .parse::<u8>()
                .ok()
                .and_then(Color::try_new)
                .ok_or_else(|| {
                    MergeError::format(
                        "connectivity",
                        format!("bad color {:?} in {:?}", part, label),
                    )
                })?;
            colors.push(color);
        }
        if colors[0] != Color::FIRST {
            return Err(MergeError::format(
                "connectivity",
                format!("position 0 must have color 0 in {:?}", label),
            ));
        }
        Ok(Self::new(&colors[1..]))
    }

    /// Number of anchor positions (the base).
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Colors of all positions, position 0 first.
    pub fn colors(&self) -> &[Color] {
        &self.colors[..self.len()]
    }

    /// True if overlaying both partitions connects every position.
    ///
    /// Starting from position 0, a position is reached when it shares a color
    /// with a reached position on either side. Iterates to a fixed point.
    pub fn connected(&self, other: &Connectivity) -> bool {
        debug_assert_eq!(self.len, other.len, "descriptors of different bases");
        let n = self.len().min(other.len());
        let a = self.colors();
        let b = other.colors();
        let full: u16 = (1 << n) - 1;

        let mut reached: u16 = 1;
        for i in 1..n {
            if a[i] == a[0] || b[i] == b[0] {
                reached |= 1 << i;
            }
        }

        let mut improved = true;
        while improved && reached != full {
            improved = false;
            for i in 1..n {
                if reached & (1 << i) != 0 {
                    continue;
                }
                let joins = (0..n)
                    .any(|j| reached & (1 << j) != 0 && (a[j] == a[i] || b[j] == b[i]));
                if joins {
                    reached |= 1 << i;
                    improved = true;
                }
            }
        }
        reached == full
    }

    /// True if this side alone connects every position.
    pub fn is_self_connected(&self) -> bool {
        self.connected(self)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, color) in self.colors().iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", color.value())?;
        }
        Ok(())
    }
}
