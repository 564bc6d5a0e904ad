// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Color type for connectivity classes.
//!
//! A color labels the connected component an anchor position of the base
//! layer belongs to, as seen from one side of the base. Colors are stored in
//! 3 bits in packed wave files.

/// Number of distinct colors (3-bit field).
pub const NCOLORS: usize = 8;

/// A color (connectivity class) in the range 0..NCOLORS.
///
/// This is a newtype wrapper to provide type safety and prevent mixing
/// colors with other integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Color(u8);

impl Color {
    /// The color of anchor position 0.
    pub const FIRST: Color = Color(0);

    /// Create a new color, panicking if out of range.
    ///
    /// # Panics
    ///
    /// Panics if `value >= NCOLORS`.
    pub fn new(value: u8) -> Self {
        assert!((value as usize) < NCOLORS, "Color out of range: {}", value);
        Self(value)
    }

    /// Try to create a new color, returning None if out of range.
    pub fn try_new(value: u8) -> Option<Self> {
        if (value as usize) < NCOLORS {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Get the underlying value.
    pub fn value(self) -> u8 {
        self.0
    }
}
