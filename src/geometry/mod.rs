// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Structural types shared by the wave formats and the merge.
//!
//! This module contains type-safe representations of:
//! - Color: Connectivity class of an anchor position (0..8)
//! - Connectivity: Color partition of the base positions, and the glue test
//! - Brick, Geometry: Base bricks keying reports in older data
//! - Token: Layer widths of a refinement

pub mod brick;
pub mod color;
pub mod connectivity;
pub mod token;

// Re-export for convenience
pub use brick::{Brick, Geometry};
pub use color::{Color, NCOLORS};
pub use connectivity::{Connectivity, MAX_BASE};
pub use token::Token;
