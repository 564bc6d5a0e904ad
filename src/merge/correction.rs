// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Overcount correction for symmetric base blocks.
//!
//! Each side is enumerated on a fixed base block. When the base is invariant
//! under a rotation, every model that is not itself symmetric is produced once
//! per rotation of the base, so the raw product counts it two (180 degrees) or
//! four (90 degrees) times:
//!
//! - no symmetry: `all`
//! - 180 degrees: `(all - s180) / 2 + s180`
//! - 90 degrees: `(all - s180 - s90) / 4 + s180 / 2 + s90 / 4`
//!
//! Each division must be exact.

use crate::error::{MergeError, Result};
use crate::geometry::Token;
use crate::wave::{BaseSymmetry, Counts};

/// Number of distinct models behind the raw counts.
///
/// Fails with `ParityViolation` when a division is not exact and with
/// `SymmetryExceedsTotal` when more symmetric models than models are counted.
pub fn corrected_total(raw: &Counts, symmetry: BaseSymmetry, token: &Token) -> Result<u128> {
    let parity = |symmetric: u128, divisor: u128| MergeError::ParityViolation {
        token: token.to_string(),
        total: raw.all,
        symmetric,
        divisor,
    };
    if symmetry.rotation_90 {
        let symmetric = raw.symmetric180.saturating_add(raw.symmetric90);
        let asymmetric = raw
            .symmetric180
            .checked_add(raw.symmetric90)
            .and_then(|symmetric| raw.all.checked_sub(symmetric))
            .ok_or_else(|| MergeError::SymmetryExceedsTotal {
                token: token.to_string(),
                total: raw.all,
                symmetric,
            })?;
        if raw.symmetric90 % 4 != 0 {
            return Err(parity(raw.symmetric90, 4));
        }
        if raw.symmetric180 % 2 != 0 {
            return Err(parity(raw.symmetric180, 2));
        }
        if asymmetric % 4 != 0 {
            return Err(parity(symmetric, 4));
        }
        Ok(asymmetric / 4 + raw.symmetric180 / 2 + raw.symmetric90 / 4)
    } else if symmetry.rotation_180 {
        let asymmetric = raw
            .all
            .checked_sub(raw.symmetric180)
            .ok_or_else(|| MergeError::SymmetryExceedsTotal {
                token: token.to_string(),
                total: raw.all,
                symmetric: raw.symmetric180,
            })?;
        if asymmetric % 2 != 0 {
            return Err(parity(raw.symmetric180, 2));
        }
        Ok(asymmetric / 2 + raw.symmetric180)
    } else {
        Ok(raw.all)
    }
}
