// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Join-tokens: the layer widths of a refinement.
//!
//! A token spells the number of bricks in each layer as one digit per layer,
//! read away from the base. `"31"` is a fragment with three bricks next to the
//! base and one brick beyond that. Joining a left token, the base and a right
//! token gives the token of the combined model:
//!
//! ```
//! use wave_merge::geometry::Token;
//!
//! let left: Token = "21".parse().unwrap();
//! let right: Token = "1".parse().unwrap();
//! assert_eq!(left.combine(3, &right).as_str(), "1231");
//! assert_eq!(left.self_token(3).as_str(), "321");
//! ```

use crate::error::{MergeError, Result};
use std::fmt;
use std::str::FromStr;

/// A refinement token, each digit in 1..=9.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(String);

impl Token {
    /// Parse and validate a token.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| (b'1'..=b'9').contains(&b)) {
            return Err(MergeError::format(
                "token",
                format!("{:?} is not a sequence of layer widths", s),
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Token stored as a decimal number in packed wave files.
    pub fn from_code(code: u64) -> Result<Self> {
        Self::parse(&code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Total number of bricks over all layers.
    pub fn size(&self) -> usize {
        self.0.bytes().map(|b| (b - b'0') as usize).sum()
    }

    /// Number of layers.
    pub fn height(&self) -> usize {
        self.0.len()
    }

    /// The same layers listed towards the base.
    pub fn reversed(&self) -> Self {
        Self(self.0.chars().rev().collect())
    }

    /// Token of the model `self`, base, `right`, read from the far end of `self`.
    pub fn combine(&self, base: u8, right: &Token) -> Self {
        let mut s = String::with_capacity(self.0.len() + 1 + right.0.len());
        s.extend(self.0.chars().rev());
        s.push(base_digit(base));
        s.push_str(&right.0);
        Self(s)
    }

    /// Token of the model base, `self`.
    pub fn self_token(&self, base: u8) -> Self {
        let mut s = String::with_capacity(self.0.len() + 1);
        s.push(base_digit(base));
        s.push_str(&self.0);
        Self(s)
    }
}

fn base_digit(base: u8) -> char {
    assert!((1..=9).contains(&base), "Base out of range: {}", base);
    char::from(b'0' + base)
}

impl FromStr for Token {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
