// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The legacy text wave format.
//!
//! One report per line:
//!
//! ```text
//! <connectivity> <token> [B<i> <vertical> <x> <y>]... BASE_SYMMETRIC <0|1> TOTAL <n> SYMMETRIC <n>
//! ```
//!
//! for example `B0-B1 31 B1 0 2 0 B2 1 5 0 BASE_SYMMETRIC 0 TOTAL 10 SYMMETRIC 0`.
//! A line starting with `Q` ends the file. A text file holds a single batch;
//! the bricks, when present, key each report by the base it was computed on.

use crate::error::{MergeError, Result};
use crate::geometry::{Brick, Connectivity, Geometry, Token};
use crate::wave::{BaseSymmetry, Batch, BatchReader, Counts, Report};
use std::io::BufRead;
use tracing::debug;

/// Reads the single batch of a legacy text wave file.
#[derive(Debug)]
pub struct TextReader<R> {
    inner: R,
    base: u8,
    name: String,
    finished: bool,
}

impl<R: BufRead> TextReader<R> {
    pub fn new(inner: R, base: u8, name: impl Into<String>) -> Self {
        Self {
            inner,
            base,
            name: name.into(),
            finished: false,
        }
    }

    fn parse_line(&self, line: &str, line_no: usize) -> Result<Report> {
        let context = format!("{}:{}", self.name, line_no);
        let fields: Vec<&str> = line.split_whitespace().collect();
        let field = |i: usize| {
            fields
                .get(i)
                .copied()
                .ok_or_else(|| MergeError::format(&context, "line ends early"))
        };
        let expect = |i: usize, literal: &str| -> Result<()> {
            let found = field(i)?;
            if found != literal {
                return Err(MergeError::format(
                    &context,
                    format!("expected {} but found {}", literal, found),
                ));
            }
            Ok(())
        };
        // Counts are limited to 64 bits so that products of two sides fit.
        let number = |i: usize| -> Result<u128> {
            let s = field(i)?;
            s.parse::<u64>()
                .map(u128::from)
                .map_err(|_| MergeError::format(&context, format!("{:?} is not a 64-bit count", s)))
        };
        let flag = |i: usize| -> Result<bool> {
            match field(i)? {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(MergeError::format(&context, format!("{:?} is not 0 or 1", other))),
            }
        };
        let coordinate = |i: usize| -> Result<i16> {
            let s = field(i)?;
            s.parse()
                .map_err(|_| MergeError::format(&context, format!("{:?} is not a coordinate", s)))
        };

        let connectivity = Connectivity::from_label(field(0)?, self.base as usize)?;
        let token = Token::parse(field(1)?)?;

        let mut i = 2;
        let mut bricks = Vec::new();
        while field(i)? != "BASE_SYMMETRIC" {
            expect(i, &format!("B{}", bricks.len() + 1))?;
            bricks.push(Brick::new(flag(i + 1)?, coordinate(i + 2)?, coordinate(i + 3)?)?);
            i += 4;
        }
        let geometry = match bricks.len() {
            0 => None,
            n if n + 1 == self.base as usize => Some(Geometry(bricks)),
            n => {
                return Err(MergeError::format(
                    &context,
                    format!("{} bricks given for base {}", n, self.base),
                ))
            }
        };

        let base_symmetric = flag(i + 1)?;
        expect(i + 2, "TOTAL")?;
        let total = number(i + 3)?;
        expect(i + 4, "SYMMETRIC")?;
        let symmetric = number(i + 5)?;
        if fields.len() != i + 6 {
            return Err(MergeError::format(&context, "trailing fields"));
        }

        Ok(Report {
            token,
            connectivity,
            geometry,
            base_symmetry: if base_symmetric {
                BaseSymmetry::HALF
            } else {
                BaseSymmetry::NONE
            },
            counts: Counts::new(total, symmetric, 0),
        })
    }
}

impl<R: BufRead> BatchReader for TextReader<R> {
    fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.finished {
            return Ok(None);
        }
        self.finished = true;

        let mut reports = Vec::new();
        let mut line = String::new();
        let mut line_no = 0;
        loop {
            line.clear();
            if self.inner.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;
            let trimmed = line.trim();
            if trimmed.starts_with('Q') {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }
            reports.push(self.parse_line(trimmed, line_no)?);
        }
        debug!(stream = %self.name, reports = reports.len(), "text batch read");
        if reports.is_empty() {
            return Ok(None);
        }
        Ok(Some(Batch::new(reports)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
