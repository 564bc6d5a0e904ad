// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The bit-packed wave format.
//!
//! ```text
//! file    := 1 batch* end trailer padding
//! batch   := header record (0 record)* 1
//! header  := b180 [b90 if base % 4 == 0] [brick{base-1} in BrickHeader layout]
//! record  := color{base-1}  token:8  total:32  symmetric180:16  [symmetric90:8 if base % 4 == 0]
//! end     := header record-with-token-0
//! trailer := base:64 sum(total):64 sum(symmetric180):64 sum(symmetric90):64 records:64
//! ```
//!
//! Colors are 3 bits and describe positions 1..base; position 0 has color 0.
//! The trailer is only read when [`ReaderOptions::verify_trailer`] is set.

use crate::error::{MergeError, Result};
use crate::geometry::{Brick, Color, Connectivity, Geometry, Token, MAX_BASE};
use crate::wave::bits::{BitReader, BitWriter};
use crate::wave::{BaseSymmetry, Batch, BatchReader, Counts, PackedLayout, ReaderOptions, Report};
use std::io::{Read, Write};
use tracing::{debug, trace};

const TOKEN_BITS: u32 = 8;
const TOTAL_BITS: u32 = 32;
const SYMMETRIC180_BITS: u32 = 16;
const SYMMETRIC90_BITS: u32 = 8;
const TRAILER_BITS: u32 = 64;

fn has_quarter_turn(base: u8) -> bool {
    base % 4 == 0
}

fn check_base(base: u8) -> Result<()> {
    if !(2..=MAX_BASE as u8).contains(&base) {
        return Err(MergeError::InvalidConfig(format!(
            "base {} outside 2..={}",
            base, MAX_BASE
        )));
    }
    Ok(())
}

/// Decodes batches from a packed wave stream.
#[derive(Debug)]
pub struct PackedReader<R> {
    bits: BitReader<R>,
    base: u8,
    options: ReaderOptions,
    name: String,
    finished: bool,
    /// Running sums over all records, checked against the trailer.
    sums: Counts,
    records: u64,
}

impl<R: Read> PackedReader<R> {
    /// Start reading a stream, checking the leading format marker bit.
    pub fn new(
        inner: R,
        base: u8,
        options: ReaderOptions,
        name: impl Into<String>,
    ) -> Result<Self> {
        check_base(base)?;
        let name = name.into();
        let mut bits = BitReader::new(inner);
        if !bits.read_bit()? {
            return Err(MergeError::format(&name, "missing format marker bit"));
        }
        debug!(stream = %name, base, "packed reader set up");
        Ok(Self {
            bits,
            base,
            options,
            name,
            finished: false,
            sums: Counts::default(),
            records: 0,
        })
    }

    fn read_header(&mut self) -> Result<(BaseSymmetry, Option<Geometry>)> {
        let rotation_180 = self.bits.read_bit()?;
        let rotation_90 = has_quarter_turn(self.base) && self.bits.read_bit()?;
        if rotation_90 && !rotation_180 {
            return Err(MergeError::format(
                &self.name,
                "base symmetric under 90 but not 180 degree rotation",
            ));
        }
        let geometry = match self.options.layout {
            PackedLayout::Compact => None,
            PackedLayout::BrickHeader => {
                let mut bricks = Vec::with_capacity(self.base as usize - 1);
                for _ in 1..self.base {
                    bricks.push(self.bits.read_brick()?);
                }
                Some(Geometry(bricks))
            }
        };
        Ok((
            BaseSymmetry {
                rotation_180,
                rotation_90,
            },
            geometry,
        ))
    }

    /// Read one record. Returns the token code (0 ends the stream).
    fn read_record(&mut self) -> Result<(u64, Connectivity, Counts)> {
        let mut tail = [Color::FIRST; MAX_BASE - 1];
        for color in tail.iter_mut().take(self.base as usize - 1) {
            *color = self.bits.read_color()?;
        }
        let connectivity = Connectivity::new(&tail[..self.base as usize - 1]);
        let code = self.bits.read_uint(TOKEN_BITS)?;
        let all = self.bits.read_uint(TOTAL_BITS)? as u128;
        let symmetric180 = self.bits.read_uint(SYMMETRIC180_BITS)? as u128;
        let symmetric90 = if has_quarter_turn(self.base) {
            self.bits.read_uint(SYMMETRIC90_BITS)? as u128
        } else {
            0
        };
        Ok((code, connectivity, Counts::new(all, symmetric180, symmetric90)))
    }

    fn read_trailer(&mut self) -> Result<()> {
        let mut fields = [0u64; 5];
        for field in fields.iter_mut() {
            *field = self.bits.read_uint(TRAILER_BITS)?;
        }
        let expected = [
            self.base as u128,
            self.sums.all,
            self.sums.symmetric180,
            self.sums.symmetric90,
            self.records as u128,
        ];
        const NAMES: [&str; 5] = ["base", "total", "symmetric180", "symmetric90", "records"];
        for ((name, &read), &counted) in NAMES.iter().zip(&fields).zip(&expected) {
            if read as u128 != counted {
                return Err(MergeError::format(
                    &self.name,
                    format!("trailer {} is {} but {} was counted", name, read, counted),
                ));
            }
        }
        debug!(stream = %self.name, records = self.records, "trailer verified");
        Ok(())
    }
}

impl<R: Read> BatchReader for PackedReader<R> {
    fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.finished {
            return Ok(None);
        }
        let (base_symmetry, geometry) = self.read_header()?;
        let mut reports = Vec::new();
        let mut first = true;
        loop {
            if !first && self.bits.read_bit()? {
                trace!(stream = %self.name, reports = reports.len(), "batch decoded");
                return Ok(Some(Batch::new(reports)));
            }
            first = false;

            let (code, connectivity, counts) = self.read_record()?;
            if code == 0 {
                if !reports.is_empty() {
                    return Err(MergeError::format(
                        &self.name,
                        "end-of-stream record inside a batch",
                    ));
                }
                self.finished = true;
                if self.options.verify_trailer {
                    self.read_trailer()?;
                }
                debug!(stream = %self.name, records = self.records, "end of stream");
                return Ok(None);
            }

            self.sums += counts;
            self.records += 1;
            reports.push(Report {
                token: Token::from_code(code)?,
                connectivity,
                geometry: geometry.clone(),
                base_symmetry,
                counts,
            });
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Encodes batches in the packed wave format.
#[derive(Debug)]
pub struct PackedWriter<W: Write> {
    bits: BitWriter<W>,
    base: u8,
    layout: PackedLayout,
    sums: Counts,
    records: u64,
}

impl<W: Write> PackedWriter<W> {
    /// Start a stream, writing the format marker bit.
    pub fn new(inner: W, base: u8, layout: PackedLayout) -> Result<Self> {
        check_base(base)?;
        let mut bits = BitWriter::new(inner);
        bits.write_bit(true)?;
        Ok(Self {
            bits,
            base,
            layout,
            sums: Counts::default(),
            records: 0,
        })
    }

    /// Write one non-empty batch.
    ///
    /// All reports must share the base symmetry (and, in the brick header
    /// layout, the geometry) of the first report.
    pub fn write_batch(&mut self, batch: &Batch) -> Result<()> {
        let first = batch
            .reports
            .first()
            .ok_or_else(|| MergeError::format("packed writer", "empty batch"))?;
        for report in &batch.reports {
            if report.base_symmetry != first.base_symmetry || report.geometry != first.geometry {
                return Err(MergeError::InconsistentBaseSymmetry {
                    token: report.token.to_string(),
                    first: first.base_symmetry.to_string(),
                    second: report.base_symmetry.to_string(),
                });
            }
        }

        self.write_header(first.base_symmetry, first.geometry.as_ref())?;
        for (i, report) in batch.reports.iter().enumerate() {
            if i > 0 {
                self.bits.write_bit(false)?;
            }
            let code: u64 = report
                .token
                .as_str()
                .parse()
                .ok()
                .filter(|&code| code < 1 << TOKEN_BITS)
                .ok_or_else(|| {
                    MergeError::format("packed writer", format!("token {} too long", report.token))
                })?;
            self.write_record(code, &report.connectivity, &report.counts)?;
            self.sums += report.counts;
            self.records += 1;
        }
        self.bits.write_bit(true)
    }

    /// Write the end-of-stream record and the trailer, returning the sink.
    pub fn finish(mut self) -> Result<W> {
        let geometry = match self.layout {
            PackedLayout::Compact => None,
            PackedLayout::BrickHeader => Some(Geometry(vec![
                Brick::new(false, 0, 0)?;
                self.base as usize - 1
            ])),
        };
        self.write_header(BaseSymmetry::NONE, geometry.as_ref())?;
        let end = Connectivity::fully_connected(self.base as usize);
        self.write_record(0, &end, &Counts::default())?;

        let trailer = [
            self.base as u128,
            self.sums.all,
            self.sums.symmetric180,
            self.sums.symmetric90,
            self.records as u128,
        ];
        for value in trailer {
            let value = u64::try_from(value)
                .map_err(|_| MergeError::format("packed writer", "trailer sum exceeds 64 bits"))?;
            self.bits.write_uint(value, TRAILER_BITS)?;
        }
        self.bits.finish()
    }

    fn write_header(&mut self, symmetry: BaseSymmetry, geometry: Option<&Geometry>) -> Result<()> {
        self.bits.write_bit(symmetry.rotation_180)?;
        if has_quarter_turn(self.base) {
            self.bits.write_bit(symmetry.rotation_90)?;
        } else if symmetry.rotation_90 {
            return Err(MergeError::format(
                "packed writer",
                format!("base {} cannot be symmetric under 90 degree rotation", self.base),
            ));
        }
        match (self.layout, geometry) {
            (PackedLayout::Compact, None) => Ok(()),
            (PackedLayout::BrickHeader, Some(geometry))
                if geometry.bricks().len() == self.base as usize - 1 =>
            {
                for brick in geometry.bricks() {
                    self.bits.write_brick(brick)?;
                }
                Ok(())
            }
            _ => Err(MergeError::format(
                "packed writer",
                "geometry does not match the layout",
            )),
        }
    }

    fn write_record(
        &mut self,
        code: u64,
        connectivity: &Connectivity,
        counts: &Counts,
    ) -> Result<()> {
        if connectivity.len() != self.base as usize {
            return Err(MergeError::format(
                "packed writer",
                format!("connectivity {} is not for base {}", connectivity, self.base),
            ));
        }
        let fits = |value: u128, width: u32| value < 1 << width;
        if !fits(counts.all, TOTAL_BITS)
            || !fits(counts.symmetric180, SYMMETRIC180_BITS)
            || !fits(counts.symmetric90, SYMMETRIC90_BITS)
            || (counts.symmetric90 > 0 && !has_quarter_turn(self.base))
        {
            return Err(MergeError::format(
                "packed writer",
                format!("counts {} do not fit the record", counts),
            ));
        }
        for &color in &connectivity.colors()[1..] {
            self.bits.write_color(color)?;
        }
        self.bits.write_uint(code, TOKEN_BITS)?;
        self.bits.write_uint(counts.all as u64, TOTAL_BITS)?;
        self.bits.write_uint(counts.symmetric180 as u64, SYMMETRIC180_BITS)?;
        if has_quarter_turn(self.base) {
            self.bits.write_uint(counts.symmetric90 as u64, SYMMETRIC90_BITS)?;
        }
        Ok(())
    }
}
