/*
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2023, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! The boundary between this crate and the surrounding columnar engine
//! (§6). A [`BlockDecoder`] is the only way rows get in or out of this
//! crate; it is supplied by the host and never implemented here except
//! for the in-tree test double at the bottom of this file.
//!
//! One decoder decodes one `BIGINT` column at a time. The build phase
//! drives three of them in lockstep (`k1`, `k2`, `d1`); the probe phase
//! drives two (`k1`, `k2`), plus however many pass-through payload
//! columns the host wants echoed back out alongside a match.

use crate::engine::error::JoinResult;

/// One decoded column-block: a flat run of `i64`s plus the bookkeeping
/// the decoder needs to exist because real columnar blocks are rarely
/// "just an array" -- they carry nulls and are sometimes a view over a
/// larger physical block via a row-number map (post-filter, post-sort).
pub struct DecodedBlock {
    pub longs: Vec<i64>,
    /// One bit per logical row, set if that row is SQL `NULL`. `None`
    /// means the column has no nulls in this block at all.
    pub null_bitmap: Option<Vec<bool>>,
    /// `row_map[i]` is the physical row number backing logical row `i`.
    /// `None` (equivalently, `is_identity_map == true`) means logical
    /// row `i` IS physical row `i`.
    pub row_map: Option<Vec<u32>>,
    pub is_identity_map: bool,
}

impl DecodedBlock {
    pub fn len(&self) -> usize {
        self.longs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longs.is_empty()
    }

    #[inline(always)]
    pub fn is_null(&self, logical_row: usize) -> bool {
        match &self.null_bitmap {
            Some(bitmap) => bitmap[logical_row],
            None => false,
        }
    }

    /// The actual value to join/store on for this logical row. The
    /// row-number map is only ever a level of indirection into
    /// `longs`, never a filter -- callers still index `longs` directly
    /// when `is_identity_map` is true, which is the common case.
    #[inline(always)]
    pub fn value(&self, logical_row: usize) -> i64 {
        match &self.row_map {
            Some(map) => self.longs[map[logical_row] as usize],
            None => self.longs[logical_row],
        }
    }
}

/// A pull-based source of column blocks. The host owns the real
/// columnar storage; this crate only ever asks for "the next block" or
/// "is there more data" and never reaches past this trait.
pub trait BlockDecoder {
    /// Decode and return the next block, or `None` once the column is
    /// exhausted. A `Decoder`-kind [`JoinError`](crate::JoinError) may
    /// be raised for any host-side decode failure (corrupt block,
    /// short read, and so on); this crate never tries to recover from
    /// one, it only propagates it to the caller.
    fn next_block(&mut self) -> JoinResult<Option<DecodedBlock>>;
}

/// An in-memory [`BlockDecoder`] over pre-decoded batches, used by this
/// crate's own tests and suitable as a reference for a host's first
/// integration.
pub struct VecBlockDecoder {
    batches: std::vec::IntoIter<Vec<i64>>,
}

impl VecBlockDecoder {
    pub fn new(batches: Vec<Vec<i64>>) -> Self {
        Self {
            batches: batches.into_iter(),
        }
    }
}

impl BlockDecoder for VecBlockDecoder {
    fn next_block(&mut self) -> JoinResult<Option<DecodedBlock>> {
        Ok(self.batches.next().map(|longs| DecodedBlock {
            longs,
            null_bitmap: None,
            row_map: None,
            is_identity_map: true,
        }))
    }
}
