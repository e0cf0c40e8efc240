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

//! The probe phase (§4.4): one probe-side batch is pushed in, then
//! drained out through possibly many `pull()` calls, because a single
//! probe row can match an unbounded number of build-side duplicates
//! and every output batch is capped at
//! [`output_batch_size`](crate::JoinConfig::output_batch_size) rows.
//!
//! The scan over fresh probe rows is unrolled four lanes at a time: the
//! hash and starting bucket for up to four rows are computed before any
//! of them touch the directory, so the four independent cache misses on
//! `status_word`/`slot` can all be in flight together instead of
//! serialized one probe row at a time.

use super::operator::LookupSource;
use crate::engine::hash::hash_pair;
use crate::engine::mem::slab::RowAddr;
use crate::util::compiler::unlikely;

const PIPELINE_WIDTH: usize = 4;

/// One emitted batch of join output. `probe_row[i]` and `build_d1[i]`
/// describe output row `i`: which logical row of the probe batch it
/// came from, and the payload column from the matching build row. The
/// caller is expected to gather any other pass-through probe columns
/// itself, indexed by `probe_row`.
pub struct OutputBatch {
    pub build_d1: Vec<i64>,
    pub probe_row: Vec<u32>,
}

impl OutputBatch {
    pub fn len(&self) -> usize {
        self.build_d1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.build_d1.is_empty()
    }
}

pub struct ProbePhase {
    source: LookupSource,
    use_bloom_filter: bool,
    output_batch_size: usize,

    batch_k1: Vec<i64>,
    batch_k2: Vec<i64>,
    batch_valid: Vec<bool>,
    batch_len: usize,
    has_batch: bool,
    next_row: usize,

    /// The remainder of a match chain that didn't fit in the last
    /// emitted batch, plus which probe row it belongs to. `NONE` means
    /// there's nothing left over from a previous `pull()`.
    current_chain: RowAddr,
    current_probe_row: u32,

    /// Counts directory walks actually issued (i.e. not short-circuited
    /// by the pre-filter). Exists for test observability of scenario F;
    /// not part of any output contract.
    directory_probes: u64,
}

impl ProbePhase {
    pub fn new(source: LookupSource, use_bloom_filter: bool, output_batch_size: usize) -> Self {
        Self {
            source,
            use_bloom_filter,
            output_batch_size,
            batch_k1: Vec::new(),
            batch_k2: Vec::new(),
            batch_valid: Vec::new(),
            batch_len: 0,
            has_batch: false,
            next_row: 0,
            current_chain: RowAddr::NONE,
            current_probe_row: 0,
            directory_probes: 0,
        }
    }

    /// `true` once the current probe batch (if any) has been fully
    /// drained and another one may be pushed.
    pub fn needs_input(&self) -> bool {
        !self.has_batch && self.current_chain.is_none()
    }

    /// Number of directory walks actually issued so far (pre-filter
    /// short-circuits never increment this).
    pub fn directory_probe_count(&self) -> u64 {
        self.directory_probes
    }

    /// `true` when there is nothing left to `pull()` right now. Unlike
    /// `needs_input`, this can be `true` while a chain continuation is
    /// still pending -- it only reflects "nothing to emit this call".
    pub fn is_drained(&self) -> bool {
        !self.has_batch && self.current_chain.is_none() && self.next_row >= self.batch_len
    }

    /// `valid[i] == false` means probe row `i` has a null in either
    /// join-key column: it is kept in the batch (so its position still
    /// lines up with whatever pass-through columns the caller tracks)
    /// but never touches the directory and never appears in any
    /// output batch (§8 invariant 2).
    pub fn push(&mut self, k1: Vec<i64>, k2: Vec<i64>, valid: Vec<bool>) {
        debug_assert!(self.needs_input());
        debug_assert_eq!(k1.len(), k2.len());
        debug_assert_eq!(k1.len(), valid.len());
        self.batch_len = k1.len();
        self.batch_k1 = k1;
        self.batch_k2 = k2;
        self.batch_valid = valid;
        self.next_row = 0;
        self.has_batch = self.batch_len > 0;
    }

    pub fn source(&self) -> &LookupSource {
        &self.source
    }

    pub fn into_source(self) -> LookupSource {
        self.source
    }

    fn drain_chain(&mut self, build_d1: &mut Vec<i64>, probe_row: &mut Vec<u32>) {
        while !self.current_chain.is_none() && build_d1.len() < self.output_batch_size {
            let row = self.source.rows().get(self.current_chain);
            build_d1.push(row.d1);
            probe_row.push(self.current_probe_row);
            self.current_chain = row.next;
        }
    }

    pub fn pull(&mut self) -> Option<OutputBatch> {
        if !self.has_batch && self.current_chain.is_none() {
            return None;
        }

        let mut build_d1 = Vec::with_capacity(self.output_batch_size);
        let mut probe_row = Vec::with_capacity(self.output_batch_size);

        if !self.current_chain.is_none() {
            self.drain_chain(&mut build_d1, &mut probe_row);
            if build_d1.len() == self.output_batch_size {
                return Some(OutputBatch { build_d1, probe_row });
            }
        }

        'scan: while self.next_row < self.batch_len {
            let lanes = (self.batch_len - self.next_row).min(PIPELINE_WIDTH);

            // Stage 1: independent work for every lane in this group --
            // no data-dependent branching, nothing here can stall on an
            // earlier lane's directory walk.
            let mut hash_lane = [0u64; PIPELINE_WIDTH];
            let mut k1_lane = [0i64; PIPELINE_WIDTH];
            let mut k2_lane = [0i64; PIPELINE_WIDTH];
            for lane in 0..lanes {
                let row = self.next_row + lane;
                let k1 = self.batch_k1[row];
                let k2 = self.batch_k2[row];
                k1_lane[lane] = k1;
                k2_lane[lane] = k2;
                hash_lane[lane] = hash_pair(k1, k2);
            }

            // Stage 2: resolve each lane. Only now does a cache miss on
            // the directory actually happen, and by this point all four
            // hashes are already sitting in registers/L1.
            for lane in 0..lanes {
                if !self.batch_valid[self.next_row + lane] {
                    // null join key: never matches anything (§8 invariant 2).
                    continue;
                }
                let hash = hash_lane[lane];
                if self.use_bloom_filter {
                    if let Some(filter) = self.source.prefilter() {
                        if unlikely(!filter.may_contain(hash)) {
                            continue;
                        }
                    }
                }
                self.directory_probes += 1;
                let head =
                    self.source
                        .table()
                        .find_chain_head(hash, k1_lane[lane], k2_lane[lane], self.source.rows());
                if head.is_none() {
                    continue;
                }
                self.current_probe_row = (self.next_row + lane) as u32;
                self.current_chain = head;
                self.drain_chain(&mut build_d1, &mut probe_row);
                if build_d1.len() == self.output_batch_size {
                    self.next_row += lane + 1;
                    if self.next_row >= self.batch_len && self.current_chain.is_none() {
                        self.has_batch = false;
                    }
                    break 'scan;
                }
            }
            self.next_row += lanes;
        }

        if self.next_row >= self.batch_len && self.current_chain.is_none() {
            self.has_batch = false;
        }

        if build_d1.is_empty() {
            None
        } else {
            Some(OutputBatch { build_d1, probe_row })
        }
    }
}
