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

//! The 8-way bucket directory (§4.2, §4.3): one status word per bucket,
//! eight row-chain heads per bucket, linear probing from bucket to
//! bucket when a bucket's eight slots are all taken.
//!
//! A directory never deletes a chain head and never shrinks -- a build
//! phase either fully populates one of these and hands it to a probe
//! phase, or the whole operator is abandoned. That keeps the probe-side
//! read path lock-free and allocation-free.

use crate::engine::hash::{group_empty, group_match, h7, set_status_byte, ALL_EMPTY};
use crate::engine::mem::slab::{RowAddr, SlabAllocator};

/// `B = max(1024, next_pow2(ceil(1.3 * entries)))`, so the directory
/// stays well under a 0.77 load factor even right after the last insert
/// (§4.2).
fn bucket_count(expected_entries: usize) -> usize {
    let target = (expected_entries as f64 * 1.3).ceil() as usize;
    target.max(1024).next_power_of_two()
}

pub struct HashTable {
    status: Vec<u64>,
    table: Vec<RowAddr>,
    mask: usize,
}

impl HashTable {
    pub fn with_capacity(expected_entries: usize) -> Self {
        let buckets = bucket_count(expected_entries);
        Self {
            status: vec![ALL_EMPTY; buckets],
            table: vec![RowAddr::NONE; buckets * 8],
            mask: buckets - 1,
        }
    }

    #[inline(always)]
    pub fn bucket_count(&self) -> usize {
        self.mask + 1
    }

    #[inline(always)]
    pub fn start_bucket(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    #[inline(always)]
    pub fn next_bucket(&self, bucket: usize) -> usize {
        (bucket + 1) & self.mask
    }

    #[inline(always)]
    pub fn status_word(&self, bucket: usize) -> u64 {
        self.status[bucket]
    }

    #[inline(always)]
    pub fn slot(&self, bucket: usize, lane: usize) -> RowAddr {
        self.table[bucket * 8 + lane]
    }

    /// Insert `new_addr` (a row already written into `rows` with
    /// `next = RowAddr::NONE`) under `hash`. If a row with the same
    /// `(k1, k2)` already occupies this directory, `new_addr` becomes
    /// the new chain head and its `next` is rewritten to point at the
    /// old head -- duplicates are never compared away, only chained
    /// (§4.3).
    pub fn insert(
        &mut self,
        hash: u64,
        k1: i64,
        k2: i64,
        new_addr: RowAddr,
        rows: &mut SlabAllocator,
    ) {
        let tag = h7(hash);
        let mut bucket = self.start_bucket(hash);
        loop {
            let st = self.status[bucket];
            let mut matches = group_match(st, tag);
            while let Some(lane) = matches.pop_lowest() {
                let existing = self.table[bucket * 8 + lane];
                let row = rows.get(existing);
                if row.k1 == k1 && row.k2 == k2 {
                    rows.set_next(new_addr, existing);
                    self.table[bucket * 8 + lane] = new_addr;
                    return;
                }
            }
            if let Some(lane) = group_empty(st).lowest() {
                self.status[bucket] = set_status_byte(st, lane, tag);
                self.table[bucket * 8 + lane] = new_addr;
                return;
            }
            bucket = self.next_bucket(bucket);
        }
    }

    /// Sequential (non-pipelined) chain-head lookup, used by tests and
    /// by any caller that doesn't need the 4-way pipelined probe loop.
    pub fn find_chain_head(&self, hash: u64, k1: i64, k2: i64, rows: &SlabAllocator) -> RowAddr {
        let tag = h7(hash);
        let mut bucket = self.start_bucket(hash);
        loop {
            let st = self.status[bucket];
            let mut matches = group_match(st, tag);
            while let Some(lane) = matches.pop_lowest() {
                let candidate = self.table[bucket * 8 + lane];
                let row = rows.get(candidate);
                if row.k1 == k1 && row.k2 == k2 {
                    return candidate;
                }
            }
            if !group_empty(st).is_empty() {
                return RowAddr::NONE;
            }
            bucket = self.next_bucket(bucket);
        }
    }
}
