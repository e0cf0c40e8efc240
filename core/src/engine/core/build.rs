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

//! The build phase (§4.3): buffer every build-side row into the slab
//! allocator as it streams in, then -- once the whole build side has
//! been seen -- size and populate the directory in one pass.
//!
//! The directory is sized from the final row count, not grown
//! incrementally, so there is no such thing as a partially-sized
//! directory: `push` only ever allocates rows, and `finalize` is the
//! one place the table and pre-filter come into existence.

use super::operator::LookupSource;
use crate::engine::decoder::DecodedBlock;
use crate::engine::idx::directory::HashTable;
use crate::engine::idx::prefilter::PreFilter;
use crate::engine::mem::pool::SlabPool;
use crate::engine::mem::slab::{RowAddr, SlabAllocator};
use crate::JoinConfig;
use std::sync::Arc;

pub struct BuildPhase {
    rows: SlabAllocator,
    use_bloom_filter: bool,
}

impl BuildPhase {
    pub fn new(pool: Arc<SlabPool>, config: &JoinConfig) -> Self {
        Self {
            rows: SlabAllocator::new(pool, config.recycle_table),
            use_bloom_filter: config.use_bloom_filter,
        }
    }

    /// Absorb one build-side batch. `k1`, `k2`, `d1` must all have the
    /// same row count -- the caller (the operator) is the one that
    /// drives the three decoders in lockstep. A row whose join key has
    /// a `NULL` in either column can never match anything and is
    /// dropped here rather than carried all the way to probe time.
    pub fn push(&mut self, k1: &DecodedBlock, k2: &DecodedBlock, d1: &DecodedBlock) {
        debug_assert_eq!(k1.len(), k2.len());
        debug_assert_eq!(k1.len(), d1.len());
        for i in 0..k1.len() {
            if k1.is_null(i) || k2.is_null(i) {
                continue;
            }
            let d1_value = if d1.is_null(i) { 0 } else { d1.value(i) };
            self.rows
                .alloc_row(k1.value(i), k2.value(i), d1_value, RowAddr::NONE);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Consume the buffered rows and build the directory (and, if
    /// configured, the pre-filter) in one pass. This is the only
    /// allocation-heavy step in the whole build phase.
    pub fn finalize(mut self) -> LookupSource {
        let total = self.rows.len();
        let mut table = HashTable::with_capacity(total);
        let mut prefilter = self.use_bloom_filter.then(|| PreFilter::with_capacity(total));
        for i in 0..total {
            let addr = self.rows.addr_at(i);
            let row = self.rows.get(addr);
            let hash = crate::engine::hash::hash_pair(row.k1, row.k2);
            table.insert(hash, row.k1, row.k2, addr, &mut self.rows);
            if let Some(filter) = prefilter.as_mut() {
                filter.insert(hash);
            }
        }
        log::debug!(
            "build side finalized: {total} rows, {} buckets, bloom filter {}",
            table.bucket_count(),
            if prefilter.is_some() { "on" } else { "off" }
        );
        LookupSource::new(self.rows, table, prefilter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(values: Vec<i64>) -> DecodedBlock {
        DecodedBlock {
            longs: values,
            null_bitmap: None,
            row_map: None,
            is_identity_map: true,
        }
    }

    #[test]
    fn push_skips_null_keys() {
        let pool = Arc::new(SlabPool::default());
        let mut build = BuildPhase::new(pool, &JoinConfig::default());
        let k1 = DecodedBlock {
            longs: vec![1, 2, 3],
            null_bitmap: Some(vec![false, true, false]),
            row_map: None,
            is_identity_map: true,
        };
        let k2 = block(vec![10, 20, 30]);
        let d1 = block(vec![100, 200, 300]);
        build.push(&k1, &k2, &d1);
        assert_eq!(build.row_count(), 2);
    }

    #[test]
    fn finalize_builds_a_queryable_source() {
        let pool = Arc::new(SlabPool::default());
        let mut build = BuildPhase::new(pool, &JoinConfig::default());
        build.push(&block(vec![1, 2]), &block(vec![1, 2]), &block(vec![10, 20]));
        let source = build.finalize();
        assert_eq!(source.len(), 2);
    }
}
