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

//! A pool of free slabs, guarded by a single [`parking_lot::Mutex`] so
//! acquire/release stay O(1) even under contention. Slabs are handed
//! back out exactly as they were released -- nothing zeroes a reused
//! slab's old row contents, since a reader only ever looks at a row
//! address this allocator itself produced.

use super::slab::{RowRecord, ROWS_PER_SLAB};
use parking_lot::Mutex;

/// Process-wide free list of row slabs. Construct one per [`SlabPool`]
/// "domain" -- see `DESIGN.md` for why this crate hands callers a
/// freshly constructed pool per operator rather than reaching for a
/// single lazy global.
pub struct SlabPool {
    free: Mutex<Vec<Box<[RowRecord]>>>,
    recycle: bool,
}

impl SlabPool {
    /// `recycle = false` makes [`release`](Self::release) drop slabs
    /// instead of returning them, trading peak memory for a simpler
    /// teardown when a caller knows it won't build another table soon.
    pub fn new(recycle: bool) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            recycle,
        }
    }

    pub fn acquire(&self) -> Box<[RowRecord]> {
        if let Some(slab) = self.free.lock().pop() {
            return slab;
        }
        vec![RowRecord::default(); ROWS_PER_SLAB].into_boxed_slice()
    }

    pub fn release(&self, slab: Box<[RowRecord]>) {
        if self.recycle {
            self.free.lock().push(slab);
        }
    }

    /// Number of whole slabs currently sitting in the free list.
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }
}

impl Default for SlabPool {
    fn default() -> Self {
        Self::new(true)
    }
}
