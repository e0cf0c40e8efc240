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

//! An optional blocked membership filter (§3, §4.3, §4.4): one `u64`
//! word per roughly eight build-side rows, four bits set per key. A
//! probe whose word is missing any of its four bits cannot possibly
//! match and skips the directory walk entirely -- this is the "short
//! circuit" path exercised when a probe batch is mostly misses.
//!
//! This is strictly an optimization: turning it off (`use_bloom_filter:
//! false` in [`crate::JoinConfig`]) only ever costs extra directory
//! walks, never correctness.

pub struct PreFilter {
    words: Vec<u64>,
}

impl PreFilter {
    pub fn with_capacity(expected_entries: usize) -> Self {
        let len = expected_entries.div_ceil(8) + 1;
        Self {
            words: vec![0u64; len],
        }
    }

    #[inline(always)]
    fn word_index(&self, hash: u64) -> usize {
        (hash % self.words.len() as u64) as usize
    }

    #[inline(always)]
    fn bit_mask(hash: u64) -> u64 {
        let b0 = (hash >> 32) & 63;
        let b1 = (hash >> 38) & 63;
        let b2 = (hash >> 44) & 63;
        let b3 = (hash >> 50) & 63;
        (1u64 << b0) | (1u64 << b1) | (1u64 << b2) | (1u64 << b3)
    }

    pub fn insert(&mut self, hash: u64) {
        let idx = self.word_index(hash);
        self.words[idx] |= Self::bit_mask(hash);
    }

    /// `false` means "definitely not present" -- the caller may skip
    /// the directory entirely. `true` means "maybe present", the
    /// directory walk still has to run.
    #[inline(always)]
    pub fn may_contain(&self, hash: u64) -> bool {
        let idx = self.word_index(hash);
        let mask = Self::bit_mask(hash);
        self.words[idx] & mask == mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hash::hash_pair;

    #[test]
    fn inserted_keys_are_always_reported_maybe_present() {
        let mut filter = PreFilter::with_capacity(200);
        let hashes: Vec<u64> = (0..200i64).map(|i| hash_pair(i, i + 1)).collect();
        for &h in &hashes {
            filter.insert(h);
        }
        for &h in &hashes {
            assert!(filter.may_contain(h));
        }
    }

    #[test]
    fn never_inserted_keys_are_usually_rejected() {
        let mut filter = PreFilter::with_capacity(200);
        for i in 0..200i64 {
            filter.insert(hash_pair(i, i + 1));
        }
        let mut rejected = 0;
        let total = 2000;
        for i in 1_000_000..(1_000_000 + total) {
            if !filter.may_contain(hash_pair(i, i + 1)) {
                rejected += 1;
            }
        }
        // a 4-bit-per-key filter sized for the build side should reject
        // the overwhelming majority of keys it never saw.
        assert!(rejected > total * 9 / 10, "rejected only {rejected}/{total}");
    }
}
