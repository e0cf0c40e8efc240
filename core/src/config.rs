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

//! Init-time configuration for a join operator. There is no file format
//! and no environment variable read by this crate (see §6 of the core
//! spec) -- the host builds a [`JoinConfig`] programmatically and hands
//! it to [`crate::engine::core::operator::JoinOperator::new`]. The
//! `serde` derives exist purely so a host that embeds `JoinConfig`
//! inside its own on-disk config can (de)serialize it; this crate never
//! touches the filesystem itself.

/// The fixed cap on rows per output batch, per §4.4/§8 invariant 3.
pub const DEFAULT_OUTPUT_BATCH_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JoinConfig {
    /// Populate and consult a four-bit-per-hash probabilistic pre-filter
    /// during build/probe (§3, §4.3, §4.4).
    pub use_bloom_filter: bool,
    /// Return released slabs to the process-wide [`SlabPool`](crate::SlabPool)
    /// instead of dropping them (§4.1).
    pub recycle_table: bool,
    /// Maximum rows per emitted output batch (§4.4's `maxResults`).
    pub output_batch_size: usize,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            use_bloom_filter: false,
            recycle_table: true,
            output_batch_size: DEFAULT_OUTPUT_BATCH_SIZE,
        }
    }
}
