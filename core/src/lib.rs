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

//! `joincore`: the core of a vectorized, cache-conscious hash join over a
//! composite `(BIGINT, BIGINT)` key.
//!
//! This crate owns exactly one thing: an in-memory multimap from
//! `(k1, k2)` to one or more `d1` payloads, built once from a stream of
//! build-side batches and then probed repeatedly by probe-side batches,
//! emitting matches as fixed-size output batches. Everything else --
//! the surrounding query engine, its task scheduling, network shuffle,
//! the real columnar block format, the query planner -- is an external
//! collaborator and is intentionally absent from this crate. See
//! `SPEC_FULL.md` at the workspace root for the full contract.

#![allow(dead_code)]

pub mod config;
pub mod engine;
mod util;

pub use config::JoinConfig;
pub use engine::core::operator::{JoinOperator, LookupSource};
pub use engine::decoder::{BlockDecoder, DecodedBlock};
pub use engine::error::{JoinError, JoinResult};
pub use engine::mem::pool::SlabPool;
