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

//! The push/pull operator surface (§4.5, §6) that the surrounding query
//! engine actually schedules against, and the `supportsLayout`
//! enablement gate that decides whether this crate's specialized join
//! can run a given query at all.

use super::build::BuildPhase;
use super::probe::{OutputBatch, ProbePhase};
use crate::engine::idx::directory::HashTable;
use crate::engine::idx::prefilter::PreFilter;
use crate::engine::mem::pool::SlabPool;
use crate::engine::mem::slab::SlabAllocator;
use crate::{JoinConfig, JoinError, JoinResult};
use std::sync::Arc;

/// The column type this join understands. Every other SQL type routes
/// through the query engine's general-purpose join instead -- this
/// crate only ever sees the narrow, fully-specialized case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Other,
}

/// The finished, read-only build-side index. Immutable once produced
/// by [`BuildPhase::finalize`](super::build::BuildPhase::finalize);
/// probing never mutates a `LookupSource`.
pub struct LookupSource {
    rows: SlabAllocator,
    table: HashTable,
    prefilter: Option<PreFilter>,
}

impl LookupSource {
    pub(crate) fn new(rows: SlabAllocator, table: HashTable, prefilter: Option<PreFilter>) -> Self {
        Self {
            rows,
            table,
            prefilter,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn rows(&self) -> &SlabAllocator {
        &self.rows
    }

    pub(crate) fn table(&self) -> &HashTable {
        &self.table
    }

    pub(crate) fn prefilter(&self) -> Option<&PreFilter> {
        self.prefilter.as_ref()
    }
}

enum State {
    Building(BuildPhase),
    Probing(ProbePhase),
    Closed,
}

/// The join core as the query engine sees it: feed build-side batches
/// in, call [`finalize_build`](Self::finalize_build) once, then feed
/// probe-side batches in and pull matches out until the probe input is
/// exhausted. Every method after [`close`](Self::close) returns
/// [`JoinError::OperatorClosed`].
pub struct JoinOperator {
    state: State,
    config: JoinConfig,
}

impl JoinOperator {
    pub fn new(config: JoinConfig, pool: Arc<SlabPool>) -> Self {
        Self {
            state: State::Building(BuildPhase::new(pool, &config)),
            config,
        }
    }

    /// The enablement gate (§6): this join only ever runs over exactly
    /// two `BIGINT` join channels plus one `BIGINT` payload column.
    /// Anything else and the caller must fall back to a general join.
    pub fn supports_layout(column_types: &[ColumnType], join_channels: usize) -> bool {
        column_types.len() == 3
            && join_channels == 2
            && column_types.iter().all(|t| *t == ColumnType::BigInt)
    }

    pub fn push_build(
        &mut self,
        k1: &crate::DecodedBlock,
        k2: &crate::DecodedBlock,
        d1: &crate::DecodedBlock,
    ) -> JoinResult<()> {
        match &mut self.state {
            State::Building(build) => {
                build.push(k1, k2, d1);
                Ok(())
            }
            State::Probing(_) => Err(JoinError::UnsupportedLayout {
                reason: "build already finalized",
            }),
            State::Closed => {
                debug_assert!(false, "push_build called after close()");
                Err(JoinError::OperatorClosed)
            }
        }
    }

    /// Finish absorbing the build side and switch to probing. Calling
    /// this twice, or calling it before any build batch was pushed
    /// (an empty build side is legal -- it just never matches
    /// anything), is fine either way.
    pub fn finalize_build(&mut self) -> JoinResult<()> {
        let state = std::mem::replace(&mut self.state, State::Closed);
        match state {
            State::Building(build) => {
                log::trace!("build side finalized, switching to probing");
                let source = build.finalize();
                self.state = State::Probing(ProbePhase::new(
                    source,
                    self.config.use_bloom_filter,
                    self.config.output_batch_size,
                ));
                Ok(())
            }
            State::Probing(probe) => {
                self.state = State::Probing(probe);
                Ok(())
            }
            State::Closed => {
                debug_assert!(false, "finalize_build called after close()");
                Err(JoinError::OperatorClosed)
            }
        }
    }

    /// Push one probe-side batch. `k1`/`k2` may each carry nulls; a
    /// probe row with a null in either column is kept in the batch (so
    /// output `probe_row` indices still line up with it) but can never
    /// produce a match (§8 invariant 2).
    pub fn push_probe(&mut self, k1: &crate::DecodedBlock, k2: &crate::DecodedBlock) -> JoinResult<()> {
        match &mut self.state {
            State::Probing(probe) => {
                let n = k1.len();
                debug_assert_eq!(n, k2.len());
                let valid: Vec<bool> = (0..n).map(|i| !k1.is_null(i) && !k2.is_null(i)).collect();
                let k1_values: Vec<i64> = (0..n).map(|i| k1.value(i)).collect();
                let k2_values: Vec<i64> = (0..n).map(|i| k2.value(i)).collect();
                probe.push(k1_values, k2_values, valid);
                Ok(())
            }
            State::Building(_) => Err(JoinError::UnsupportedLayout {
                reason: "build side not finalized yet",
            }),
            State::Closed => {
                debug_assert!(false, "push_probe called after close()");
                Err(JoinError::OperatorClosed)
            }
        }
    }

    pub fn pull(&mut self) -> JoinResult<Option<OutputBatch>> {
        match &mut self.state {
            State::Probing(probe) => Ok(probe.pull()),
            State::Building(_) => Ok(None),
            State::Closed => {
                debug_assert!(false, "pull called after close()");
                Err(JoinError::OperatorClosed)
            }
        }
    }

    /// `true` when the operator is ready to accept another `push_*`
    /// call: always true while building, and true during probing once
    /// the previous probe batch has been fully drained.
    pub fn needs_input(&self) -> bool {
        match &self.state {
            State::Building(_) => true,
            State::Probing(probe) => probe.needs_input(),
            State::Closed => false,
        }
    }

    /// `isEmpty() = (statusMask == 0)` (§4.5): `true` iff the build side
    /// holds no rows at all, independent of whatever probe output may or
    /// may not be pending. A finalized, populated build side is never
    /// "empty" just because the current probe batch has been drained.
    pub fn is_empty(&self) -> bool {
        match &self.state {
            State::Building(build) => build.row_count() == 0,
            State::Probing(probe) => probe.source().is_empty(),
            State::Closed => true,
        }
    }

    /// Directory walks issued during probing so far -- test-only
    /// observability for the pre-filter's short-circuit path (§8
    /// scenario F). `0` while still building or after `close()`.
    pub fn directory_probe_count(&self) -> u64 {
        match &self.state {
            State::Probing(probe) => probe.directory_probe_count(),
            _ => 0,
        }
    }

    /// Release the directory, the pre-filter and every slab this
    /// operator holds. After this, every other method is a programmer
    /// error (`JoinError::OperatorClosed` in release builds, a panic
    /// in debug builds).
    pub fn close(&mut self) {
        log::trace!("join operator closed");
        self.state = State::Closed;
    }
}
