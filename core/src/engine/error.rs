/*
 * Created on Sat Feb 04 2023
 *
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

use core::fmt;

pub type JoinResult<T> = Result<T, JoinError>;

#[derive(Debug)]
#[non_exhaustive]
/// Errors produced by the join core. Per §7 of the core spec: no
/// condition is retried internally, and a partial build is never
/// observed by the caller -- either `finalize()` returns a usable
/// lookup source, or the operator must be abandoned and `close()`d.
pub enum JoinError {
    /// The caller's column types/join-channel count fell outside the
    /// `supports_layout` enablement gate. Raised synchronously, never
    /// after any state has been mutated.
    UnsupportedLayout { reason: &'static str },
    /// The slab pool or the directory allocation failed. Fatal to the
    /// operator instance; there is no retry.
    AllocationFailure,
    /// Surfaced as-is from the [`BlockDecoder`](crate::engine::decoder::BlockDecoder).
    Decoder(String),
    /// `push`/`pull` was called after `close()`. This is a programmer
    /// error: debug builds additionally `debug_assert!` at the call
    /// site so misuse panics immediately during development.
    OperatorClosed,
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedLayout { reason } => {
                write!(f, "unsupported layout for hash join: {reason}")
            }
            Self::AllocationFailure => write!(f, "failed to allocate hash join memory"),
            Self::Decoder(msg) => write!(f, "block decoder error: {msg}"),
            Self::OperatorClosed => write!(f, "join operator used after close()"),
        }
    }
}

impl std::error::Error for JoinError {}
