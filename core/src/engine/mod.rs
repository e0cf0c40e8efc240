/*
 * Created on Mon Sep 12 2022
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2022, Sayan Nandan <ohsayan@outlook.com>
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

#![allow(dead_code)]

pub mod core;
pub mod decoder;
pub mod error;
pub mod hash;
pub mod idx;
pub mod mem;

/*

    A word on tests:

    Everything below this module assumes a quiescent build phase followed
    by a quiescent probe phase -- there's no concurrent mutation to reason
    about here, unlike most of what this engine module used to hold. That
    makes most of the tests in this tree straightforward unit tests rather
    than the "illusionary, only atomically correct at a point in time"
    assertions the rest of the codebase has to live with.

*/
