// Priorank is an open source priority predictor for curated article collections.
// Copyright (C) 2024 Stract ApS
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Main library for Priorank.
//!
//! Priorank estimates an editorial priority tier (top/high/mid/low) for the
//! articles of a curated collection. Each member article gets a composite
//! score from two signals, recent pageviews and inbound links, and the score
//! thresholds between tiers are calibrated against the tier proportions of an
//! already-assessed reference labeling.

#![warn(clippy::too_many_lines)]

use thiserror::Error;

pub mod collection;
pub mod config;
pub mod entrypoint;
pub mod linkgraph;
pub mod pageviews;
pub mod priority;
pub mod ranking;

#[derive(Error, Debug)]
pub enum Error {
    #[error("project '{0}' has no member articles")]
    EmptyCollection(String),
}

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// A wrapper around `f64` that implements a total ordering
/// so floats can be used as sort keys.
#[derive(Debug, Clone, Copy)]
pub struct SortableFloat(pub f64);

impl From<f64> for SortableFloat {
    fn from(f: f64) -> Self {
        SortableFloat(f)
    }
}

impl From<SortableFloat> for f64 {
    fn from(f: SortableFloat) -> Self {
        f.0
    }
}

impl PartialEq for SortableFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SortableFloat {}

impl PartialOrd for SortableFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortableFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
