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

//! Tier thresholds and the priority classifier.
//!
//! The reference labeling tells us which fraction of an assessed collection
//! ends up in each tier. Those fractions are projected onto the current
//! ranking as index cut-points and the composite scores at the cut-points
//! become the tier thresholds.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::collection::{ArticleTitle, CategoryCounts};
use crate::config::TierCategories;
use crate::linkgraph::{fetch_link_counts, LinkCountStore};
use crate::pageviews::ViewDump;
use crate::ranking::{log_scaled, rank, score_members, SignalMaxima};
use crate::{Error, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Tier {
    Top,
    High,
    Mid,
    Low,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Top => f.write_str("Top"),
            Tier::High => f.write_str("High"),
            Tier::Mid => f.write_str("Mid"),
            Tier::Low => f.write_str("Low"),
        }
    }
}

/// How many reference articles currently carry each tier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierCounts {
    pub top: u64,
    pub high: u64,
    pub mid: u64,
    pub low: u64,
}

impl TierCounts {
    pub fn from_categories<C: CategoryCounts + ?Sized>(
        counter: &C,
        categories: &TierCategories,
    ) -> Result<Self> {
        Ok(Self {
            top: counter.page_count(&categories.top)?,
            high: counter.page_count(&categories.high)?,
            mid: counter.page_count(&categories.mid)?,
            low: counter.page_count(&categories.low)?,
        })
    }

    pub fn total(&self) -> u64 {
        self.top + self.high + self.mid + self.low
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("reference tier counts sum to zero")]
    NoAssessedPages,

    #[error("calibration index {index} for the {tier} tier is outside the ranking of {len} articles")]
    IndexOutOfRange { tier: Tier, index: i64, len: usize },

    #[error("calibration indices are misordered (top {top}, high {high}, mid {mid})")]
    MisorderedIndices { top: usize, high: usize, mid: usize },
}

/// Inclusive score lower bounds per tier. `top >= high >= mid` whenever
/// calibration succeeds; anything below `mid` is low priority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub top: f64,
    pub high: f64,
    pub mid: f64,
}

impl TierThresholds {
    /// Derives thresholds from the descending ranking and the reference
    /// tier proportions.
    ///
    /// Disproportionate reference counts (an index outside the ranking, or
    /// cut-points out of order) are calibration-input errors. Clamping them
    /// would silently reorder the thresholds, so they are fatal instead.
    pub fn calibrate(
        ranked: &[(ArticleTitle, f64)],
        counts: TierCounts,
    ) -> Result<Self, CalibrationError> {
        let total = counts.total();
        if total == 0 {
            return Err(CalibrationError::NoAssessedPages);
        }

        let top = Self::cut_index(Tier::Top, counts.top, total, ranked.len())?;
        let high = Self::cut_index(Tier::High, counts.high, total, ranked.len())?;
        let mid = Self::cut_index(Tier::Mid, counts.mid, total, ranked.len())?;

        if top > high || high > mid {
            return Err(CalibrationError::MisorderedIndices { top, high, mid });
        }

        Ok(Self {
            top: ranked[top].1,
            high: ranked[high].1,
            mid: ranked[mid].1,
        })
    }

    fn cut_index(
        tier: Tier,
        count: u64,
        total: u64,
        len: usize,
    ) -> Result<usize, CalibrationError> {
        let index = ((count as f64 / total as f64) * len as f64).floor() as i64 - 1;

        if index < 0 || index >= len as i64 {
            return Err(CalibrationError::IndexOutOfRange { tier, index, len });
        }

        Ok(index as usize)
    }

    /// First threshold the score clears, checked from the top down.
    pub fn tier(&self, score: f64) -> Tier {
        if score >= self.top {
            Tier::Top
        } else if score >= self.high {
            Tier::High
        } else if score >= self.mid {
            Tier::Mid
        } else {
            Tier::Low
        }
    }
}

/// Classifies articles into priority tiers for one collection snapshot.
///
/// All state is built once in [`PriorityPredictor::build`] and read-only
/// afterwards. A new snapshot requires a new predictor.
pub struct PriorityPredictor<L: LinkCountStore> {
    score_unranked: FxHashMap<ArticleTitle, f64>,
    ranked: Vec<(ArticleTitle, f64)>,
    maxima: SignalMaxima,
    thresholds: TierThresholds,
    dump: ViewDump,
    links: L,
    batch_size: usize,
}

impl<L: LinkCountStore> PriorityPredictor<L> {
    pub fn build(
        project: &str,
        members: Vec<ArticleTitle>,
        dump: ViewDump,
        links: L,
        counts: TierCounts,
        batch_size: usize,
    ) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::EmptyCollection(project.to_string()).into());
        }

        tracing::info!(project, num_members = members.len(), "scoring member articles");

        let pageviews: Vec<(ArticleTitle, u64)> = members
            .iter()
            .map(|title| (title.clone(), dump.views(title.as_str())))
            .collect();
        let linkcounts = fetch_link_counts(&links, &members, batch_size)?;

        let scores = score_members(&pageviews, &linkcounts)?;
        let maxima = scores.maxima();
        let ranked = rank(&scores);

        let thresholds = TierThresholds::calibrate(&ranked, counts)?;
        tracing::info!(?thresholds, "calibrated tier thresholds");

        let score_unranked = scores
            .iter()
            .map(|(title, score)| (title.clone(), score))
            .collect();

        Ok(Self {
            score_unranked,
            ranked,
            maxima,
            thresholds,
            dump,
            links,
            batch_size,
        })
    }

    /// The priority tier of any article.
    ///
    /// Members read their cached composite score. Unknown titles get a
    /// one-off score from fresh lookups, normalized against the maxima
    /// captured at build time; such scores can exceed 1.0 and drift as the
    /// underlying distribution moves, which is accepted.
    pub fn predict(&self, title: &ArticleTitle) -> Result<Tier> {
        let score = match self.score_unranked.get(title) {
            Some(score) => *score,
            None => self.score_unseen(title)?,
        };

        Ok(self.thresholds.tier(score))
    }

    fn score_unseen(&self, title: &ArticleTitle) -> Result<f64> {
        let views_log = log_scaled(self.dump.views(title.as_str()));

        let links_log = fetch_link_counts(&self.links, std::slice::from_ref(title), self.batch_size)?
            .pop()
            .map(|(_, links)| links)
            .unwrap_or(0.0);

        Ok(self.maxima.composite(views_log, links_log))
    }

    pub fn thresholds(&self) -> TierThresholds {
        self.thresholds
    }

    pub fn ranked(&self) -> &[(ArticleTitle, f64)] {
        &self.ranked
    }

    pub fn num_members(&self) -> usize {
        self.ranked.len()
    }

    /// Pagecount units that were skipped while aggregating traffic.
    pub fn skipped_units(&self) -> usize {
        self.dump.skipped_units()
    }
}
