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

//! Signal normalization, composite scoring and ranking.
//!
//! Both signals are normalized relative to the strongest member of the
//! collection: log-scale the raw count, divide by the largest log-scaled
//! count of that signal. The article with the most views therefore has a
//! normalized view signal of exactly 1.0. The composite score weighs the
//! view signal at 0.75 and the link signal at 0.25.

use std::cmp::Reverse;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::collection::ArticleTitle;
use crate::SortableFloat;

pub const VIEWS_WEIGHT: f64 = 0.75;
pub const LINKS_WEIGHT: f64 = 0.25;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("cannot score an empty member set")]
    EmptyMemberSet,

    #[error("every member article has a zero {0} count")]
    DegenerateSignal(&'static str),
}

/// Log-scale of a raw count.
///
/// A zero count clamps to 0.0 instead of `ln(0) = -inf`. Zero is the
/// explicit "no data" value of both aggregators, so it maps to the lowest
/// possible signal rather than poisoning the arithmetic downstream.
pub fn log_scaled(count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        (count as f64).ln()
    }
}

/// The largest log-scaled count per signal, captured once over the member
/// set.
///
/// Out-of-sample articles are normalized against these same maxima later,
/// so their scores can exceed 1.0 and can go stale as traffic shifts. That
/// is a documented approximation, not something to correct for here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalMaxima {
    pub most_views_log: f64,
    pub most_links_log: f64,
}

impl SignalMaxima {
    /// Composite score of one article from its log-scaled signals.
    pub fn composite(&self, views_log: f64, links_log: f64) -> f64 {
        VIEWS_WEIGHT * (views_log / self.most_views_log)
            + LINKS_WEIGHT * (links_log / self.most_links_log)
    }
}

/// One composite score per member article, in encounter order.
#[derive(Debug, Clone)]
pub struct Scores {
    maxima: SignalMaxima,
    scores: Vec<(ArticleTitle, f64)>,
}

impl Scores {
    pub fn maxima(&self) -> SignalMaxima {
        self.maxima
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArticleTitle, f64)> + '_ {
        self.scores.iter().map(|(title, score)| (title, *score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Scores every member article.
///
/// `pageviews` carries raw counts (log-scaling happens here), `linkcounts`
/// arrives already log-scaled from the connectivity side. Both are expected
/// to carry one entry per member, in the same encounter order.
pub fn score_members(
    pageviews: &[(ArticleTitle, u64)],
    linkcounts: &[(ArticleTitle, f64)],
) -> Result<Scores, RankingError> {
    if pageviews.is_empty() {
        return Err(RankingError::EmptyMemberSet);
    }

    let views_log: Vec<(&ArticleTitle, f64)> = pageviews
        .iter()
        .map(|(title, views)| (title, log_scaled(*views)))
        .collect();

    let most_views_log = views_log
        .iter()
        .map(|(_, views)| *views)
        .max_by(f64::total_cmp)
        .unwrap_or(0.0);
    let most_links_log = linkcounts
        .iter()
        .map(|(_, links)| *links)
        .max_by(f64::total_cmp)
        .unwrap_or(0.0);

    if most_views_log <= 0.0 {
        return Err(RankingError::DegenerateSignal("view"));
    }

    if most_links_log <= 0.0 {
        return Err(RankingError::DegenerateSignal("inbound-link"));
    }

    let maxima = SignalMaxima {
        most_views_log,
        most_links_log,
    };

    let links_by_title: FxHashMap<&str, f64> = linkcounts
        .iter()
        .map(|(title, links)| (title.as_str(), *links))
        .collect();

    let scores = views_log
        .into_iter()
        .map(|(title, views_log)| {
            let links_log = links_by_title
                .get(title.as_str())
                .copied()
                .unwrap_or(0.0);

            (title.clone(), maxima.composite(views_log, links_log))
        })
        .collect();

    Ok(Scores { maxima, scores })
}

/// Scores sorted descending. Stable: equal scores keep their encounter
/// order, which the threshold calibration relies on for reproducible index
/// cut-points.
pub fn rank(scores: &Scores) -> Vec<(ArticleTitle, f64)> {
    scores
        .scores
        .iter()
        .cloned()
        .sorted_by_key(|(_, score)| Reverse(SortableFloat::from(*score)))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn title(name: &str) -> ArticleTitle {
        ArticleTitle::from(name)
    }

    fn planets() -> (Vec<(ArticleTitle, u64)>, Vec<(ArticleTitle, f64)>) {
        let pageviews = vec![
            (title("A"), 1_000),
            (title("B"), 10),
            (title("C"), 1),
        ];
        let linkcounts = vec![
            (title("A"), log_scaled(100)),
            (title("B"), log_scaled(1_000)),
            (title("C"), log_scaled(1)),
        ];

        (pageviews, linkcounts)
    }

    #[test]
    fn worked_example_scores() {
        let (pageviews, linkcounts) = planets();
        let scores = score_members(&pageviews, &linkcounts).unwrap();

        let maxima = scores.maxima();
        assert!((maxima.most_views_log - 6.908).abs() < 1e-3);
        assert!((maxima.most_links_log - 6.908).abs() < 1e-3);

        let by_title: Vec<(&ArticleTitle, f64)> = scores.iter().collect();
        assert!((by_title[0].1 - 0.9167).abs() < 1e-3); // A
        assert!((by_title[1].1 - 0.5).abs() < 1e-3); // B
        assert!(by_title[2].1.abs() < 1e-9); // C
    }

    #[test]
    fn max_raw_signal_normalizes_to_one() {
        let (pageviews, linkcounts) = planets();
        let scores = score_members(&pageviews, &linkcounts).unwrap();
        let maxima = scores.maxima();

        assert_eq!(log_scaled(1_000) / maxima.most_views_log, 1.0);
        assert_eq!(log_scaled(1_000) / maxima.most_links_log, 1.0);
    }

    #[test]
    fn zero_counts_clamp_to_zero() {
        assert_eq!(log_scaled(0), 0.0);
        assert_eq!(log_scaled(1), 0.0);
        assert!(log_scaled(2) > 0.0);
    }

    #[test]
    fn empty_member_set_is_an_error() {
        assert_eq!(
            score_members(&[], &[]).unwrap_err(),
            RankingError::EmptyMemberSet
        );
    }

    #[test]
    fn all_zero_signals_are_degenerate() {
        let pageviews = vec![(title("A"), 0), (title("B"), 1)];
        let linkcounts = vec![(title("A"), log_scaled(5)), (title("B"), 0.0)];

        assert_eq!(
            score_members(&pageviews, &linkcounts).unwrap_err(),
            RankingError::DegenerateSignal("view")
        );

        let pageviews = vec![(title("A"), 10), (title("B"), 1)];
        let linkcounts = vec![(title("A"), 0.0), (title("B"), 0.0)];

        assert_eq!(
            score_members(&pageviews, &linkcounts).unwrap_err(),
            RankingError::DegenerateSignal("inbound-link")
        );
    }

    #[test]
    fn ranking_is_descending_and_ties_keep_encounter_order() {
        let pageviews = vec![
            (title("first"), 10),
            (title("second"), 10),
            (title("big"), 10_000),
        ];
        let linkcounts = vec![
            (title("first"), log_scaled(10)),
            (title("second"), log_scaled(10)),
            (title("big"), log_scaled(10_000)),
        ];

        let ranked = rank(&score_members(&pageviews, &linkcounts).unwrap());

        assert_eq!(ranked[0].0, title("big"));
        assert_eq!(ranked[1].0, title("first"));
        assert_eq!(ranked[2].0, title("second"));
    }

    proptest! {
        #[test]
        fn ranked_scores_are_a_sorted_permutation(
            counts in proptest::collection::vec((2u64..100_000, 2u64..100_000), 1..64)
        ) {
            let pageviews: Vec<(ArticleTitle, u64)> = counts
                .iter()
                .enumerate()
                .map(|(i, (views, _))| (ArticleTitle::from(format!("Article {i}")), *views))
                .collect();
            let linkcounts: Vec<(ArticleTitle, f64)> = counts
                .iter()
                .enumerate()
                .map(|(i, (_, links))| {
                    (ArticleTitle::from(format!("Article {i}")), log_scaled(*links))
                })
                .collect();

            let scores = score_members(&pageviews, &linkcounts).unwrap();
            let ranked = rank(&scores);

            prop_assert_eq!(ranked.len(), pageviews.len());
            prop_assert!(ranked.windows(2).all(|pair| pair[0].1 >= pair[1].1));

            let mut input: Vec<ArticleTitle> =
                scores.iter().map(|(title, _)| title.clone()).collect();
            let mut output: Vec<ArticleTitle> =
                ranked.iter().map(|(title, _)| title.clone()).collect();
            input.sort();
            output.sort();
            prop_assert_eq!(input, output);

            for (_, score) in &ranked {
                prop_assert!(*score >= 0.0);
                prop_assert!(*score <= 1.0);
            }
        }
    }
}
