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

//! Inbound-link connectivity for batches of articles.
//!
//! The backing store bounds how many titles one query may carry, so lookups
//! are chunked and the replies merged. Unlike the traffic side, the
//! connectivity side hands out log-scaled counts; the normalizer expects
//! that asymmetry.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::Context;
use rustc_hash::FxHashMap;

use crate::collection::ArticleTitle;
use crate::ranking::log_scaled;
use crate::Result;

/// Inbound-link counts for one batch of titles.
///
/// A reply may omit titles without any inbound links.
pub trait LinkCountStore {
    fn inbound_counts(&self, titles: &[ArticleTitle]) -> Result<Vec<(ArticleTitle, u64)>>;
}

/// Log-scaled inbound-link counts for `titles`, queried in batches of at
/// most `batch_size`.
///
/// Exactly one output pair per input title, in input order. Titles the
/// store does not report get the zero-count signal.
pub fn fetch_link_counts<S: LinkCountStore + ?Sized>(
    store: &S,
    titles: &[ArticleTitle],
    batch_size: usize,
) -> Result<Vec<(ArticleTitle, f64)>> {
    debug_assert!(batch_size > 0);

    let mut counts: FxHashMap<ArticleTitle, u64> = FxHashMap::default();

    for batch in titles.chunks(batch_size) {
        for (title, count) in store.inbound_counts(batch)? {
            counts.insert(title, count);
        }
    }

    Ok(titles
        .iter()
        .map(|title| {
            let count = counts.get(title).copied().unwrap_or(0);
            (title.clone(), log_scaled(count))
        })
        .collect())
}

/// An in-memory link-count table. Backs the CLI (loaded from a TSV dump of
/// the link graph) and tests.
#[derive(Debug, Default, Clone)]
pub struct MemLinkCounts {
    counts: FxHashMap<String, u64>,
}

impl MemLinkCounts {
    pub fn new<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self {
            counts: counts.into_iter().collect(),
        }
    }

    /// Reads `title<TAB>count` rows.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open link counts '{}'", path.display()))?;

        Self::from_reader(file)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut counts = FxHashMap::default();

        let mut tsv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(reader);

        for record in tsv.records() {
            let record = record?;
            let title = record
                .get(0)
                .context("link-count row without a title")?
                .to_string();
            let count = record
                .get(1)
                .context("link-count row without a count")?
                .parse::<u64>()?;

            counts.insert(title, count);
        }

        Ok(Self { counts })
    }
}

impl LinkCountStore for MemLinkCounts {
    fn inbound_counts(&self, titles: &[ArticleTitle]) -> Result<Vec<(ArticleTitle, u64)>> {
        // mirrors the store semantics: zero-link titles are not reported
        Ok(titles
            .iter()
            .filter_map(|title| {
                self.counts
                    .get(title.as_str())
                    .map(|count| (title.clone(), *count))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use maplit::hashmap;

    use super::*;

    struct RecordingStore {
        inner: MemLinkCounts,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl LinkCountStore for RecordingStore {
        fn inbound_counts(&self, titles: &[ArticleTitle]) -> Result<Vec<(ArticleTitle, u64)>> {
            self.batch_sizes.lock().unwrap().push(titles.len());
            self.inner.inbound_counts(titles)
        }
    }

    fn titles(n: usize) -> Vec<ArticleTitle> {
        (0..n)
            .map(|i| ArticleTitle::from(format!("Article {i}")))
            .collect()
    }

    #[test]
    fn lookups_are_chunked_by_batch_size() {
        let titles = titles(25);
        let store = RecordingStore {
            inner: MemLinkCounts::new(
                titles
                    .iter()
                    .map(|title| (title.as_str().to_string(), 3u64)),
            ),
            batch_sizes: Mutex::new(Vec::new()),
        };

        let counts = fetch_link_counts(&store, &titles, 10).unwrap();

        assert_eq!(store.batch_sizes.lock().unwrap().as_slice(), &[10, 10, 5]);
        assert_eq!(counts.len(), titles.len());
        assert!(counts.iter().all(|(_, links)| *links == 3f64.ln()));
    }

    #[test]
    fn every_title_gets_exactly_one_pair_in_input_order() {
        let titles = vec![
            ArticleTitle::from("Saturn"),
            ArticleTitle::from("Jupiter"),
            ArticleTitle::from("Pluto"),
        ];
        let store = MemLinkCounts::new(hashmap! {
            "Jupiter".to_string() => 100u64,
            "Saturn".to_string() => 10u64,
        });

        let counts = fetch_link_counts(&store, &titles, 2).unwrap();

        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].0, ArticleTitle::from("Saturn"));
        assert_eq!(counts[1].0, ArticleTitle::from("Jupiter"));
        assert_eq!(counts[2].0, ArticleTitle::from("Pluto"));

        assert_eq!(counts[0].1, 10f64.ln());
        assert_eq!(counts[1].1, 100f64.ln());
        // unreported titles clamp to the zero-count signal
        assert_eq!(counts[2].1, 0.0);
    }

    #[test]
    fn tsv_rows_parse_into_counts() {
        let store =
            MemLinkCounts::from_reader("Saturn\t120\nJupiter\t450\n".as_bytes()).unwrap();

        let counts = store
            .inbound_counts(&[ArticleTitle::from("Jupiter")])
            .unwrap();

        assert_eq!(counts, vec![(ArticleTitle::from("Jupiter"), 450)]);
    }
}
