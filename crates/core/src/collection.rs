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

//! Collection membership and reference-label collaborators.
//!
//! A collection ("project") is indexed by its discussion pages; the member
//! article behind `Talk:Foo` is `Foo`. Reference tier labels are not read
//! per article, only their per-category page counts are.

use std::collections::HashMap;
use std::fs;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::Result;

const TALK_PREFIX: &str = "Talk:";

/// Case-sensitive title of an article. Unique within one collection.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ArticleTitle(String);

impl ArticleTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ArticleTitle {
    fn from(title: String) -> Self {
        ArticleTitle(title)
    }
}

impl From<&str> for ArticleTitle {
    fn from(title: &str) -> Self {
        ArticleTitle(title.to_string())
    }
}

impl std::fmt::Display for ArticleTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lists the pages indexed under a project.
///
/// The returned entries are raw index rows; member articles are the
/// discussion-page entries with the `Talk:` prefix stripped.
pub trait ProjectIndex {
    fn pages(&self, project: &str) -> Result<Vec<String>>;
}

/// Counts the pages currently in a category.
///
/// A category that does not exist has zero pages in it.
pub trait CategoryCounts {
    fn page_count(&self, category: &str) -> Result<u64>;
}

impl<S: BuildHasher> CategoryCounts for HashMap<String, u64, S> {
    fn page_count(&self, category: &str) -> Result<u64> {
        Ok(self.get(category).copied().unwrap_or(0))
    }
}

/// The member articles of a project, in index order.
pub fn member_articles<I: ProjectIndex + ?Sized>(
    index: &I,
    project: &str,
) -> Result<Vec<ArticleTitle>> {
    let mut members = Vec::new();

    for page in index.pages(project)? {
        if let Some(article) = page.strip_prefix(TALK_PREFIX) {
            members.push(ArticleTitle::from(article));
        }
    }

    tracing::info!(project, num_members = members.len(), "resolved member articles");

    Ok(members)
}

/// A project index backed by a plain text file with one indexed page per line.
pub struct FsProjectIndex {
    path: PathBuf,
}

impl FsProjectIndex {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProjectIndex for FsProjectIndex {
    fn pages(&self, _project: &str) -> Result<Vec<String>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read project index '{}'", self.path.display()))?;

        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;

    use super::*;

    struct MemIndex(Vec<&'static str>);

    impl ProjectIndex for MemIndex {
        fn pages(&self, _project: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|page| page.to_string()).collect())
        }
    }

    #[test]
    fn members_are_stripped_talk_pages() {
        let index = MemIndex(vec![
            "Talk:Saturn",
            "Wikipedia:WikiProject Planets",
            "Talk:Jupiter",
            "Template:Planet infobox",
        ]);

        let members = member_articles(&index, "WikiProject Planets").unwrap();

        assert_eq!(
            members,
            vec![ArticleTitle::from("Saturn"), ArticleTitle::from("Jupiter")]
        );
    }

    #[test]
    fn member_order_follows_index_order() {
        let index = MemIndex(vec!["Talk:B", "Talk:A", "Talk:C"]);
        let members = member_articles(&index, "p").unwrap();

        assert_eq!(
            members,
            vec![
                ArticleTitle::from("B"),
                ArticleTitle::from("A"),
                ArticleTitle::from("C")
            ]
        );
    }

    #[test]
    fn missing_category_counts_as_zero() {
        let counts = hashmap! {
            "Category:Top-importance planet articles".to_string() => 12u64,
        };

        assert_eq!(
            counts
                .page_count("Category:Top-importance planet articles")
                .unwrap(),
            12
        );
        assert_eq!(
            counts
                .page_count("Category:Low-importance planet articles")
                .unwrap(),
            0
        );
    }
}
