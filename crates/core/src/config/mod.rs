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

pub mod defaults;

use std::collections::HashMap;

use thiserror::Error;

const UNKNOWN_MARKER: &str = "Unknown-";

#[derive(Debug, serde::Deserialize, Clone)]
pub struct PriorityConfig {
    /// Name of the collection whose members get classified.
    pub project: String,

    pub pagecounts: PagecountsConfig,
    pub links: LinkCountsConfig,

    /// File with one indexed page per line; `Talk:` entries are the members.
    pub project_index_path: String,

    pub categories: CategorySource,

    /// Page counts of the reference tier categories.
    #[serde(default)]
    pub category_counts: HashMap<String, u64>,
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct PagecountsConfig {
    /// Root of the hourly pagecount dump tree.
    pub dump_root: String,

    /// Dump rows are kept only when their first field matches this tag.
    pub project_tag: String,

    #[serde(default = "defaults::Pageviews::window_days")]
    pub window_days: u32,
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct LinkCountsConfig {
    /// TSV file of `title<TAB>inbound link count` rows.
    pub counts_path: String,

    #[serde(default = "defaults::Linkgraph::batch_size")]
    pub batch_size: usize,
}

/// Where the four reference tier-category identifiers come from.
///
/// `Derived` substitutes the tier prefixes into the unknown-priority
/// category name, matching how the reference labeling names its
/// categories. `Explicit` sidesteps the string substitution entirely.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type")]
pub enum CategorySource {
    Derived {
        unknown_category: String,
    },
    Explicit {
        top: String,
        high: String,
        mid: String,
        low: String,
    },
}

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("category template '{0}' does not contain the marker '{UNKNOWN_MARKER}'")]
    MissingMarker(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCategories {
    pub top: String,
    pub high: String,
    pub mid: String,
    pub low: String,
}

impl CategorySource {
    pub fn tier_categories(&self) -> Result<TierCategories, CategoryError> {
        match self {
            CategorySource::Derived { unknown_category } => {
                if !unknown_category.contains(UNKNOWN_MARKER) {
                    return Err(CategoryError::MissingMarker(unknown_category.clone()));
                }

                Ok(TierCategories {
                    top: unknown_category.replace(UNKNOWN_MARKER, "Top-"),
                    high: unknown_category.replace(UNKNOWN_MARKER, "High-"),
                    mid: unknown_category.replace(UNKNOWN_MARKER, "Mid-"),
                    low: unknown_category.replace(UNKNOWN_MARKER, "Low-"),
                })
            }
            CategorySource::Explicit {
                top,
                high,
                mid,
                low,
            } => Ok(TierCategories {
                top: top.clone(),
                high: high.clone(),
                mid: mid.clone(),
                low: low.clone(),
            }),
        }
    }
}
