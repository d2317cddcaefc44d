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

//! Builds a predictor from file-backed collaborators and answers queries.

use crate::collection::{member_articles, ArticleTitle, FsProjectIndex};
use crate::config::PriorityConfig;
use crate::linkgraph::MemLinkCounts;
use crate::pageviews::{DumpWindow, LocalPagecountFiles, ViewDump};
use crate::priority::{PriorityPredictor, TierCounts};
use crate::Result;

pub fn build(config: &PriorityConfig) -> Result<PriorityPredictor<MemLinkCounts>> {
    tracing::info!(project = %config.project, "initializing the priority predictor");

    let index = FsProjectIndex::new(&config.project_index_path);
    let members = member_articles(&index, &config.project)?;

    let window = DumpWindow::trailing(config.pagecounts.window_days);
    let source = LocalPagecountFiles::new(&config.pagecounts.dump_root);
    let dump = ViewDump::load(&source, &config.pagecounts.project_tag, &window);

    let links = MemLinkCounts::from_tsv(&config.links.counts_path)?;

    let categories = config.categories.tier_categories()?;
    let counts = TierCounts::from_categories(&config.category_counts, &categories)?;

    PriorityPredictor::build(
        &config.project,
        members,
        dump,
        links,
        counts,
        config.links.batch_size,
    )
}

pub fn predict(config: &PriorityConfig, titles: &[String]) -> Result<()> {
    let predictor = build(config)?;

    for title in titles {
        let tier = predictor.predict(&ArticleTitle::from(title.as_str()))?;
        println!("{title}\t{tier}");
    }

    Ok(())
}

pub fn thresholds(config: &PriorityConfig) -> Result<()> {
    let predictor = build(config)?;
    let thresholds = predictor.thresholds();

    println!("members\t{}", predictor.num_members());
    println!("skipped_units\t{}", predictor.skipped_units());
    println!("top\t{}", thresholds.top);
    println!("high\t{}", thresholds.high);
    println!("mid\t{}", thresholds.mid);

    Ok(())
}
