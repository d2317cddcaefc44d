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

//! Traffic aggregation over the hourly pagecount dump.
//!
//! The dump exposes one gzipped unit per hour with space-delimited rows
//! `<project tag> <title> <views> ...`. A trailing window of units is folded
//! into one lifetime view count per title. A unit that cannot be read is
//! skipped and counted, never fatal; an unreadable hour should not cost the
//! 743 others.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use flate2::read::MultiGzDecoder;
use rustc_hash::FxHashMap;

use crate::Result;

/// One hour of the pagecount dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DumpUnit {
    pub date: NaiveDate,
    pub hour: u8,
}

impl std::fmt::Display for DumpUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}0000", self.date.format("%Y%m%d"), self.hour)
    }
}

/// The dump units of a trailing window, most recent day first.
#[derive(Debug, Clone)]
pub struct DumpWindow {
    units: Vec<DumpUnit>,
}

impl DumpWindow {
    /// The `days * 24` hourly units ending yesterday.
    pub fn trailing(days: u32) -> Self {
        let today = Local::now().date_naive();

        let mut units = Vec::with_capacity(days as usize * 24);
        for day in 1..=i64::from(days) {
            let date = today - Duration::days(day);

            for hour in 0..24 {
                units.push(DumpUnit { date, hour });
            }
        }

        Self { units }
    }

    pub fn units(&self) -> &[DumpUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Where the per-hour dump units are read from.
pub trait PagecountSource {
    fn open(&self, unit: DumpUnit) -> Result<Box<dyn Read>>;
}

/// Pagecount units stored as local gzip files laid out as
/// `{root}/{YYYY}/{YYYY-MM}/pagecounts-{YYYYMMDD}-{HH}0000.gz`.
pub struct LocalPagecountFiles {
    root: PathBuf,
}

impl LocalPagecountFiles {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path(&self, unit: DumpUnit) -> PathBuf {
        self.root
            .join(unit.date.format("%Y").to_string())
            .join(unit.date.format("%Y-%m").to_string())
            .join(format!("pagecounts-{unit}.gz"))
    }
}

impl PagecountSource for LocalPagecountFiles {
    fn open(&self, unit: DumpUnit) -> Result<Box<dyn Read>> {
        let path = self.path(unit);
        let file = File::open(&path)
            .with_context(|| format!("failed to open pagecount unit '{}'", path.display()))?;

        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    }
}

/// Aggregated view counts for every title seen in the window.
///
/// Membership filtering happens downstream; the dump keeps counts for all
/// titles matching the project tag.
pub struct ViewDump {
    counts: FxHashMap<String, u64>,
    skipped_units: usize,
}

impl ViewDump {
    pub fn load<S: PagecountSource + ?Sized>(
        source: &S,
        project_tag: &str,
        window: &DumpWindow,
    ) -> Self {
        let mut counts: FxHashMap<String, u64> = FxHashMap::default();
        let mut skipped_units = 0;

        for unit in window.units() {
            match source.open(*unit).and_then(|reader| unit_counts(reader, project_tag)) {
                Ok(unit_counts) => {
                    for (title, views) in unit_counts {
                        *counts.entry(title).or_insert(0) += views;
                    }
                }
                Err(err) => {
                    tracing::warn!("skipping pagecount unit {unit}: {err:#}");
                    skipped_units += 1;
                }
            }
        }

        tracing::info!(
            num_titles = counts.len(),
            num_units = window.len(),
            skipped_units,
            "aggregated pagecount window"
        );

        Self {
            counts,
            skipped_units,
        }
    }

    /// A dump from already aggregated counts.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self {
            counts: counts.into_iter().collect(),
            skipped_units: 0,
        }
    }

    /// View count over the window. Zero when the title never appeared.
    pub fn views(&self, title: &str) -> u64 {
        self.counts.get(title).copied().unwrap_or(0)
    }

    /// Units that could not be read. Lets callers judge how complete
    /// the aggregation is.
    pub fn skipped_units(&self) -> usize {
        self.skipped_units
    }

    pub fn num_titles(&self) -> usize {
        self.counts.len()
    }
}

/// Counts of one unit, merged into the dump only if the whole unit parses.
fn unit_counts(reader: Box<dyn Read>, project_tag: &str) -> Result<Vec<(String, u64)>> {
    let mut counts = Vec::new();

    for line in BufReader::new(reader).lines() {
        let line = line?;
        let mut fields = line.split(' ');

        if fields.next() != Some(project_tag) {
            continue;
        }

        let (Some(title), Some(views)) = (fields.next(), fields.next()) else {
            continue;
        };

        let Ok(views) = views.parse::<u64>() else {
            continue;
        };

        counts.push((title.to_string(), views));
    }

    Ok(counts)
}
