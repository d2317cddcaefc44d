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

pub struct Pageviews;

impl Pageviews {
    /// Trailing days of the dump window, ending yesterday.
    pub fn window_days() -> u32 {
        31
    }
}

pub struct Linkgraph;

impl Linkgraph {
    /// Upper bound on the number of titles per link-count query.
    pub fn batch_size() -> usize {
        10_000
    }
}
