#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presidential administration periods.
//!
//! Every yearly record is attributed to the government in office through a
//! small ordered table of half-open year ranges. Years outside the table map
//! to [`Government::Unknown`] instead of failing, so historical charts built
//! from partial datasets stay reproducible.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A federal administration label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Government {
    /// Fernando Henrique Cardoso
    #[strum(serialize = "FHC")]
    #[serde(rename = "FHC")]
    Fhc,
    /// Luiz Inácio Lula da Silva (both terms share one label)
    Lula,
    /// Dilma Rousseff
    Dilma,
    /// Michel Temer
    Temer,
    /// Jair Bolsonaro
    Bolsonaro,
    /// Any year the period table does not cover
    Unknown,
}

impl Government {
    /// Returns every label that appears in [`PERIODS`], in first-appearance
    /// order, without duplicates and without [`Self::Unknown`].
    #[must_use]
    pub fn known() -> Vec<Self> {
        let mut labels = Vec::new();
        for period in PERIODS {
            if !labels.contains(&period.government) {
                labels.push(period.government);
            }
        }
        labels
    }
}

/// One administration period: `start <= year < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// First year attributed to the government (inclusive).
    pub start: i32,
    /// First year no longer attributed to it (exclusive).
    pub end: i32,
    /// The government in office.
    pub government: Government,
}

impl Period {
    /// Returns `true` if `year` falls inside this period.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.start && year < self.end
    }
}

/// Ordered, contiguous, non-overlapping period table.
pub const PERIODS: &[Period] = &[
    Period {
        start: 1995,
        end: 2003,
        government: Government::Fhc,
    },
    Period {
        start: 2003,
        end: 2011,
        government: Government::Lula,
    },
    Period {
        start: 2011,
        end: 2016,
        government: Government::Dilma,
    },
    Period {
        start: 2016,
        end: 2018,
        government: Government::Temer,
    },
    Period {
        start: 2018,
        end: 2023,
        government: Government::Bolsonaro,
    },
    Period {
        start: 2023,
        end: 2027,
        government: Government::Lula,
    },
];

/// Maps a calendar year to the government in office.
#[must_use]
pub fn government_for_year(year: i32) -> Government {
    PERIODS
        .iter()
        .find(|period| period.contains(year))
        .map_or(Government::Unknown, |period| period.government)
}

/// Returns the full year range covered by [`PERIODS`] as `(first, end)`,
/// end exclusive.
#[must_use]
pub fn covered_range() -> (i32, i32) {
    let first = PERIODS.first().map_or(0, |p| p.start);
    let end = PERIODS.last().map_or(0, |p| p.end);
    (first, end)
}
