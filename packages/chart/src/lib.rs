#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! SVG chart rendering.
//!
//! Every function takes already-aggregated data and returns an SVG document
//! as a string. Categories are laid out on a `f64` index axis
//! (`-0.5..n-0.5`) and labeled through a formatter, which lets grouped and
//! stacked bars share one coordinate system. Nothing here touches the file
//! system.

pub mod bar;
pub mod line;

use std::ops::Range;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

pub use bar::{bar, comparison, grouped_bar, hbar, stacked_bar};
pub use line::{dual_axis, line, multi_line};

/// Errors that can occur while rendering a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// There is nothing to plot.
    #[error("Nothing to plot for chart '{chart}'")]
    Empty {
        /// Title of the chart that was requested.
        chart: String,
    },

    /// Series and categories do not line up.
    #[error("Invalid chart input: {message}")]
    Input {
        /// Description of what went wrong.
        message: String,
    },

    /// The drawing backend failed.
    #[error("Drawing error: {message}")]
    Drawing {
        /// Backend error text.
        message: String,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing {
            message: e.to_string(),
        }
    }
}

/// Output size of every chart, in pixels.
pub const SIZE: (u32, u32) = (1000, 600);

const FONT: &str = "sans-serif";

/// Per-series palette, in assignment order: light blue, blue, dark blue,
/// red, then a few contrasting fallbacks.
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(135, 206, 250),
    RGBColor(30, 144, 255),
    RGBColor(0, 0, 139),
    RGBColor(220, 20, 60),
    RGBColor(255, 140, 0),
    RGBColor(46, 139, 87),
    RGBColor(128, 0, 128),
    RGBColor(105, 105, 105),
];

/// Color of the `index`-th series, cycling through [`PALETTE`].
#[must_use]
pub const fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Chart title and axis descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Titles<'a> {
    /// Caption above the plot.
    pub title: &'a str,
    /// X axis description.
    pub x: &'a str,
    /// Y axis description.
    pub y: &'a str,
}

impl<'a> Titles<'a> {
    #[must_use]
    pub const fn new(title: &'a str, x: &'a str, y: &'a str) -> Self {
        Self { title, x, y }
    }

    fn empty(&self) -> ChartError {
        ChartError::Empty {
            chart: self.title.to_string(),
        }
    }
}

/// A named series of values aligned with a category list. `None` marks a
/// category the series has no value for.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label.
    pub name: String,
    /// One entry per category.
    pub values: Vec<Option<f64>>,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

fn check_series(
    titles: &Titles<'_>,
    categories: &[String],
    series: &[Series],
) -> Result<(), ChartError> {
    if categories.is_empty() || series.is_empty() {
        return Err(titles.empty());
    }
    if let Some(bad) = series.iter().find(|s| s.values.len() != categories.len()) {
        return Err(ChartError::Input {
            message: format!(
                "series '{}' has {} values for {} categories",
                bad.name,
                bad.values.len(),
                categories.len()
            ),
        });
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn index(i: usize) -> f64 {
    i as f64
}

fn category_range(count: usize) -> Range<f64> {
    -0.5..(index(count) - 0.5)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn category_label(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Value axis covering every finite value and zero, with headroom for
/// value labels.
fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (mut low, mut high) = (0.0_f64, 0.0_f64);
    for value in values.into_iter().filter(|v| v.is_finite()) {
        low = low.min(value);
        high = high.max(value);
    }
    if (high - low).abs() < f64::EPSILON {
        high = low + 1.0;
    }
    let pad = (high - low) * 0.1;
    let low = if low < 0.0 { low - pad } else { low };
    low..(high + pad)
}

const MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Short Portuguese month name; out-of-range months print as numbers.
#[must_use]
pub fn month_abbreviation(month: u32) -> String {
    month
        .checked_sub(1)
        .and_then(|m| MONTHS.get(m as usize))
        .map_or_else(|| month.to_string(), |name| (*name).to_string())
}

/// Compact number formatting for value labels.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.fract().abs() < 1e-9 || value.abs() >= 1000.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn render<F>(titles: &Titles<'_>, draw: F) -> Result<String, ChartError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<(), ChartError>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    log::debug!("rendered '{}' ({} bytes)", titles.title, svg.len());
    Ok(svg)
}
