//! Bar charts.

use std::collections::{BTreeSet, HashSet};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use queimadas_analytics_models::{ComparisonPoint, SeriesKind};

use crate::{
    ChartError, FONT, Series, Titles, category_label, category_range, check_series, format_value,
    index, month_abbreviation, render, series_color, value_range,
};

const BAR_WIDTH: f64 = 0.8;

/// Horizontal bars, one per `(label, value)`, drawn bottom to top in input
/// order.
///
/// # Errors
///
/// * [`ChartError::Empty`] if `bars` is empty
/// * [`ChartError::Drawing`] if rendering fails
pub fn hbar(titles: &Titles<'_>, bars: &[(String, f64)]) -> Result<String, ChartError> {
    if bars.is_empty() {
        return Err(titles.empty());
    }
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let x_range = value_range(bars.iter().map(|(_, value)| *value));

    render(titles, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(titles.title, (FONT, 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(120)
            .build_cartesian_2d(x_range, category_range(bars.len()))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(labels.len())
            .y_label_formatter(&|y| category_label(&labels, *y))
            .x_desc(titles.x)
            .y_desc(titles.y)
            .label_style((FONT, 12))
            .draw()?;

        let color = series_color(1);
        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let y = index(i);
            Rectangle::new(
                [(0.0, y - BAR_WIDTH / 2.0), (*value, y + BAR_WIDTH / 2.0)],
                color.filled(),
            )
        }))?;
        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            Text::new(
                format!(" {}", format_value(*value)),
                (*value, index(i)),
                TextStyle::from((FONT, 11)).pos(Pos::new(HPos::Left, VPos::Center)),
            )
        }))?;

        Ok(())
    })
}

/// Vertical bars, one per `(label, value)`, in input order.
///
/// # Errors
///
/// * [`ChartError::Empty`] if `bars` is empty
/// * [`ChartError::Drawing`] if rendering fails
pub fn bar(titles: &Titles<'_>, bars: &[(String, f64)]) -> Result<String, ChartError> {
    if bars.is_empty() {
        return Err(titles.empty());
    }
    let categories: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let series = [Series::new(
        titles.y,
        bars.iter().map(|(_, value)| Some(*value)).collect(),
    )];
    grouped(titles, &categories, &series, &|s, _| series_color(s + 1).filled(), None)
}

/// Side-by-side bars, one group per category and one bar per series, each
/// labeled with its value.
///
/// # Errors
///
/// * [`ChartError::Empty`] if there are no categories or no series
/// * [`ChartError::Input`] if a series does not have one value per category
/// * [`ChartError::Drawing`] if rendering fails
pub fn grouped_bar(
    titles: &Titles<'_>,
    categories: &[String],
    series: &[Series],
) -> Result<String, ChartError> {
    grouped(titles, categories, series, &|s, _| series_color(s).filled(), None)
}

fn grouped(
    titles: &Titles<'_>,
    categories: &[String],
    series: &[Series],
    style: &dyn Fn(usize, usize) -> ShapeStyle,
    extra_legend: Option<(&str, ShapeStyle)>,
) -> Result<String, ChartError> {
    check_series(titles, categories, series)?;
    let width = BAR_WIDTH / index(series.len());
    let y_range = value_range(series.iter().flat_map(|s| s.values.iter().flatten().copied()));

    render(titles, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(titles.title, (FONT, 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(category_range(categories.len()), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len())
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(titles.x)
            .y_desc(titles.y)
            .label_style((FONT, 12))
            .draw()?;

        for (s, entry) in series.iter().enumerate() {
            let left = |c: usize| index(c) - BAR_WIDTH / 2.0 + width * index(s);
            let present = entry
                .values
                .iter()
                .enumerate()
                .filter_map(|(c, value)| value.map(|v| (c, v)));

            let color = series_color(s);
            chart
                .draw_series(present.clone().map(|(c, v)| {
                    Rectangle::new([(left(c), 0.0), (left(c) + width, v)], style(s, c))
                }))?
                .label(entry.name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });

            chart.draw_series(present.map(|(c, v)| {
                Text::new(
                    format_value(v),
                    (left(c) + width / 2.0, v),
                    TextStyle::from((FONT, 11)).pos(Pos::new(HPos::Center, VPos::Bottom)),
                )
            }))?;
        }

        if let Some((name, legend_style)) = extra_legend {
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                .label(name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], legend_style));
        }

        if series.len() > 1 || extra_legend.is_some() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        Ok(())
    })
}

/// Bars stacked per category, one segment per series. Negative values
/// stack downward from zero. Each stack is topped with its total.
///
/// # Errors
///
/// * [`ChartError::Empty`] if there are no categories or no series
/// * [`ChartError::Input`] if a series does not have one value per category
/// * [`ChartError::Drawing`] if rendering fails
pub fn stacked_bar(
    titles: &Titles<'_>,
    categories: &[String],
    series: &[Series],
) -> Result<String, ChartError> {
    check_series(titles, categories, series)?;

    let mut above = vec![0.0_f64; categories.len()];
    let mut below = vec![0.0_f64; categories.len()];
    let segments: Vec<Vec<(usize, f64, f64)>> = series
        .iter()
        .map(|entry| {
            entry
                .values
                .iter()
                .enumerate()
                .filter_map(|(c, value)| value.map(|v| (c, v)))
                .map(|(c, v)| {
                    let base = if v >= 0.0 { &mut above[c] } else { &mut below[c] };
                    let start = *base;
                    *base += v;
                    (c, start, *base)
                })
                .collect()
        })
        .collect();
    let y_range = value_range(above.iter().chain(&below).copied());

    render(titles, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(titles.title, (FONT, 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(category_range(categories.len()), y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len())
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(titles.x)
            .y_desc(titles.y)
            .label_style((FONT, 12))
            .draw()?;

        for (s, (entry, segments)) in series.iter().zip(&segments).enumerate() {
            let color = series_color(s);
            chart
                .draw_series(segments.iter().map(|&(c, start, end)| {
                    let x = index(c);
                    Rectangle::new(
                        [(x - BAR_WIDTH / 2.0, start), (x + BAR_WIDTH / 2.0, end)],
                        color.filled(),
                    )
                }))?
                .label(entry.name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        chart.draw_series(above.iter().zip(&below).enumerate().map(|(c, (up, down))| {
            Text::new(
                format_value(up + down),
                (index(c), *up),
                TextStyle::from((FONT, 11)).pos(Pos::new(HPos::Center, VPos::Bottom)),
            )
        }))?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    })
}

/// Observed against projected totals.
///
/// Monthly points are grouped by month with one bar per year; yearly points
/// get one bar per year. Projected bars are drawn hollow in red.
///
/// # Errors
///
/// * [`ChartError::Empty`] if `points` is empty
/// * [`ChartError::Drawing`] if rendering fails
pub fn comparison(titles: &Titles<'_>, points: &[ComparisonPoint]) -> Result<String, ChartError> {
    if points.is_empty() {
        return Err(titles.empty());
    }

    let years: Vec<i32> = points
        .iter()
        .map(|p| p.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let months: Vec<u32> = points
        .iter()
        .filter_map(|p| p.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut projected = HashSet::new();
    let (categories, series) = if months.is_empty() {
        let mut values = vec![None; years.len()];
        for point in points {
            if let Ok(c) = years.binary_search(&point.year) {
                *values[c].get_or_insert(0.0) += point.value;
                if point.kind == SeriesKind::Projected {
                    projected.insert((0, c));
                }
            }
        }
        (
            years.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![Series::new(titles.y, values)],
        )
    } else {
        let mut series: Vec<Series> = years
            .iter()
            .map(|year| Series::new(year.to_string(), vec![None; months.len()]))
            .collect();
        for point in points {
            let Some(month) = point.month else {
                continue;
            };
            if let (Ok(s), Ok(c)) = (
                years.binary_search(&point.year),
                months.binary_search(&month),
            ) {
                *series[s].values[c].get_or_insert(0.0) += point.value;
                if point.kind == SeriesKind::Projected {
                    projected.insert((s, c));
                }
            }
        }
        (
            months.iter().map(|&m| month_abbreviation(m)).collect::<Vec<_>>(),
            series,
        )
    };

    log::debug!(
        "comparison chart: {} categories, {} series, {} projected bars",
        categories.len(),
        series.len(),
        projected.len()
    );

    let hollow = RED.stroke_width(2);
    grouped(
        titles,
        &categories,
        &series,
        &|s, c| {
            if projected.contains(&(s, c)) {
                hollow
            } else {
                series_color(s).filled()
            }
        },
        (!projected.is_empty()).then_some(("Projeção", hollow)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(values: &[(&str, f64)]) -> Vec<(String, f64)> {
        values.iter().map(|(l, v)| ((*l).to_string(), *v)).collect()
    }

    #[test]
    fn hbar_renders_every_label() {
        let svg = hbar(
            &Titles::new("Focos por estado", "Focos", "Estado"),
            &labeled(&[("AC", 10.0), ("MT", 50.0), ("PA", 320.0)]),
        )
        .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Focos por estado"));
        for label in ["AC", "MT", "PA", "320"] {
            assert!(svg.contains(label), "{label}");
        }
    }

    #[test]
    fn bar_renders_values() {
        let svg = bar(
            &Titles::new("Focos por mês", "Mês", "Focos"),
            &labeled(&[("jan", 12.0), ("set", 900.0)]),
        )
        .unwrap();
        assert!(svg.contains("<rect"));
        assert!(svg.contains("900"));
    }

    #[test]
    fn empty_bars_are_rejected() {
        let titles = Titles::new("Vazio", "", "");
        assert!(matches!(hbar(&titles, &[]), Err(ChartError::Empty { .. })));
        assert!(matches!(bar(&titles, &[]), Err(ChartError::Empty { .. })));
        assert!(matches!(
            grouped_bar(&titles, &[], &[]),
            Err(ChartError::Empty { .. })
        ));
        assert!(matches!(comparison(&titles, &[]), Err(ChartError::Empty { .. })));
    }

    #[test]
    fn grouped_bar_labels_values_and_legend() {
        let svg = grouped_bar(
            &Titles::new("Primeiros meses", "Mês", "Focos"),
            &["jan".to_string(), "fev".to_string()],
            &[
                Series::new("2022", vec![Some(101.0), Some(202.0)]),
                Series::new("2023", vec![Some(303.0), None]),
            ],
        )
        .unwrap();
        for text in ["101", "202", "303", "2022", "2023"] {
            assert!(svg.contains(text), "{text}");
        }
    }

    #[test]
    fn stacked_bar_tops_with_totals() {
        let svg = stacked_bar(
            &Titles::new("Área por governo", "Governo", "km²"),
            &["Lula".to_string(), "Bolsonaro".to_string()],
            &[
                Series::new("PA", vec![Some(40.0), Some(70.0)]),
                Series::new("MT", vec![Some(5.0), Some(11.0)]),
            ],
        )
        .unwrap();
        assert!(svg.contains("45"));
        assert!(svg.contains("81"));
    }

    #[test]
    fn comparison_marks_projection_in_legend() {
        let point = |year, month, value, kind| ComparisonPoint {
            year,
            month: Some(month),
            value,
            kind,
        };
        let points = [
            point(2022, 1, 10.0, SeriesKind::Observed),
            point(2022, 2, 20.0, SeriesKind::Observed),
            point(2023, 1, 15.0, SeriesKind::Observed),
            point(2023, 2, 25.0, SeriesKind::Projected),
        ];
        let svg = comparison(&Titles::new("Projeção", "Mês", "Focos"), &points).unwrap();
        assert!(svg.contains("Projeção"));
        assert!(svg.contains("jan"));

        let observed_only =
            comparison(&Titles::new("Histórico", "Mês", "Focos"), &points[..3]).unwrap();
        assert!(!observed_only.contains("Projeção"));
    }
}
