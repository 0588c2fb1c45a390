//! Line charts.

use plotters::prelude::*;

use crate::{
    ChartError, FONT, Series, Titles, category_label, category_range, check_series, index, render,
    series_color, value_range,
};

/// Most x-axis labels drawn on a line chart; long date axes are thinned.
const MAX_X_LABELS: usize = 12;

fn present(values: &[Option<f64>]) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| value.map(|v| (index(i), v)))
}

/// A single line over `(label, value)` points, in input order.
///
/// # Errors
///
/// * [`ChartError::Empty`] if `points` is empty
/// * [`ChartError::Drawing`] if rendering fails
pub fn line(titles: &Titles<'_>, points: &[(String, f64)]) -> Result<String, ChartError> {
    if points.is_empty() {
        return Err(titles.empty());
    }
    let categories: Vec<String> = points.iter().map(|(label, _)| label.clone()).collect();
    let series = [Series::new(
        titles.y,
        points.iter().map(|(_, value)| Some(*value)).collect(),
    )];
    multi_line(titles, &categories, &series)
}

/// One line per series over shared categories, e.g. one line per year over
/// months. Categories a series has no value for are skipped.
///
/// # Errors
///
/// * [`ChartError::Empty`] if there are no categories or no series
/// * [`ChartError::Input`] if a series does not have one value per category
/// * [`ChartError::Drawing`] if rendering fails
pub fn multi_line(
    titles: &Titles<'_>,
    categories: &[String],
    series: &[Series],
) -> Result<String, ChartError> {
    check_series(titles, categories, series)?;
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
            .x_labels(categories.len().min(MAX_X_LABELS))
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(titles.x)
            .y_desc(titles.y)
            .label_style((FONT, 12))
            .draw()?;

        // A lone series takes palette slot 1 (blue).
        let offset = usize::from(series.len() == 1);
        for (s, entry) in series.iter().enumerate() {
            let color = series_color(s + offset);
            let points = present(&entry.values);
            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(entry.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            if categories.len() <= 60 {
                chart.draw_series(points.map(|point| Circle::new(point, 3, color.filled())))?;
            }
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        Ok(())
    })
}

/// Two lines over shared categories, the second on its own right-hand axis.
///
/// # Errors
///
/// * [`ChartError::Empty`] if there are no categories
/// * [`ChartError::Input`] if a series does not have one value per category
/// * [`ChartError::Drawing`] if rendering fails
pub fn dual_axis(
    titles: &Titles<'_>,
    categories: &[String],
    primary: &Series,
    secondary: &Series,
) -> Result<String, ChartError> {
    check_series(titles, categories, &[primary.clone(), secondary.clone()])?;
    let primary_range = value_range(primary.values.iter().flatten().copied());
    let secondary_range = value_range(secondary.values.iter().flatten().copied());

    render(titles, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(titles.title, (FONT, 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .right_y_label_area_size(70)
            .build_cartesian_2d(category_range(categories.len()), primary_range)?
            .set_secondary_coord(category_range(categories.len()), secondary_range);

        chart
            .configure_mesh()
            .x_labels(categories.len().min(MAX_X_LABELS))
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(titles.x)
            .y_desc(primary.name.as_str())
            .label_style((FONT, 12))
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc(secondary.name.as_str())
            .label_style((FONT, 12))
            .draw()?;

        let first = series_color(1);
        let second = series_color(3);
        chart
            .draw_series(LineSeries::new(present(&primary.values), first.stroke_width(2)))?
            .label(primary.name.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], first.stroke_width(2))
            });
        chart
            .draw_secondary_series(LineSeries::new(
                present(&secondary.values),
                second.stroke_width(2),
            ))?
            .label(secondary.name.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], second.stroke_width(2))
            });

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    })
}
