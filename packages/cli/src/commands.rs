//! One function per CLI command.
//!
//! Each command loads what it needs, runs the pipeline, writes its charts
//! to the output directory and prints a short narrative to stdout.

use std::error::Error;
use std::path::PathBuf;

use queimadas_analytics::AnalyticsError;
use queimadas_analytics::aggregate::{sort_by_value, sum_by, total};
use queimadas_analytics::comparison::{
    cumulative_by_year, drop_from, latest_period, leading_months, monthly_totals, months_window,
    years,
};
use queimadas_analytics::delta::{delta_by_year, yearly_delta_totals};
use queimadas_analytics::weather::{correlation, weather_series};
use queimadas_analytics_models::{
    ComparisonPoint, DeltaRow, GroupRow, MonthlyTotal, SeriesKind, YearTotal,
};
use queimadas_chart::{Series, Titles, month_abbreviation};
use queimadas_dataset::filter::{Filter, Selection, distinct_values, title_case};
use queimadas_dataset::loader::{load_deforestation, load_fires, load_projection, load_weather};
use queimadas_dataset_models::{
    DeforestationRecord, Dimension, DimensionValue, FireRecord, LOCALITY_KEY, Measure, Table,
    WeatherRecord, WeatherVariable,
};
use queimadas_government::{Government, government_for_year};
use queimadas_prediction::adapter::{merge_comparison, observed_monthly, observed_yearly, project};
use queimadas_prediction::model::LazyModel;

use crate::config::{Config, DatasetConfig};

type CommandResult = Result<(), Box<dyn Error>>;

/// Resolved configuration plus the process-wide model handle.
pub struct App {
    /// Resolved configuration.
    pub config: Config,
    model: LazyModel,
}

impl App {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let model = LazyModel::new(config.model_path());
        Self { config, model }
    }

    fn path(&self, dataset: &DatasetConfig) -> PathBuf {
        self.config.dataset_path(dataset)
    }

    fn fires(&self) -> Result<Table<FireRecord>, Box<dyn Error>> {
        Ok(load_fires(&self.path(&self.config.fires), self.config.fires.delimiter)?)
    }

    fn weather(&self) -> Result<Table<WeatherRecord>, Box<dyn Error>> {
        Ok(load_weather(&self.path(&self.config.weather), self.config.weather.delimiter)?)
    }

    fn deforestation(&self) -> Result<Table<DeforestationRecord>, Box<dyn Error>> {
        Ok(load_deforestation(
            &self.path(&self.config.deforestation),
            self.config.deforestation.delimiter,
        )?)
    }

    fn write_chart(&self, name: &str, svg: &str) -> Result<PathBuf, Box<dyn Error>> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(format!("{name}.svg"));
        std::fs::write(&path, svg)?;
        log::debug!("wrote {}", path.display());
        println!("  gráfico: {}", path.display());
        Ok(path)
    }
}

fn labeled(rows: &[GroupRow]) -> Vec<(String, f64)> {
    rows.iter().map(|row| (row.label(), row.value)).collect()
}

fn month_of(row: &GroupRow) -> Option<u32> {
    row.key
        .first()
        .and_then(DimensionValue::as_int)
        .and_then(|m| u32::try_from(m).ok())
}

fn series_by_year(points: &[MonthlyTotal], months: &[u32]) -> Vec<Series> {
    years(points)
        .into_iter()
        .map(|year| {
            Series::new(
                year.to_string(),
                months
                    .iter()
                    .map(|&month| {
                        points
                            .iter()
                            .find(|p| p.year == year && p.month == month)
                            .map(|p| p.value)
                    })
                    .collect(),
            )
        })
        .collect()
}

fn government_rank(label: &str) -> usize {
    let known = Government::known();
    label
        .parse::<Government>()
        .ok()
        .and_then(|government| known.iter().position(|k| *k == government))
        .unwrap_or(known.len())
}

/// Drops the latest observed month when `drop_partial` is set; it is usually
/// still being collected.
fn line_points(points: &[MonthlyTotal], drop_partial: bool) -> Vec<MonthlyTotal> {
    match latest_period(points) {
        Some((year, month)) if drop_partial => drop_from(points, year, month),
        _ => points.to_vec(),
    }
}

/// Yearly delta totals restricted to `year` and `government`. Deltas are
/// taken over every year of `table` before the restriction, so each
/// locality keeps its previous-year baseline.
fn selected_delta_totals(
    table: &Table<DeforestationRecord>,
    year: &Selection,
    government: &Selection,
) -> Result<Vec<YearTotal>, AnalyticsError> {
    let deltas: Vec<DeltaRow> = delta_by_year(table, LOCALITY_KEY, Dimension::Year, Measure::Area)?
        .into_iter()
        .filter(|row| {
            let tagged = i32::try_from(row.year).map_or(Government::Unknown, government_for_year);
            year.accepts(Some(&DimensionValue::Int(row.year)))
                && government.accepts(Some(&DimensionValue::from(tagged)))
        })
        .collect();
    yearly_delta_totals(&deltas)
}

/// Observed history merged with the model's projection, or `None` when the
/// projection table has no rows.
fn projection_series(
    app: &App,
    year: Option<i32>,
) -> Result<Option<Vec<ComparisonPoint>>, Box<dyn Error>> {
    let projection = load_projection(
        &app.path(&app.config.projection),
        app.config.projection.delimiter,
    )?;
    if projection.is_empty() {
        return Ok(None);
    }

    if !app.model.is_loaded() {
        println!("Carregando modelo {}", app.model.path().display());
    }
    let model = app.model.get()?;
    let projected = project(&projection, model, year)?;

    let history = monthly_totals(
        &app.weather()?,
        Measure::Focuses,
        app.config.comparison.from_year,
    )?;
    let observed = if projected.iter().any(|p| p.month.is_some()) {
        observed_monthly(&history)
    } else {
        observed_yearly(&cumulative_by_year(&history))
    };
    Ok(Some(merge_comparison(&observed, &projected)))
}

/// Distinct states of the fire dataset, raw and title-cased for display.
///
/// # Errors
///
/// Returns an error if the fire dataset cannot be loaded.
pub fn state_options(app: &App) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let fires = app.fires()?;
    Ok(distinct_values(&fires, Dimension::State)
        .into_iter()
        .map(|value| {
            let raw = value.to_string();
            let display = title_case(&raw);
            (raw, display)
        })
        .collect())
}

/// Distinct states of the deforestation dataset, raw and title-cased.
///
/// # Errors
///
/// Returns an error if the deforestation dataset cannot be loaded.
pub fn deforestation_state_options(app: &App) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let table = app.deforestation()?;
    Ok(distinct_values(&table, Dimension::State)
        .into_iter()
        .map(|value| {
            let raw = value.to_string();
            let display = title_case(&raw);
            (raw, display)
        })
        .collect())
}

/// Lists the states present in the fire dataset.
///
/// # Errors
///
/// Returns an error if the fire dataset cannot be loaded.
pub fn states(app: &App) -> CommandResult {
    let states = state_options(app)?;
    println!("{:<8} NOME", "UF");
    println!("{}", "-".repeat(30));
    for (raw, display) in &states {
        println!("{raw:<8} {display}");
    }
    println!("{} estado(s)", states.len());
    Ok(())
}

/// Fire totals by state, by month and over time.
///
/// # Errors
///
/// Returns an error if loading, filtering, aggregation or rendering fails.
pub fn fires(app: &App, state: Option<&str>) -> CommandResult {
    let table = app.fires()?;
    let filtered = Filter::new()
        .with(Dimension::State, Selection::from_option(Dimension::State, state)?)
        .apply(&table);
    if filtered.is_empty() {
        println!("Nenhum registro de queimada para a seleção.");
        return Ok(());
    }

    let by_state = sort_by_value(sum_by(&filtered, &[Dimension::State], Measure::Focuses)?, true);
    let by_month = sum_by(&filtered, &[Dimension::Month], Measure::Focuses)?;
    let by_date = sum_by(&filtered, &[Dimension::Date], Measure::Focuses)?;

    println!("Queimadas: {:.0} focos registrados", total(&filtered, Measure::Focuses));
    if let Some(top) = by_state.last() {
        println!("  estado com mais focos: {} ({:.0})", title_case(&top.label()), top.value);
    }
    let ranked_months = sort_by_value(by_month.clone(), false);
    if let (Some(peak), Some(low)) = (ranked_months.first(), ranked_months.last()) {
        println!(
            "  mês de pico: {} ({:.0}); mês mais calmo: {} ({:.0})",
            month_of(peak).map_or_else(|| peak.label(), month_abbreviation),
            peak.value,
            month_of(low).map_or_else(|| low.label(), month_abbreviation),
            low.value
        );
    }

    let svg = queimadas_chart::hbar(
        &Titles::new("Quantidade de Queimadas por Estado", "Qtd Queimadas", "Estado"),
        &labeled(&by_state),
    )?;
    app.write_chart("queimadas_por_estado", &svg)?;

    let months: Vec<(String, f64)> = by_month
        .iter()
        .map(|row| {
            (
                month_of(row).map_or_else(|| row.label(), month_abbreviation),
                row.value,
            )
        })
        .collect();
    let svg = queimadas_chart::bar(
        &Titles::new("Quantidade de Queimadas por Mês", "Mês", "Qtd Queimadas"),
        &months,
    )?;
    app.write_chart("queimadas_por_mes", &svg)?;

    let svg = queimadas_chart::line(
        &Titles::new("Histórico de Queimadas", "Data", "Qtd Queimadas"),
        &labeled(&by_date),
    )?;
    app.write_chart("historico_queimadas", &svg)?;

    Ok(())
}

/// Fire focuses against a weather covariate.
///
/// # Errors
///
/// Returns an error if loading, aggregation or rendering fails.
pub fn weather(app: &App, variable: WeatherVariable) -> CommandResult {
    let table = app.weather()?;
    let points = weather_series(&table, variable)?;
    if points.is_empty() {
        println!("Nenhum registro climático encontrado.");
        return Ok(());
    }

    let label = variable.label();
    match correlation(&points) {
        Some(r) => {
            let direction = if r >= 0.0 { "direta" } else { "inversa" };
            println!("Correlação entre focos e {label}: {r:.2} (relação {direction})");
        }
        None => println!("Sem dados suficientes de {label} para calcular a correlação."),
    }

    let categories: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
    let title = format!("Queimadas x {label}");
    let svg = queimadas_chart::dual_axis(
        &Titles::new(&title, "Data", "Qtd Queimadas"),
        &categories,
        &Series::new("Qtd Queimadas", points.iter().map(|p| Some(p.focuses)).collect()),
        &Series::new(label, points.iter().map(|p| p.covariate).collect()),
    )?;
    app.write_chart(&format!("queimadas_x_{variable}"), &svg)?;

    Ok(())
}

/// Year-against-year monthly comparison.
///
/// # Errors
///
/// Returns an error if `months` is out of range or loading, aggregation or
/// rendering fails.
pub fn compare(app: &App, from_year: Option<i32>, months: Option<u32>) -> CommandResult {
    let settings = &app.config.comparison;
    let from_year = from_year.unwrap_or(settings.from_year);
    let months = months.unwrap_or(settings.months);
    if !(1..=12).contains(&months) {
        return Err(format!("months must be between 1 and 12, got {months}").into());
    }

    let table = app.weather()?;
    let points = monthly_totals(&table, Measure::Focuses, from_year)?;
    if points.is_empty() {
        println!("Nenhum registro a partir de {from_year}.");
        return Ok(());
    }

    let lines = line_points(&points, settings.drop_partial_month);
    let all_months = leading_months(12);
    let svg = queimadas_chart::multi_line(
        &Titles::new("Total Queimadas por Mês", "Mês", "Qtd Queimadas"),
        &all_months.iter().map(|&m| month_abbreviation(m)).collect::<Vec<_>>(),
        &series_by_year(&lines, &all_months),
    )?;
    app.write_chart("comparativo_mensal", &svg)?;

    let window_months = leading_months(months);
    let window = months_window(&points, &window_months);
    let svg = queimadas_chart::grouped_bar(
        &Titles::new("Total Queimadas nos Primeiros Meses", "Mês", "Qtd Queimadas"),
        &window_months.iter().map(|&m| month_abbreviation(m)).collect::<Vec<_>>(),
        &series_by_year(&window, &window_months),
    )?;
    app.write_chart("comparativo_inicio_ano", &svg)?;

    let cumulative = cumulative_by_year(&window);
    let bars: Vec<(String, f64)> = cumulative
        .iter()
        .map(|t| (t.year.to_string(), t.value))
        .collect();
    let svg = queimadas_chart::bar(
        &Titles::new("Queimadas Acumuladas por Ano", "Ano", "Qtd Queimadas"),
        &bars,
    )?;
    app.write_chart("comparativo_acumulado", &svg)?;

    println!("Focos acumulados nos {months} primeiros meses:");
    for YearTotal { year, value } in &cumulative {
        println!("  {year} ({}): {value:.0}", government_for_year(*year));
    }
    if let Some((latest, earlier)) = cumulative.split_last() {
        let higher = earlier.iter().filter(|t| t.value > latest.value).count();
        if !earlier.is_empty() {
            println!(
                "  {} ficou abaixo de {higher} dos {} anos anteriores",
                latest.year,
                earlier.len()
            );
        }
    }

    Ok(())
}

/// Deforestation totals by state and government, plus yearly deltas.
///
/// Deltas are computed on the state selection alone so that a year or
/// government filter does not reset each locality's baseline.
///
/// # Errors
///
/// Returns an error if a selection does not parse or loading, aggregation or
/// rendering fails.
pub fn deforestation(
    app: &App,
    state: Option<&str>,
    year: Option<&str>,
    government: Option<&str>,
) -> CommandResult {
    let table = app.deforestation()?;
    let state = Selection::from_option(Dimension::State, state)?;
    let year = Selection::from_option(Dimension::Year, year)?;
    let government = Selection::from_option(Dimension::Government, government)?;

    let by_state_only = Filter::new().with(Dimension::State, state.clone()).apply(&table);
    let filtered = Filter::new()
        .with(Dimension::State, state)
        .with(Dimension::Year, year.clone())
        .with(Dimension::Government, government.clone())
        .apply(&table);
    if filtered.is_empty() {
        println!("Nenhum registro de desmatamento para a seleção.");
        return Ok(());
    }

    let by_state = sort_by_value(sum_by(&filtered, &[Dimension::State], Measure::Area)?, true);
    let mut by_government = sum_by(&filtered, &[Dimension::Government], Measure::Area)?;
    by_government.sort_by_key(|row| government_rank(&row.label()));

    println!("Desmatamento: {:.1} km² na seleção", total(&filtered, Measure::Area));
    for row in &by_government {
        println!("  {}: {:.1} km²", row.label(), row.value);
    }

    let svg = queimadas_chart::hbar(
        &Titles::new("Desmatamento por Estado", "Área (km²)", "Estado"),
        &labeled(&by_state),
    )?;
    app.write_chart("desmatamento_por_estado", &svg)?;

    let svg = queimadas_chart::bar(
        &Titles::new("Desmatamento por Governo", "Governo", "Área (km²)"),
        &labeled(&by_government),
    )?;
    app.write_chart("desmatamento_por_governo", &svg)?;

    let governments: Vec<String> = by_government.iter().map(GroupRow::label).collect();
    let pairs = sum_by(&filtered, &[Dimension::State, Dimension::Government], Measure::Area)?;
    let states: Vec<String> = by_state.iter().rev().map(GroupRow::label).collect();
    let stacked: Vec<Series> = states
        .iter()
        .map(|state| {
            Series::new(
                state.clone(),
                governments
                    .iter()
                    .map(|gov| {
                        pairs
                            .iter()
                            .find(|p| {
                                p.key.first().is_some_and(|k| k.to_string() == *state)
                                    && p.key.get(1).is_some_and(|k| k.to_string() == *gov)
                            })
                            .map(|p| p.value)
                    })
                    .collect(),
            )
        })
        .collect();
    let svg = queimadas_chart::stacked_bar(
        &Titles::new("Desmatamento por Governo e Estado", "Governo", "Área (km²)"),
        &governments,
        &stacked,
    )?;
    app.write_chart("desmatamento_governo_estado", &svg)?;

    let yearly = selected_delta_totals(&by_state_only, &year, &government)?;
    if let Some(peak) = yearly
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value))
    {
        println!("  maior aumento anual: {} ({:+.1} km²)", peak.year, peak.value);
    }
    if !yearly.is_empty() {
        let svg = queimadas_chart::line(
            &Titles::new("Variação Anual do Desmatamento", "Ano", "Δ Área (km²)"),
            &yearly
                .iter()
                .map(|t| (t.year.to_string(), t.value))
                .collect::<Vec<_>>(),
        )?;
        app.write_chart("desmatamento_variacao_anual", &svg)?;
    }

    Ok(())
}

/// Runs the trained model over the projection table and plots it against
/// observed history.
///
/// # Errors
///
/// Returns an error if the model or a dataset cannot be loaded, the
/// projection does not fit the model, or rendering fails.
pub fn predict(app: &App, year: Option<i32>) -> CommandResult {
    let Some(merged) = projection_series(app, year)? else {
        println!("Tabela de projeção vazia.");
        return Ok(());
    };

    for point in merged.iter().filter(|p| p.kind == SeriesKind::Projected) {
        let period = point.month.map_or_else(
            || point.year.to_string(),
            |m| format!("{}/{}", month_abbreviation(m), point.year),
        );
        let previous = merged.iter().find(|p| {
            p.kind == SeriesKind::Observed && p.year == point.year - 1 && p.month == point.month
        });
        match previous {
            Some(previous) => println!(
                "Projeção para {period}: {:.0} focos ({:+.0} em relação a {})",
                point.value,
                point.value - previous.value,
                previous.year
            ),
            None => println!("Projeção para {period}: {:.0} focos", point.value),
        }
    }

    let svg = queimadas_chart::comparison(
        &Titles::new("Projeção de Queimadas", "Mês", "Qtd Queimadas"),
        &merged,
    )?;
    app.write_chart("projecao_queimadas", &svg)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn governments_rank_chronologically() {
        let mut labels = vec!["Lula", "Bolsonaro", "FHC", "Unknown", "Temer", "Dilma"];
        labels.sort_by_key(|label| government_rank(label));
        assert_eq!(labels, vec!["FHC", "Lula", "Dilma", "Temer", "Bolsonaro", "Unknown"]);
    }

    #[test]
    fn yearly_series_fill_missing_months_with_none() {
        let points = [
            MonthlyTotal {
                year: 2022,
                month: 1,
                value: 5.0,
            },
            MonthlyTotal {
                year: 2023,
                month: 2,
                value: 7.0,
            },
        ];
        let series = series_by_year(&points, &[1, 2]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "2022");
        assert_eq!(series[0].values, vec![Some(5.0), None]);
        assert_eq!(series[1].values, vec![None, Some(7.0)]);
    }

    fn fixture(name: &str) -> (PathBuf, App) {
        let root =
            std::env::temp_dir().join(format!("queimadas_cli_{name}_{}", std::process::id()));
        let data = root.join("data");
        std::fs::create_dir_all(&data).unwrap();
        let app = App::new(Config {
            data_dir: data,
            output_dir: root.join("out"),
            ..Config::default()
        });
        (root, app)
    }

    fn write_data(app: &App, dataset: &DatasetConfig, contents: &str) {
        std::fs::write(app.path(dataset), contents).unwrap();
    }

    /// Monthly weather rows for 2022 and January-May 2023, ten focuses per
    /// month number.
    fn write_weather(app: &App) {
        let mut csv =
            String::from("date,focuses,temperature_2m_max,temperature_2m_mean,precipitation_sum\n");
        for (year, last) in [(2022, 12), (2023, 5)] {
            for month in 1..=last {
                csv.push_str(&format!("{year}-{month:02}-01,{},31.0,26.0,80.0\n", month * 10));
            }
        }
        write_data(app, &app.config.weather, &csv);
    }

    fn chart_exists(root: &std::path::Path, chart: &str) -> bool {
        root.join("out").join(format!("{chart}.svg")).exists()
    }

    #[test]
    fn commands_write_charts_to_the_output_dir() {
        let (root, app) = fixture("fires");
        write_data(
            &app,
            &app.config.fires,
            "date;uf;focuses\n2023-01-01;PARÁ;10\n2023-02-01;ACRE;4\n2023-02-15;PARÁ;6\n",
        );

        fires(&app, None).unwrap();
        fires(&app, Some("roraima")).unwrap();
        let options = state_options(&app).unwrap();

        assert_eq!(
            options,
            vec![
                ("ACRE".to_string(), "Acre".to_string()),
                ("PARÁ".to_string(), "Pará".to_string())
            ]
        );
        for chart in ["queimadas_por_estado", "queimadas_por_mes", "historico_queimadas"] {
            assert!(chart_exists(&root, chart), "{chart}");
        }
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn year_filter_keeps_the_previous_year_baseline() {
        let (root, app) = fixture("deforestation");
        write_data(
            &app,
            &app.config.deforestation,
            "state,municipality,geocode,year,area\n\
             PA,Altamira,1500602,2020,100\n\
             PA,Altamira,1500602,2021,120\n\
             PA,Altamira,1500602,2022,90\n\
             PA,Altamira,1500602,2023,80\n\
             AC,Feijó,1200302,2021,5\n",
        );
        let table = app.deforestation().unwrap();

        let only_2021 = selected_delta_totals(
            &table,
            &Selection::parse(Dimension::Year, "2021").unwrap(),
            &Selection::All,
        )
        .unwrap();
        assert_eq!(
            only_2021,
            vec![YearTotal {
                year: 2021,
                value: 20.0
            }]
        );

        let bolsonaro = selected_delta_totals(
            &table,
            &Selection::All,
            &Selection::parse(Dimension::Government, "bolsonaro").unwrap(),
        )
        .unwrap();
        let values: Vec<(i32, f64)> = bolsonaro.iter().map(|t| (t.year, t.value)).collect();
        assert_eq!(values, vec![(2020, 0.0), (2021, 20.0), (2022, -30.0)]);

        deforestation(&app, Some("PA"), Some("2021"), None).unwrap();
        for chart in [
            "desmatamento_por_estado",
            "desmatamento_por_governo",
            "desmatamento_governo_estado",
            "desmatamento_variacao_anual",
        ] {
            assert!(chart_exists(&root, chart), "{chart}");
        }
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn compare_drops_the_partial_month_from_lines() {
        let (root, app) = fixture("compare");
        write_weather(&app);

        let points = monthly_totals(&app.weather().unwrap(), Measure::Focuses, 2022).unwrap();
        assert_eq!(points.len(), 17);
        let lines = line_points(&points, true);
        assert_eq!(lines.len(), 16);
        assert_eq!(latest_period(&lines), Some((2023, 4)));
        assert_eq!(line_points(&points, false).len(), 17);

        compare(&app, Some(2022), Some(4)).unwrap();
        for chart in [
            "comparativo_mensal",
            "comparativo_inicio_ano",
            "comparativo_acumulado",
        ] {
            assert!(chart_exists(&root, chart), "{chart}");
        }
        assert!(compare(&app, None, Some(13)).is_err());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn projected_month_replaces_observed_month() {
        let (root, app) = fixture("predict");
        write_weather(&app);
        write_data(
            &app,
            &app.config.projection,
            "ano,mes,uf\n2023,5,PA\n2023,5,AC\n2023,6,PA\n",
        );
        std::fs::write(
            app.config.model_path(),
            r#"{
                "kind": "linear",
                "schema": { "features": [
                    { "type": "one_hot", "column": "uf", "value": "PA" },
                    { "type": "one_hot", "column": "uf", "value": "AC" }
                ] },
                "intercept": 0.0,
                "coefficients": [30.0, 12.0]
            }"#,
        )
        .unwrap();

        let merged = projection_series(&app, None).unwrap().unwrap();
        assert!(app.model.is_loaded());

        let at = |kind: SeriesKind, month: u32| {
            merged
                .iter()
                .find(|p| p.kind == kind && p.year == 2023 && p.month == Some(month))
                .map(|p| p.value)
        };
        assert_eq!(at(SeriesKind::Projected, 5), Some(42.0));
        assert_eq!(at(SeriesKind::Projected, 6), Some(30.0));
        assert_eq!(at(SeriesKind::Observed, 5), None);
        assert_eq!(at(SeriesKind::Observed, 4), Some(40.0));

        predict(&app, None).unwrap();
        assert!(chart_exists(&root, "projecao_queimadas"));
        std::fs::remove_dir_all(&root).unwrap();
    }
}
