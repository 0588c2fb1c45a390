//! Filter stage.
//!
//! A [`Filter`] is a conjunction of `(dimension, selection)` criteria. The
//! sentinel selection [`Selection::All`] leaves a dimension unconstrained, so
//! a filter made only of sentinels returns the input table unchanged.

use std::collections::BTreeSet;

use queimadas_dataset_models::{Dimension, DimensionValue, Row, Table};

use crate::DatasetError;
use crate::loader::{parse_date, parse_int_cell};

/// Inputs that mean "no filtering" for a dimension.
pub const ALL_SENTINELS: &[&str] = &["all", "todos", "todas"];

/// A user selection for one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No constraint.
    All,
    /// Keep rows whose value matches exactly (case-insensitively for text).
    Only(DimensionValue),
}

impl Selection {
    /// Interprets raw user input for `dimension`.
    ///
    /// Sentinel words (`all`, `Todos`, ...) map to [`Self::All`]. Years and
    /// months must be integers and dates must parse; everything else is
    /// taken as text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Selection`] if a year, month or date input
    /// cannot be parsed.
    pub fn parse(dimension: Dimension, input: &str) -> Result<Self, DatasetError> {
        let input = input.trim();
        if ALL_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(input)) {
            return Ok(Self::All);
        }

        let invalid = || DatasetError::Selection {
            dimension: dimension.to_string(),
            value: input.to_string(),
        };

        let value = match dimension {
            Dimension::Year | Dimension::Month => {
                DimensionValue::Int(parse_int_cell(input).ok_or_else(invalid)?)
            }
            Dimension::Date => DimensionValue::Date(parse_date(input).ok_or_else(invalid)?),
            Dimension::State
            | Dimension::Municipality
            | Dimension::Geocode
            | Dimension::Government => DimensionValue::Text(input.to_string()),
        };

        Ok(Self::Only(value))
    }

    /// Builds a selection from an optional CLI value (`None` means all).
    ///
    /// # Errors
    ///
    /// See [`Self::parse`].
    pub fn from_option(dimension: Dimension, input: Option<&str>) -> Result<Self, DatasetError> {
        input.map_or(Ok(Self::All), |input| Self::parse(dimension, input))
    }

    /// Returns `true` if `value` satisfies this selection. A row that does
    /// not carry the dimension never satisfies a concrete selection.
    #[must_use]
    pub fn accepts(&self, value: Option<&DimensionValue>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => value.is_some_and(|v| v.matches(wanted)),
        }
    }
}

/// A conjunction of selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    criteria: Vec<(Dimension, Selection)>,
}

impl Filter {
    /// An empty filter that keeps every row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// Adds a criterion.
    #[must_use]
    pub fn with(mut self, dimension: Dimension, selection: Selection) -> Self {
        self.criteria.push((dimension, selection));
        self
    }

    /// Returns `true` if no criterion restricts anything.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.criteria.iter().all(|(_, s)| *s == Selection::All)
    }

    /// Returns `true` if `row` satisfies every criterion.
    #[must_use]
    pub fn accepts<R: Row>(&self, row: &R) -> bool {
        self.criteria.iter().all(|(dimension, selection)| {
            matches!(selection, Selection::All)
                || selection.accepts(row.dimension(*dimension).as_ref())
        })
    }

    /// Returns the rows of `table` satisfying every criterion, in their
    /// original order. The source table is left untouched.
    #[must_use]
    pub fn apply<R: Row + Clone>(&self, table: &Table<R>) -> Table<R> {
        if self.is_unrestricted() {
            return table.clone();
        }

        let filtered: Table<R> = table.iter().filter(|row| self.accepts(*row)).cloned().collect();

        log::debug!(
            "Filter kept {}/{} rows ({:?})",
            filtered.len(),
            table.len(),
            self.criteria
        );
        if filtered.is_empty() && !table.is_empty() {
            log::warn!("Selection matched no rows");
        }

        filtered
    }
}

/// Returns the distinct values of `dimension` in `table`, naturally sorted.
#[must_use]
pub fn distinct_values<R: Row>(table: &Table<R>, dimension: Dimension) -> Vec<DimensionValue> {
    table
        .iter()
        .filter_map(|row| row.dimension(dimension))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Title-cases a label for display (`"MATO GROSSO"` → `"Mato Grosso"`).
#[must_use]
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use queimadas_dataset_models::{DeforestationRecord, FireRecord};

    use super::*;

    fn fire(state: &str, month: u32, focuses: f64) -> FireRecord {
        FireRecord {
            state: state.to_string(),
            date: NaiveDate::from_ymd_opt(2022, month, 1).unwrap(),
            year: 2022,
            month,
            focuses: Some(focuses),
        }
    }

    fn fires() -> Table<FireRecord> {
        Table::new(vec![
            fire("ACRE", 1, 10.0),
            fire("PARÁ", 1, 20.0),
            fire("ACRE", 2, 5.0),
        ])
    }

    fn deforestation(year: i32) -> DeforestationRecord {
        DeforestationRecord {
            state: "PA".to_string(),
            municipality: "Altamira".to_string(),
            geocode: "1500602".to_string(),
            year,
            area: Some(1.0),
        }
    }

    #[test]
    fn sentinel_returns_table_unchanged() {
        let table = fires();
        for sentinel in ["all", "Todos", "TODAS"] {
            let filter = Filter::new().with(
                Dimension::State,
                Selection::parse(Dimension::State, sentinel).unwrap(),
            );
            assert_eq!(filter.apply(&table), table);
        }
        assert_eq!(Filter::new().apply(&table), table);
    }

    #[test]
    fn text_selection_is_case_insensitive() {
        let filter = Filter::new().with(
            Dimension::State,
            Selection::parse(Dimension::State, "Pará").unwrap(),
        );
        let result = filter.apply(&fires());
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].state, "PARÁ");
    }

    #[test]
    fn criteria_are_conjunctive() {
        let filter = Filter::new()
            .with(Dimension::State, Selection::Only("acre".into()))
            .with(Dimension::Month, Selection::parse(Dimension::Month, "2").unwrap());
        let result = filter.apply(&fires());
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].focuses, Some(5.0));
    }

    #[test]
    fn unknown_value_yields_empty_subset() {
        let filter = Filter::new().with(Dimension::State, Selection::Only("Atlantis".into()));
        assert!(filter.apply(&fires()).is_empty());
    }

    #[test]
    fn missing_dimension_never_matches() {
        let filter = Filter::new().with(Dimension::Geocode, Selection::Only("1500602".into()));
        assert!(filter.apply(&fires()).is_empty());
    }

    #[test]
    fn filters_by_government_label() {
        let table = Table::new(vec![deforestation(2017), deforestation(2019), deforestation(2023)]);
        let filter = Filter::new().with(
            Dimension::Government,
            Selection::parse(Dimension::Government, "bolsonaro").unwrap(),
        );
        let result = filter.apply(&table);
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].year, 2019);
    }

    #[test]
    fn rejects_non_numeric_year() {
        assert!(matches!(
            Selection::parse(Dimension::Year, "last year"),
            Err(DatasetError::Selection { .. })
        ));
        assert_eq!(
            Selection::from_option(Dimension::Year, None).unwrap(),
            Selection::All
        );
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let values = distinct_values(&fires(), Dimension::State);
        assert_eq!(
            values,
            vec![DimensionValue::from("ACRE"), DimensionValue::from("PARÁ")]
        );
    }

    #[test]
    fn title_cases_state_names() {
        assert_eq!(title_case("MATO GROSSO DO SUL"), "Mato Grosso Do Sul");
        assert_eq!(title_case("pará"), "Pará");
    }
}
