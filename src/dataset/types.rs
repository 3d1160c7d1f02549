//! Core data types for the COVID-19 dataset
//!
//! - `Metric`: one of the numeric columns kept from the upstream CSV
//! - `Observation`: one normalized (country, date) row
//! - `Dataset`: the sorted, gap-free table shared for the process lifetime

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Numeric columns retained from the upstream dataset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalCases,
    NewCases,
    TotalDeaths,
    NewDeaths,
    TotalCasesPerMillion,
    TotalDeathsPerMillion,
    TotalVaccinations,
    PeopleFullyVaccinated,
    PeopleFullyVaccinatedPerHundred,
    NewVaccinations,
    TotalTestsPerThousand,
    StringencyIndex,
    Population,
    GdpPerCapita,
    PopulationDensity,
    MedianAge,
}

impl Metric {
    /// Number of numeric columns
    pub const COUNT: usize = 16;

    /// All metrics in column order
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::TotalCases,
        Metric::NewCases,
        Metric::TotalDeaths,
        Metric::NewDeaths,
        Metric::TotalCasesPerMillion,
        Metric::TotalDeathsPerMillion,
        Metric::TotalVaccinations,
        Metric::PeopleFullyVaccinated,
        Metric::PeopleFullyVaccinatedPerHundred,
        Metric::NewVaccinations,
        Metric::TotalTestsPerThousand,
        Metric::StringencyIndex,
        Metric::Population,
        Metric::GdpPerCapita,
        Metric::PopulationDensity,
        Metric::MedianAge,
    ];

    /// Column name in the upstream CSV
    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => "total_cases",
            Metric::NewCases => "new_cases",
            Metric::TotalDeaths => "total_deaths",
            Metric::NewDeaths => "new_deaths",
            Metric::TotalCasesPerMillion => "total_cases_per_million",
            Metric::TotalDeathsPerMillion => "total_deaths_per_million",
            Metric::TotalVaccinations => "total_vaccinations",
            Metric::PeopleFullyVaccinated => "people_fully_vaccinated",
            Metric::PeopleFullyVaccinatedPerHundred => "people_fully_vaccinated_per_hundred",
            Metric::NewVaccinations => "new_vaccinations",
            Metric::TotalTestsPerThousand => "total_tests_per_thousand",
            Metric::StringencyIndex => "stringency_index",
            Metric::Population => "population",
            Metric::GdpPerCapita => "gdp_per_capita",
            Metric::PopulationDensity => "population_density",
            Metric::MedianAge => "median_age",
        }
    }

    /// Position of this metric in `Observation::values`
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// One normalized country-date row
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub date: NaiveDate,
    /// Values indexed by `Metric::index`
    pub values: [f64; Metric::COUNT],
}

impl Observation {
    /// Create an observation with every metric set to zero
    pub fn new(country: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            country: country.into(),
            date,
            values: [0.0; Metric::COUNT],
        }
    }

    /// Builder method: set a metric value
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.values[metric.index()] = value;
        self
    }

    /// Get a metric value
    pub fn get(&self, metric: Metric) -> f64 {
        self.values[metric.index()]
    }

    /// Set a metric value
    pub fn set(&mut self, metric: Metric, value: f64) {
        self.values[metric.index()] = value;
    }
}

/// Summary of one country's rows
#[derive(Debug, Clone, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// The loaded table
///
/// Rows are sorted by (country, date), every (country, date) pair is unique
/// and no numeric value is missing. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Observation>,
    /// Contiguous row range per country
    country_ranges: BTreeMap<String, Range<usize>>,
}

impl Dataset {
    /// Build a dataset from rows already sorted by (country, date)
    pub(crate) fn from_sorted(rows: Vec<Observation>) -> Self {
        let mut country_ranges: BTreeMap<String, Range<usize>> = BTreeMap::new();
        let mut start = 0;

        for i in 1..=rows.len() {
            if i == rows.len() || rows[i].country != rows[start].country {
                country_ranges.insert(rows[start].country.clone(), start..i);
                start = i;
            }
        }

        Self {
            rows,
            country_ranges,
        }
    }

    /// All rows in (country, date) order
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Rows for a single country, in date order
    pub fn rows_for(&self, country: &str) -> &[Observation] {
        match self.country_ranges.get(country) {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// Loaded countries, sorted
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.country_ranges.keys().map(String::as_str)
    }

    /// Check if a country is present
    pub fn contains_country(&self, country: &str) -> bool {
        self.country_ranges.contains_key(country)
    }

    /// Earliest and latest date across all countries
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.date).min()?;
        let max = self.rows.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Per-country row counts and date ranges
    pub fn summaries(&self) -> Vec<CountrySummary> {
        self.country_ranges
            .iter()
            .filter_map(|(country, range)| {
                let rows = &self.rows[range.clone()];
                Some(CountrySummary {
                    country: country.clone(),
                    rows: rows.len(),
                    first_date: rows.first()?.date,
                    last_date: rows.last()?.date,
                })
            })
            .collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_metric_index_matches_order() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
        }
    }

    #[test]
    fn test_observation_builder() {
        let obs = Observation::new("India", date("2021-01-01"))
            .with(Metric::NewCases, 12.0)
            .with(Metric::Population, 1.4e9);

        assert_eq!(obs.get(Metric::NewCases), 12.0);
        assert_eq!(obs.get(Metric::Population), 1.4e9);
        assert_eq!(obs.get(Metric::NewDeaths), 0.0);
    }

    #[test]
    fn test_dataset_country_ranges() {
        let rows = vec![
            Observation::new("Brazil", date("2021-01-01")),
            Observation::new("Brazil", date("2021-01-02")),
            Observation::new("India", date("2020-12-31")),
        ];
        let dataset = Dataset::from_sorted(rows);

        assert_eq!(dataset.rows_for("Brazil").len(), 2);
        assert_eq!(dataset.rows_for("India").len(), 1);
        assert!(dataset.rows_for("France").is_empty());
        assert_eq!(dataset.countries().collect::<Vec<_>>(), vec!["Brazil", "India"]);
        assert_eq!(
            dataset.date_bounds(),
            Some((date("2020-12-31"), date("2021-01-02")))
        );
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_sorted(Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.date_bounds(), None);
        assert!(dataset.summaries().is_empty());
    }
}
