//! Query/Aggregation Engine
//!
//! Pure function from (dataset, request) to chart data:
//!
//! ```text
//! Request → Filter → Accumulate (cumulative mode) → Snapshot → Charts
//! ```
//!
//! No input raises. Empty selections and inverted windows give empty charts.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::chart::{
    Axis, AxisScale, Chart, ChartData, ChartId, ChartKind, ChartMeta, ChartPoint, Frame,
    Trendline, XValue,
};
use super::request::{AggregationMode, ChartRequest};
use crate::dataset::{Dataset, Metric, Observation};

/// Counters rewritten in cumulative mode
pub const CUMULATIVE_METRICS: [Metric; 2] = [Metric::NewCases, Metric::NewDeaths];

/// Axis ranges of the animated progression chart
const PROGRESSION_X_RANGE: (f64, f64) = (10.0, 1e6);
const PROGRESSION_Y_RANGE: (f64, f64) = (1.0, 1e5);

/// Transient subset of the dataset for one request
///
/// Holds owned copies so aggregation never touches the shared table.
/// Rows stay in (country, date) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    rows: Vec<Observation>,
}

impl FilteredView {
    /// Select `countries` within the inclusive window `[start, end]`
    pub fn filter(dataset: &Dataset, countries: &[String], start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::default();
        }

        let selected: BTreeSet<&str> = countries.iter().map(String::as_str).collect();
        let mut rows = Vec::new();

        for country in selected {
            let country_rows = dataset.rows_for(country);
            if country_rows.is_empty() {
                tracing::debug!(country, "Requested country not in dataset");
                continue;
            }
            let lo = country_rows.partition_point(|r| r.date < start);
            let hi = country_rows.partition_point(|r| r.date <= end);
            rows.extend_from_slice(&country_rows[lo..hi]);
        }

        Self { rows }
    }

    /// Re-filter this view to a narrower window
    pub fn narrow(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .cloned()
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Countries present, in order
    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = Vec::new();
        for row in &self.rows {
            if countries.last() != Some(&row.country) {
                countries.push(row.country.clone());
            }
        }
        countries
    }

    /// Replace `metrics` with their running sum per country
    ///
    /// The sum resets at every country boundary and starts at the first row
    /// of the view, not at the dataset's first date.
    pub fn accumulate(&mut self, metrics: &[Metric]) {
        let mut totals = vec![0.0; metrics.len()];
        let mut current: Option<String> = None;

        for row in &mut self.rows {
            if current.as_deref() != Some(row.country.as_str()) {
                totals.iter_mut().for_each(|t| *t = 0.0);
                current = Some(row.country.clone());
            }
            for (total, metric) in totals.iter_mut().zip(metrics) {
                *total += row.get(*metric);
                row.set(*metric, *total);
            }
        }
    }

    /// Latest row per country
    ///
    /// At most one row per country; on equal dates the first one seen wins.
    pub fn latest_per_country(&self) -> Vec<&Observation> {
        let mut latest: BTreeMap<&str, &Observation> = BTreeMap::new();
        for row in &self.rows {
            let newer = latest
                .get(row.country.as_str())
                .map_or(true, |best| row.date > best.date);
            if newer {
                latest.insert(row.country.as_str(), row);
            }
        }
        latest.into_values().collect()
    }

    /// Rows grouped by distinct date, ascending
    pub fn by_date(&self) -> BTreeMap<NaiveDate, Vec<&Observation>> {
        let mut frames: BTreeMap<NaiveDate, Vec<&Observation>> = BTreeMap::new();
        for row in &self.rows {
            frames.entry(row.date).or_default().push(row);
        }
        frames
    }
}

/// Compute every dashboard chart for `request`
pub fn compute(dataset: &Dataset, request: &ChartRequest) -> ChartData {
    if request.is_inverted() {
        tracing::debug!(
            start_date = %request.start_date,
            end_date = %request.end_date,
            "Start after end, charts will be empty"
        );
    }

    let mut view = FilteredView::filter(
        dataset,
        &request.countries,
        request.start_date,
        request.end_date,
    );

    if request.mode == AggregationMode::Cumulative {
        view.accumulate(&CUMULATIVE_METRICS);
    }

    let snapshot = view.latest_per_country();
    let counter_scale = if request.log_scale {
        AxisScale::Log
    } else {
        AxisScale::Linear
    };
    let label = request.mode.label();

    let charts = vec![
        line_chart(
            ChartId::Cases,
            format!("{} COVID-19 Cases", label),
            Metric::NewCases,
            counter_scale,
            &view,
        ),
        line_chart(
            ChartId::Deaths,
            format!("{} COVID-19 Deaths", label),
            Metric::NewDeaths,
            counter_scale,
            &view,
        ),
        line_chart(
            ChartId::Vaccination,
            "Vaccination Coverage (% Fully Vaccinated)",
            Metric::PeopleFullyVaccinatedPerHundred,
            AxisScale::Linear,
            &view,
        ),
        scatter_chart(
            ChartId::CasesVsDeaths,
            "Total Cases vs Deaths per Million (Bubble size = Population)",
            Metric::TotalCasesPerMillion,
            Metric::TotalDeathsPerMillion,
            &snapshot,
            false,
        ),
        line_chart(
            ChartId::Stringency,
            "Government Stringency Index Over Time",
            Metric::StringencyIndex,
            AxisScale::Linear,
            &view,
        ),
        scatter_chart(
            ChartId::GdpVsVaccination,
            "GDP per Capita vs Vaccination Rate",
            Metric::GdpPerCapita,
            Metric::PeopleFullyVaccinatedPerHundred,
            &snapshot,
            true,
        ),
        scatter_chart(
            ChartId::DensityVsCases,
            "Population Density vs Cases per Million",
            Metric::PopulationDensity,
            Metric::TotalCasesPerMillion,
            &snapshot,
            true,
        ),
        progression_chart(&view),
    ];

    ChartData {
        meta: ChartMeta {
            mode: request.mode,
            log_scale: request.log_scale,
            start_date: request.start_date,
            end_date: request.end_date,
            countries: view.countries(),
            rows: view.len(),
        },
        charts,
    }
}

fn line_chart(
    id: ChartId,
    title: impl Into<String>,
    metric: Metric,
    y_scale: AxisScale,
    view: &FilteredView,
) -> Chart {
    let mut chart = Chart::new(
        id,
        ChartKind::Line,
        title,
        Axis::new("date"),
        Axis::new(metric.column()).scale(y_scale),
    );

    chart.points = view
        .rows()
        .iter()
        .map(|row| ChartPoint {
            x: XValue::Date(row.date),
            y: row.get(metric),
            group: row.country.clone(),
            size: None,
            hover: None,
        })
        .collect();

    chart
}

fn scatter_chart(
    id: ChartId,
    title: &str,
    x: Metric,
    y: Metric,
    snapshot: &[&Observation],
    with_trendline: bool,
) -> Chart {
    let mut chart = Chart::new(
        id,
        ChartKind::Scatter,
        title,
        Axis::new(x.column()),
        Axis::new(y.column()),
    );
    chart.size_field = Some(Metric::Population.column().to_string());
    chart.points = snapshot.iter().map(|row| bubble(row, x, y)).collect();

    if with_trendline {
        let pairs: Vec<(f64, f64)> = snapshot.iter().map(|row| (row.get(x), row.get(y))).collect();
        chart.trendline = Trendline::fit(&pairs);
    }

    chart
}

fn progression_chart(view: &FilteredView) -> Chart {
    let x = Metric::TotalCasesPerMillion;
    let y = Metric::TotalDeathsPerMillion;

    let mut chart = Chart::new(
        ChartId::Progression,
        ChartKind::AnimatedScatter,
        "COVID-19 Progression Over Time (Animated)",
        Axis::new(x.column())
            .scale(AxisScale::Log)
            .range(PROGRESSION_X_RANGE.0, PROGRESSION_X_RANGE.1),
        Axis::new(y.column())
            .scale(AxisScale::Log)
            .range(PROGRESSION_Y_RANGE.0, PROGRESSION_Y_RANGE.1),
    );
    chart.size_field = Some(Metric::Population.column().to_string());
    chart.frames = view
        .by_date()
        .into_iter()
        .map(|(date, rows)| Frame {
            date,
            points: rows.into_iter().map(|row| bubble(row, x, y)).collect(),
        })
        .collect();

    chart
}

/// Scatter point sized by population
fn bubble(row: &Observation, x: Metric, y: Metric) -> ChartPoint {
    let population = row.get(Metric::Population);
    ChartPoint {
        x: XValue::Number(row.get(x)),
        y: row.get(y),
        group: row.country.clone(),
        size: Some(population),
        hover: Some(format!(
            "{} ({}): population {:.0}",
            row.country, row.date, population
        )),
    }
}
