//! Chart Specifications
//!
//! Output of the engine: named charts whose points are ready to hand to a
//! renderer. Nothing here draws anything.

use chrono::NaiveDate;
use serde::Serialize;

use super::request::AggregationMode;

/// Identifies one of the dashboard charts
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    Cases,
    Deaths,
    Vaccination,
    CasesVsDeaths,
    Stringency,
    GdpVsVaccination,
    DensityVsCases,
    Progression,
}

/// How a chart should be drawn
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Scatter,
    AnimatedScatter,
}

/// Axis scale
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

/// Axis rendering hints
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Axis {
    pub field: String,
    pub scale: AxisScale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn scale(mut self, scale: AxisScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some([min, max]);
        self
    }
}

/// X coordinate: a date for time series, a number for scatter charts
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(untagged)]
pub enum XValue {
    Date(NaiveDate),
    Number(f64),
}

/// A single plotted point
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub x: XValue,
    pub y: f64,
    /// Grouping key (country)
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
}

/// One time step of an animated chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Frame {
    pub date: NaiveDate,
    pub points: Vec<ChartPoint>,
}

/// Least-squares fit `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Trendline {
    /// Fit an ordinary least-squares line through `(x, y)` pairs
    ///
    /// Returns `None` with fewer than two points or when every x is equal.
    pub fn fit(pairs: &[(f64, f64)]) -> Option<Self> {
        if pairs.len() < 2 {
            return None;
        }

        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

        let sxx: f64 = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: f64 = pairs.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let mut line = Self {
            slope,
            intercept: mean_y - slope * mean_x,
            r_squared: 1.0,
        };

        let ss_tot: f64 = pairs.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = pairs.iter().map(|(x, y)| (y - line.predict(*x)).powi(2)).sum();
        if ss_tot != 0.0 {
            line.r_squared = 1.0 - ss_res / ss_tot;
        }

        Some(line)
    }

    /// Evaluate the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// A chart specification
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Chart {
    pub id: ChartId,
    pub kind: ChartKind,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Field the points are grouped (colored) by
    pub group_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_field: Option<String>,
    pub points: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trendline: Option<Trendline>,
}

impl Chart {
    pub fn new(id: ChartId, kind: ChartKind, title: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            x_axis,
            y_axis,
            group_field: "country".to_string(),
            size_field: None,
            points: Vec::new(),
            frames: Vec::new(),
            trendline: None,
        }
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.frames.iter().all(|f| f.points.is_empty())
    }

    /// Points belonging to one group
    pub fn group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a ChartPoint> + 'a {
        self.points.iter().filter(move |p| p.group == group)
    }
}

/// Request echo and view statistics
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartMeta {
    pub mode: AggregationMode,
    pub log_scale: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Countries that matched at least one row
    pub countries: Vec<String>,
    /// Rows in the filtered view
    pub rows: usize,
}

/// Everything the dashboard needs for one selection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartData {
    pub meta: ChartMeta,
    pub charts: Vec<Chart>,
}

impl ChartData {
    /// Look up a chart by id
    pub fn chart(&self, id: ChartId) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }

    /// True when every chart is empty
    pub fn is_empty(&self) -> bool {
        self.charts.iter().all(Chart::is_empty)
    }
}
