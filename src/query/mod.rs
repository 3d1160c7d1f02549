//! Query/Aggregation Engine
//!
//! Turns a dashboard selection into chart specifications.
//!
//! # Example
//!
//! ```rust,ignore
//! use covid_dashboard::query::{compute, AggregationMode, ChartId, ChartRequest};
//!
//! let request = ChartRequest::new(&["India"], start, end).mode(AggregationMode::Cumulative);
//! let charts = compute(&dataset, &request);
//! let cases = charts.chart(ChartId::Cases).unwrap();
//! ```

mod chart;
mod engine;
mod request;

pub use chart::{
    Axis, AxisScale, Chart, ChartData, ChartId, ChartKind, ChartMeta, ChartPoint, Frame,
    Trendline, XValue,
};
pub use engine::{compute, FilteredView, CUMULATIVE_METRICS};
pub use request::{AggregationMode, ChartRequest};
