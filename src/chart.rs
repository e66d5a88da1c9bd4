//! Chart specifications handed to the charting front end.
//!
//! A spec is only data: a chart kind, labels and category/value points.
//! Styling and drawing belong to whoever renders it.

use serde::Serialize;

use crate::aggregate::{Aggregate, Bin};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: None,
            y_label: None,
            points: Vec::new(),
        }
    }

    pub fn labels(mut self, x: &str, y: &str) -> Self {
        self.x_label = Some(x.to_string());
        self.y_label = Some(y.to_string());
        self
    }

    /// Points in the aggregate's own order (first-seen, or chronological
    /// for daily series).
    pub fn from_aggregate(kind: ChartKind, title: &str, agg: &Aggregate) -> Self {
        let mut spec = Self::new(kind, title);
        spec.points = agg
            .iter()
            .map(|(label, value)| ChartPoint {
                label: label.to_string(),
                value,
            })
            .collect();
        spec
    }

    /// Points sorted largest first, optionally cut to `limit` entries.
    pub fn ranked(kind: ChartKind, title: &str, agg: &Aggregate, limit: Option<usize>) -> Self {
        let ranked = match limit {
            Some(n) => agg.top(n),
            None => agg.ranked(),
        };
        let mut spec = Self::new(kind, title);
        spec.points = ranked
            .into_iter()
            .map(|(label, value)| ChartPoint { label, value })
            .collect();
        spec
    }

    pub fn histogram(title: &str, bins: &[Bin]) -> Self {
        let mut spec = Self::new(ChartKind::Histogram, title);
        spec.points = bins
            .iter()
            .map(|b| ChartPoint {
                label: format!("{}-{}", trim_float(b.lower), trim_float(b.upper)),
                value: b.count as f64,
            })
            .collect();
        spec
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}
