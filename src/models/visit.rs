use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::{de, Record};

// ---------------------------------------------------------------------------
// VisitRow: One collection visit joined with route, neighborhood, collector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitRow {
    #[serde(deserialize_with = "de::opt_text")]
    pub visit_date: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub kilograms: Option<f64>,
    /// Free-form flag as stored: `Si`/`No`, `yes`/`no`, booleans, `1`/`0`.
    #[serde(deserialize_with = "de::opt_text")]
    pub completed: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub route_name: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub material: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub neighborhood: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub collector: Option<String>,
}

// ---------------------------------------------------------------------------
// Visit: A cleaned collection visit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub visit_date: Option<NaiveDate>,
    pub kilograms: f64,
    pub completed: bool,
    pub route_name: String,
    pub material: String,
    pub neighborhood: String,
    pub collector: String,
    pub period: Option<String>,
    pub weekday: Option<String>,
}

impl Visit {
    /// Turn a cleaned visit back into the raw shape the cleaner accepts.
    pub fn to_row(&self) -> VisitRow {
        VisitRow {
            visit_date: self.visit_date.map(|d| d.format("%Y-%m-%d").to_string()),
            kilograms: Some(self.kilograms),
            completed: Some(if self.completed { "yes" } else { "no" }.to_string()),
            route_name: Some(self.route_name.clone()),
            material: Some(self.material.clone()),
            neighborhood: Some(self.neighborhood.clone()),
            collector: Some(self.collector.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitDimension {
    Route,
    Material,
    Neighborhood,
    Collector,
    Period,
    /// `yes` or `no`.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitMeasure {
    Kilograms,
}

impl Record for Visit {
    type Dimension = VisitDimension;
    type Measure = VisitMeasure;

    fn date(&self) -> Option<NaiveDate> {
        self.visit_date
    }

    fn dimension(&self, dim: VisitDimension) -> Cow<'_, str> {
        match dim {
            VisitDimension::Route => Cow::Borrowed(&self.route_name),
            VisitDimension::Material => Cow::Borrowed(&self.material),
            VisitDimension::Neighborhood => Cow::Borrowed(&self.neighborhood),
            VisitDimension::Collector => Cow::Borrowed(&self.collector),
            VisitDimension::Period => match &self.period {
                Some(p) => Cow::Borrowed(p.as_str()),
                None => Cow::Borrowed(crate::config::UNSPECIFIED),
            },
            VisitDimension::Completed => Cow::Borrowed(if self.completed { "yes" } else { "no" }),
        }
    }

    fn measure(&self, measure: VisitMeasure) -> f64 {
        match measure {
            VisitMeasure::Kilograms => self.kilograms,
        }
    }
}
