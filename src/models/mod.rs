pub mod booking;
pub mod visit;

pub use booking::*;
pub use visit::*;

use chrono::NaiveDate;
use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

/// A cleaned row that the filter engine and aggregator can work on.
///
/// Each entity names its filterable/groupable columns as a `Dimension` enum
/// and its numeric columns as a `Measure` enum, so column presence is checked
/// at compile time instead of by probing a loosely typed table.
pub trait Record {
    type Dimension: Copy + Eq + Hash + Debug;
    type Measure: Copy + Debug;

    /// The primary date used for date-range filtering and daily series.
    fn date(&self) -> Option<NaiveDate>;

    /// The textual value of a categorical column.
    fn dimension(&self, dim: Self::Dimension) -> Cow<'_, str>;

    /// The numeric value of a measure column.
    fn measure(&self, measure: Self::Measure) -> f64;
}

/// Lenient deserializers for raw driver rows.
///
/// Raw rows come from whatever column types the database happens to use, so
/// numbers may arrive as strings and labels as numbers. Anything that cannot
/// be read becomes `None` rather than failing the whole load.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(Value::Bool(b)) => Some(if b { 1.0 } else { 0.0 }),
            _ => None,
        }
        .filter(|f| f.is_finite()))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }
}
