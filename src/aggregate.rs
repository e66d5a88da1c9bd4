//! Group-by aggregation into chart-ready category/value series.
//!
//! Groups keep the order in which their key was first seen. Rankings sort by
//! value, largest first, and rows that tie exactly keep that first-seen
//! order, so "top N" lists are deterministic.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::Record;

/// What to compute for each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric<M, D> {
    /// Sum of a measure.
    Sum(M),
    /// Number of rows.
    Count,
    /// Arithmetic mean of a measure.
    Mean(M),
    /// Number of distinct values of another column.
    CountDistinct(D),
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Mapping from group key to its value, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    entries: Vec<(String, f64)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Aggregate {
    fn from_entries(entries: Vec<(String, f64)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all group values.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Groups sorted by value, largest first; exact ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(usize, &(String, f64))> = self.entries.iter().enumerate().collect();
        ranked.sort_by(|(ia, (_, a)), (ib, (_, b))| {
            b.partial_cmp(a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ia.cmp(ib))
        });
        ranked.into_iter().map(|(_, e)| e.clone()).collect()
    }

    /// The `n` largest groups.
    pub fn top(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// The `n` smallest groups; exact ties keep first-seen order.
    pub fn bottom(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(usize, &(String, f64))> = self.entries.iter().enumerate().collect();
        ranked.sort_by(|(ia, (_, a)), (ib, (_, b))| {
            a.partial_cmp(b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ia.cmp(ib))
        });
        ranked.into_iter().take(n).map(|(_, e)| e.clone()).collect()
    }

    /// The largest group, if any.
    pub fn leader(&self) -> Option<(String, f64)> {
        self.ranked().into_iter().next()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    distinct: HashSet<String>,
}

fn group_by<R, F>(rows: &[R], key: F, metric: Metric<R::Measure, R::Dimension>) -> Vec<(String, f64)>
where
    R: Record,
    F: Fn(&R) -> Option<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Accumulator> = HashMap::new();

    for row in rows {
        let Some(k) = key(row) else { continue };
        if !groups.contains_key(&k) {
            order.push(k.clone());
        }
        let acc = groups.entry(k).or_default();
        acc.count += 1;
        match metric {
            Metric::Sum(m) | Metric::Mean(m) => acc.sum += row.measure(m),
            Metric::Count => {}
            Metric::CountDistinct(d) => {
                acc.distinct.insert(row.dimension(d).into_owned());
            }
        }
    }

    order
        .into_iter()
        .map(|k| {
            let acc = &groups[&k];
            let value = match metric {
                Metric::Sum(_) => acc.sum,
                Metric::Count => acc.count as f64,
                Metric::Mean(_) => acc.sum / acc.count as f64,
                Metric::CountDistinct(_) => acc.distinct.len() as f64,
            };
            (k, value)
        })
        .collect()
}

/// Group `rows` by the value of `group` and compute `metric` per group.
///
/// Every row belongs to exactly one group, so for [`Metric::Sum`] the group
/// values add up to the measure's total over `rows`.
pub fn aggregate<R: Record>(
    rows: &[R],
    group: R::Dimension,
    metric: Metric<R::Measure, R::Dimension>,
) -> Aggregate {
    Aggregate::from_entries(group_by(
        rows,
        |row| Some(row.dimension(group).into_owned()),
        metric,
    ))
}

/// Group dated rows by day (`YYYY-MM-DD`), in chronological order.
///
/// Undated rows are left out.
pub fn daily<R: Record>(rows: &[R], metric: Metric<R::Measure, R::Dimension>) -> Aggregate {
    let mut entries = group_by(
        rows,
        |row| row.date().map(|d| d.format("%Y-%m-%d").to_string()),
        metric,
    );
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Aggregate::from_entries(entries)
}

/// Total of a measure over all rows.
pub fn total<R: Record>(rows: &[R], measure: R::Measure) -> f64 {
    rows.iter().map(|row| row.measure(measure)).sum()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One histogram bucket covering `[lower, upper)`; the last bucket also
/// includes its upper bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Split `values` into `bins` equal-width buckets between their minimum and
/// maximum.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if bins == 0 || finite.is_empty() {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![Bin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
