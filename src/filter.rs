//! Row filtering by date range and per-column value selections.
//!
//! All criteria are AND-combined. A criterion that is not set, or a
//! selection with no values, does not restrict anything: selecting nothing
//! in a multi-select widget means "show everything".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use crate::models::Record;

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// An inclusive range of days.
///
/// A range whose start is after its end contains no day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// The smallest range covering every dated row, or `None` if no row has
    /// a date. This is the range a date picker starts out with.
    pub fn spanning<R: Record>(rows: &[R]) -> Option<Self> {
        let mut dates = rows.iter().filter_map(|row| row.date());
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// The filters chosen for one pass.
///
/// ```rust
/// use booking_dashboard::filter::FilterCriteria;
/// use booking_dashboard::models::BookingDimension;
/// use chrono::NaiveDate;
///
/// let criteria = FilterCriteria::new()
///     .between(
///         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
///     )
///     .only(BookingDimension::Status, ["confirmed"]);
/// assert!(!criteria.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria<D> {
    date_range: Option<DateRange>,
    selections: Vec<(D, HashSet<String>)>,
}

impl<D> Default for FilterCriteria<D> {
    fn default() -> Self {
        Self {
            date_range: None,
            selections: Vec::new(),
        }
    }
}

impl<D: Copy + Eq + Hash> FilterCriteria<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows dated between `start` and `end`, both included.
    pub fn between(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range(Some(DateRange::new(start, end)))
    }

    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }

    /// Keep rows whose `dim` value is one of `values`.
    ///
    /// An empty `values` adds no restriction. Selecting the same dimension
    /// twice keeps rows that satisfy both selections.
    pub fn only<I, S>(mut self, dim: D, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: HashSet<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.selections.push((dim, values));
        }
        self
    }

    pub fn get_date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    /// The first value set selected for `dim`, if any.
    pub fn selected(&self, dim: D) -> Option<&HashSet<String>> {
        self.selections
            .iter()
            .find(|(d, _)| *d == dim)
            .map(|(_, values)| values)
    }

    /// True when no criterion restricts anything.
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.selections.is_empty()
    }

    /// Whether a single row passes every criterion.
    ///
    /// Undated rows fail any date range.
    pub fn matches<R: Record<Dimension = D>>(&self, row: &R) -> bool {
        if let Some(range) = self.date_range {
            match row.date() {
                Some(day) if range.contains(day) => {}
                _ => return false,
            }
        }
        self.selections
            .iter()
            .all(|(dim, allowed)| allowed.contains(row.dimension(*dim).as_ref()))
    }
}

/// Return the rows that pass `criteria`, in their original order.
pub fn filter<R>(rows: &[R], criteria: &FilterCriteria<R::Dimension>) -> Vec<R>
where
    R: Record + Clone,
{
    if criteria.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| criteria.matches(*row))
        .cloned()
        .collect()
}

/// Sorted distinct values of one column, for populating selection widgets.
pub fn options<R: Record>(rows: &[R], dim: R::Dimension) -> Vec<String> {
    rows.iter()
        .map(|row| row.dimension(dim).into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
