//! Headline indicators shown above the charts.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::aggregate::{aggregate, Metric};
use crate::config::{CANCELLED_STATUS, CONFIRMED_STATUS, UNSPECIFIED};
use crate::models::{Booking, Visit, VisitDimension};

// ---------------------------------------------------------------------------
// BookingKpis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingKpis {
    /// Sum of net amounts over all rows.
    pub total_revenue: f64,
    /// Distinct reservation ids.
    pub reservations: usize,
    pub average_per_reservation: f64,
    /// Mean stay length in nights, per row.
    pub average_stay: f64,
    pub clients: usize,
    pub rooms: usize,
    /// Distinct special services actually booked.
    pub services_used: usize,
    /// Reservation amounts counted once per reservation, ignoring join
    /// fan-out.
    pub booked_total: f64,
    /// Stay nights counted once per reservation.
    pub nights_booked: i64,
    /// Percentage of reservations whose status is confirmed.
    pub confirmation_rate: f64,
    /// Percentage of reservations whose status is cancelled.
    pub cancellation_rate: f64,
    /// Revenue change from the first to the last month with dated rows, in
    /// percent. `None` with fewer than two months or a zero first month.
    pub monthly_growth: Option<f64>,
}

impl BookingKpis {
    pub fn compute(rows: &[Booking]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }

        let mut reservations: HashSet<i64> = HashSet::new();
        let mut clients: HashSet<i64> = HashSet::new();
        let mut rooms: HashSet<i64> = HashSet::new();
        let mut services: HashSet<&str> = HashSet::new();
        let mut total_revenue = 0.0;
        let mut nights = 0i64;
        let mut booked_total = 0.0;
        let mut nights_booked = 0i64;
        let mut confirmed = 0usize;
        let mut cancelled = 0usize;
        let mut months: BTreeMap<&str, f64> = BTreeMap::new();

        for row in rows {
            total_revenue += row.net_amount;
            nights += row.stay_nights;
            if let Some(id) = row.reservation_id {
                if reservations.insert(id) {
                    booked_total += row.amount;
                    nights_booked += row.stay_nights;
                    if row.status.eq_ignore_ascii_case(CONFIRMED_STATUS) {
                        confirmed += 1;
                    } else if row.status.eq_ignore_ascii_case(CANCELLED_STATUS) {
                        cancelled += 1;
                    }
                }
            }
            if let Some(ref period) = row.period {
                *months.entry(period.as_str()).or_default() += row.net_amount;
            }
            if let Some(id) = row.client_id {
                clients.insert(id);
            }
            if let Some(id) = row.room_id {
                rooms.insert(id);
            }
            if row.special_service != UNSPECIFIED {
                services.insert(row.special_service.as_str());
            }
        }

        let share = |n: usize| {
            if reservations.is_empty() {
                0.0
            } else {
                n as f64 / reservations.len() as f64 * 100.0
            }
        };
        let average_per_reservation = if reservations.is_empty() {
            0.0
        } else {
            total_revenue / reservations.len() as f64
        };

        Self {
            total_revenue,
            reservations: reservations.len(),
            average_per_reservation,
            average_stay: nights as f64 / rows.len() as f64,
            clients: clients.len(),
            rooms: rooms.len(),
            services_used: services.len(),
            booked_total,
            nights_booked,
            confirmation_rate: share(confirmed),
            cancellation_rate: share(cancelled),
            monthly_growth: monthly_growth(&months),
        }
    }
}

/// Percent change between the first and last month, in calendar order.
fn monthly_growth(months: &BTreeMap<&str, f64>) -> Option<f64> {
    if months.len() < 2 {
        return None;
    }
    let first = *months.values().next()?;
    let last = *months.values().next_back()?;
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

// ---------------------------------------------------------------------------
// VisitKpis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisitKpis {
    pub total_kilograms: f64,
    pub visits: usize,
    pub completed: usize,
    /// Completed visits as a percentage of all visits.
    pub completion_rate: f64,
    /// Route with the most visits and its visit count.
    pub leading_route: Option<(String, usize)>,
    /// Collector with the most visits and their visit count.
    pub top_collector: Option<(String, usize)>,
}

impl VisitKpis {
    pub fn compute(rows: &[Visit]) -> Self {
        let visits = rows.len();
        let completed = rows.iter().filter(|v| v.completed).count();
        let completion_rate = if visits == 0 {
            0.0
        } else {
            completed as f64 / visits as f64 * 100.0
        };

        let leader = |dim: VisitDimension| {
            aggregate(rows, dim, Metric::Count)
                .leader()
                .map(|(name, count)| (name, count as usize))
        };

        Self {
            total_kilograms: rows.iter().map(|v| v.kilograms).sum(),
            visits,
            completed,
            completion_rate,
            leading_route: leader(VisitDimension::Route),
            top_collector: leader(VisitDimension::Collector),
        }
    }
}
