//! Assembles the filtered rows, KPIs and chart series of one pass.
//!
//! Everything here is pure: it starts from cleaned rows, so it can run on
//! rows from any source.

use serde::Serialize;

use crate::aggregate::{aggregate, daily, histogram, Aggregate, Bin, Metric};
use crate::chart::{ChartKind, ChartPoint, ChartSpec};
use crate::config::{
    DEFAULT_HISTOGRAM_BINS, LEAST_USED_PAYMENTS_SHOWN, REVENUE_SERVICES_SHOWN, UNSPECIFIED,
};
use crate::filter::{filter, FilterCriteria};
use crate::kpi::{BookingKpis, VisitKpis};
use crate::models::{
    Booking, BookingDimension, BookingMeasure, Visit, VisitDimension, VisitMeasure,
};

/// Why a pass has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoData {
    /// The loader returned no rows at all.
    NothingLoaded,
    /// Rows were loaded but none passed the filters.
    NothingMatched,
}

/// Result of a pass that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    NoData(NoData),
    Ready(T),
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(t) => Some(t),
            Outcome::NoData(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingReport {
    pub rows: Vec<Booking>,
    pub kpis: BookingKpis,
    pub daily_revenue: Aggregate,
    pub monthly_revenue: Aggregate,
    pub bookings_by_room_type: Aggregate,
    pub revenue_by_room_type: Aggregate,
    pub top_clients: Vec<(String, f64)>,
    pub stay_distribution: Vec<Bin>,
    pub bookings_by_weekday: Aggregate,
    pub top_services: Vec<(String, f64)>,
    /// Services bringing in the most net revenue.
    pub top_services_by_revenue: Vec<(String, f64)>,
    pub payment_methods: Aggregate,
    /// Known payment methods with the fewest rows, fewest first.
    pub least_used_payment_methods: Vec<(String, f64)>,
    pub payment_statuses: Aggregate,
    pub reservation_statuses: Aggregate,
    pub revenue_by_spend_tier: Aggregate,
}

impl BookingReport {
    pub fn build(rows: Vec<Booking>, top_n: usize) -> Self {
        let net = Metric::Sum(BookingMeasure::NetAmount);
        let count = Metric::Count;

        let with_service: Vec<Booking> = rows
            .iter()
            .filter(|b| b.special_service != UNSPECIFIED)
            .cloned()
            .collect();
        let with_method: Vec<Booking> = rows
            .iter()
            .filter(|b| b.payment_method != UNSPECIFIED)
            .cloned()
            .collect();
        let nights: Vec<f64> = rows.iter().map(|b| b.stay_nights as f64).collect();

        Self {
            kpis: BookingKpis::compute(&rows),
            daily_revenue: daily(&rows, net),
            monthly_revenue: aggregate(&rows, BookingDimension::Period, net),
            bookings_by_room_type: aggregate(&rows, BookingDimension::RoomType, count),
            revenue_by_room_type: aggregate(&rows, BookingDimension::RoomType, net),
            top_clients: aggregate(&rows, BookingDimension::ClientName, net).top(top_n),
            stay_distribution: histogram(&nights, DEFAULT_HISTOGRAM_BINS),
            bookings_by_weekday: aggregate(&rows, BookingDimension::Weekday, count),
            top_services: aggregate(&with_service, BookingDimension::SpecialService, count)
                .top(top_n),
            top_services_by_revenue: aggregate(&with_service, BookingDimension::SpecialService, net)
                .top(REVENUE_SERVICES_SHOWN),
            payment_methods: aggregate(&rows, BookingDimension::PaymentMethod, count),
            least_used_payment_methods: aggregate(
                &with_method,
                BookingDimension::PaymentMethod,
                count,
            )
            .bottom(LEAST_USED_PAYMENTS_SHOWN),
            payment_statuses: aggregate(&rows, BookingDimension::PaymentStatus, count),
            reservation_statuses: aggregate(&rows, BookingDimension::Status, count),
            revenue_by_spend_tier: aggregate(&rows, BookingDimension::SpendTier, net),
            rows,
        }
    }

    /// Chart specs for every series in the report.
    pub fn charts(&self) -> Vec<ChartSpec> {
        let top = |title: &str, entries: &[(String, f64)]| {
            let mut spec = ChartSpec::new(ChartKind::Bar, title);
            spec.points = entries
                .iter()
                .map(|(label, value)| ChartPoint {
                    label: label.clone(),
                    value: *value,
                })
                .collect();
            spec
        };

        vec![
            ChartSpec::from_aggregate(ChartKind::Line, "Revenue by day", &self.daily_revenue)
                .labels("Date", "Revenue"),
            ChartSpec::from_aggregate(ChartKind::Bar, "Revenue by month", &self.monthly_revenue)
                .labels("Month", "Revenue"),
            ChartSpec::ranked(
                ChartKind::Bar,
                "Bookings by room type",
                &self.bookings_by_room_type,
                None,
            )
            .labels("Room type", "Bookings"),
            ChartSpec::ranked(ChartKind::Pie, "Revenue by room type", &self.revenue_by_room_type, None),
            top("Top clients", &self.top_clients).labels("Client", "Net spend"),
            ChartSpec::histogram("Stay length", &self.stay_distribution)
                .labels("Nights", "Bookings"),
            ChartSpec::from_aggregate(
                ChartKind::Bar,
                "Bookings by weekday",
                &self.bookings_by_weekday,
            ),
            top("Most booked services", &self.top_services).labels("Service", "Bookings"),
            top("Most profitable services", &self.top_services_by_revenue)
                .labels("Service", "Net revenue"),
            ChartSpec::ranked(ChartKind::Pie, "Payment methods", &self.payment_methods, None),
            top("Least used payment methods", &self.least_used_payment_methods)
                .labels("Payment method", "Bookings"),
            ChartSpec::ranked(ChartKind::Pie, "Payment status", &self.payment_statuses, None),
            ChartSpec::ranked(
                ChartKind::Bar,
                "Reservation status",
                &self.reservation_statuses,
                None,
            ),
            ChartSpec::ranked(
                ChartKind::Bar,
                "Revenue by spend tier",
                &self.revenue_by_spend_tier,
                None,
            ),
        ]
    }
}

/// Filter cleaned bookings and build the report, or say why there is none.
pub fn booking_report(
    rows: &[Booking],
    criteria: &FilterCriteria<BookingDimension>,
    top_n: usize,
) -> Outcome<BookingReport> {
    if rows.is_empty() {
        return Outcome::NoData(NoData::NothingLoaded);
    }
    let filtered = filter(rows, criteria);
    if filtered.is_empty() {
        return Outcome::NoData(NoData::NothingMatched);
    }
    Outcome::Ready(BookingReport::build(filtered, top_n))
}

// ---------------------------------------------------------------------------
// Visits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitReport {
    pub rows: Vec<Visit>,
    pub kpis: VisitKpis,
    pub kilograms_by_neighborhood: Aggregate,
    pub kilograms_by_collector: Aggregate,
    pub visits_by_collector: Aggregate,
    pub kilograms_by_material: Aggregate,
    pub daily_kilograms: Aggregate,
    pub daily_visits: Aggregate,
}

impl VisitReport {
    pub fn build(rows: Vec<Visit>) -> Self {
        let kg = Metric::Sum(VisitMeasure::Kilograms);
        Self {
            kpis: VisitKpis::compute(&rows),
            kilograms_by_neighborhood: aggregate(&rows, VisitDimension::Neighborhood, kg),
            kilograms_by_collector: aggregate(&rows, VisitDimension::Collector, kg),
            visits_by_collector: aggregate(&rows, VisitDimension::Collector, Metric::Count),
            kilograms_by_material: aggregate(&rows, VisitDimension::Material, kg),
            daily_kilograms: daily(&rows, kg),
            daily_visits: daily(&rows, Metric::Count),
            rows,
        }
    }

    pub fn charts(&self) -> Vec<ChartSpec> {
        vec![
            ChartSpec::ranked(
                ChartKind::Bar,
                "Kilograms by neighborhood",
                &self.kilograms_by_neighborhood,
                None,
            )
            .labels("Neighborhood", "Kilograms"),
            ChartSpec::ranked(
                ChartKind::Pie,
                "Kilograms by collector",
                &self.kilograms_by_collector,
                None,
            ),
            ChartSpec::ranked(
                ChartKind::Bar,
                "Kilograms by material",
                &self.kilograms_by_material,
                None,
            ),
            ChartSpec::from_aggregate(ChartKind::Line, "Kilograms by day", &self.daily_kilograms)
                .labels("Date", "Kilograms"),
            ChartSpec::from_aggregate(ChartKind::Line, "Visits by day", &self.daily_visits)
                .labels("Date", "Visits"),
        ]
    }
}

pub fn visit_report(rows: &[Visit], criteria: &FilterCriteria<VisitDimension>) -> Outcome<VisitReport> {
    if rows.is_empty() {
        return Outcome::NoData(NoData::NothingLoaded);
    }
    let filtered = filter(rows, criteria);
    if filtered.is_empty() {
        return Outcome::NoData(NoData::NothingMatched);
    }
    Outcome::Ready(VisitReport::build(filtered))
}
