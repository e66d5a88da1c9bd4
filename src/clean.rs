//! Turns raw loader rows into cleaned records.
//!
//! Cleaning never fails. Missing text becomes
//! [`UNSPECIFIED`](crate::config::UNSPECIFIED), missing numbers become zero and
//! dates that cannot be parsed become `None`. Cleaning a record that was
//! turned back into a raw row (`Booking::to_row`) gives the same record.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::config::{SPEND_TIER_BOUNDS, TOP_SPEND_TIER, UNSPECIFIED};
use crate::models::{Booking, BookingRow, Visit, VisitRow};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a date or date-time string, keeping only the day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn date_of(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref().and_then(parse_date)
}

/// Trimmed text, or the sentinel when blank or missing.
pub fn fill_text(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNSPECIFIED.to_string(),
    }
}

fn num(raw: Option<f64>) -> f64 {
    raw.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Whole nights between two dates; 0 if either is missing or they are
/// reversed.
pub fn stay_nights(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> i64 {
    match (check_in, check_out) {
        (Some(start), Some(end)) => (end - start).num_days().max(0),
        _ => 0,
    }
}

/// Amount after the invoice discount and promotion percentage, plus the
/// special-service surcharge.
///
/// This is the one formula used for net amounts everywhere; with no
/// discount or surcharge it is the base amount.
pub fn net_amount(
    amount: f64,
    invoice_discount: f64,
    discount_percent: f64,
    service_price: f64,
) -> f64 {
    amount - invoice_discount - amount * discount_percent / 100.0 + service_price
}

/// Spend tier label for a net amount. Non-positive amounts have no tier.
pub fn spend_tier(net: f64) -> &'static str {
    if net <= 0.0 {
        return UNSPECIFIED;
    }
    SPEND_TIER_BOUNDS
        .iter()
        .find(|(bound, _)| net <= *bound)
        .map(|(_, label)| *label)
        .unwrap_or(TOP_SPEND_TIER)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn period_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_lowercase()).as_deref(),
        Some("si" | "sí" | "s" | "yes" | "y" | "true" | "1")
    )
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

pub fn clean_booking(row: &BookingRow) -> Booking {
    let reservation_date = date_of(&row.reservation_date);
    let check_in = date_of(&row.check_in);
    let check_out = date_of(&row.check_out);

    let amount = num(row.amount);
    let invoice_discount = num(row.invoice_discount);
    let discount_percent = num(row.discount_percent);
    let service_price = num(row.service_price);

    let nights = stay_nights(check_in, check_out);
    let net = net_amount(amount, invoice_discount, discount_percent, service_price);

    Booking {
        reservation_id: row.reservation_id,
        reservation_date,
        amount,
        status: fill_text(row.status.as_deref()),
        location: fill_text(row.location.as_deref()),
        client_id: row.client_id,
        client_name: fill_text(row.client_name.as_deref()),
        check_in,
        check_out,
        guests: num(row.guests),
        room_id: row.room_id,
        room_number: fill_text(row.room_number.as_deref()),
        room_type: fill_text(row.room_type.as_deref()),
        nightly_rate: num(row.nightly_rate),
        special_service: fill_text(row.special_service.as_deref()),
        service_price,
        payment_id: row.payment_id,
        payment_amount: num(row.payment_amount),
        payment_status: fill_text(row.payment_status.as_deref()),
        payment_date: date_of(&row.payment_date),
        payment_method: fill_text(row.payment_method.as_deref()),
        invoice_discount,
        promotion_code: fill_text(row.promotion_code.as_deref()),
        discount_percent,
        stay_nights: nights,
        year: reservation_date.map(|d| d.year()),
        month: reservation_date.map(|d| d.month()),
        day: reservation_date.map(|d| d.day()),
        period: reservation_date.map(period_label),
        weekday: reservation_date.map(|d| weekday_name(d.weekday()).to_string()),
        iso_week: reservation_date.map(|d| d.iso_week().week()),
        net_amount: net,
        revenue_per_night: net / nights.max(1) as f64,
        spend_tier: spend_tier(net).to_string(),
    }
}

pub fn clean_bookings(rows: &[BookingRow]) -> Vec<Booking> {
    rows.iter().map(clean_booking).collect()
}

// ---------------------------------------------------------------------------
// Visits
// ---------------------------------------------------------------------------

pub fn clean_visit(row: &VisitRow) -> Visit {
    let visit_date = date_of(&row.visit_date);
    Visit {
        visit_date,
        kilograms: num(row.kilograms),
        completed: parse_flag(row.completed.as_deref()),
        route_name: fill_text(row.route_name.as_deref()),
        material: fill_text(row.material.as_deref()),
        neighborhood: fill_text(row.neighborhood.as_deref()),
        collector: fill_text(row.collector.as_deref()),
        period: visit_date.map(period_label),
        weekday: visit_date.map(|d| weekday_name(d.weekday()).to_string()),
    }
}

pub fn clean_visits(rows: &[VisitRow]) -> Vec<Visit> {
    rows.iter().map(clean_visit).collect()
}
