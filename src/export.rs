//! CSV downloads of the filtered rows.
//!
//! Output is UTF-8 with a header row followed by one comma-separated line per
//! row. The header is written even when there are no rows.

use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

use crate::error::{DashboardError, Result};
use crate::models::{Booking, Visit};

/// Columns a user can pick for a booking download, in display order.
pub const BOOKING_EXPORT_COLUMNS: [&str; 12] = [
    "reservation_id",
    "reservation_date",
    "client_name",
    "room_type",
    "check_in",
    "check_out",
    "stay_nights",
    "net_amount",
    "status",
    "payment_method",
    "special_service",
    "location",
];

const BOOKING_COLUMNS: [&str; 10] = [
    "reservation_id",
    "reservation_date",
    "client_name",
    "room_type",
    "check_in",
    "check_out",
    "stay_nights",
    "net_amount",
    "status",
    "payment_status",
];

const VISIT_COLUMNS: [&str; 6] = [
    "visit_date",
    "neighborhood",
    "route_name",
    "collector",
    "kilograms",
    "completed",
];

#[derive(Serialize)]
struct BookingLine<'a> {
    reservation_id: Option<i64>,
    reservation_date: Option<NaiveDate>,
    client_name: &'a str,
    room_type: &'a str,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    stay_nights: i64,
    net_amount: f64,
    status: &'a str,
    payment_status: &'a str,
}

#[derive(Serialize)]
struct VisitLine<'a> {
    visit_date: Option<NaiveDate>,
    neighborhood: &'a str,
    route_name: &'a str,
    collector: &'a str,
    kilograms: f64,
    completed: &'a str,
}

fn write_csv<W, T, I>(writer: W, header: &[&str], lines: I) -> Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for line in lines {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the booking export to `writer`.
pub fn write_bookings<W: Write>(writer: W, rows: &[Booking]) -> Result<()> {
    write_csv(
        writer,
        &BOOKING_COLUMNS,
        rows.iter().map(|b| BookingLine {
            reservation_id: b.reservation_id,
            reservation_date: b.reservation_date,
            client_name: &b.client_name,
            room_type: &b.room_type,
            check_in: b.check_in,
            check_out: b.check_out,
            stay_nights: b.stay_nights,
            net_amount: b.net_amount,
            status: &b.status,
            payment_status: &b.payment_status,
        }),
    )
}

/// The booking export as bytes, ready for a download button.
pub fn bookings_csv(rows: &[Booking]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_bookings(&mut buf, rows)?;
    Ok(buf)
}

/// One field of a column-selected export line.
#[derive(Serialize)]
#[serde(untagged)]
enum Cell<'a> {
    Id(Option<i64>),
    Date(Option<NaiveDate>),
    Text(&'a str),
    Nights(i64),
    Amount(f64),
}

fn booking_cell<'a>(b: &'a Booking, column: &str) -> Option<Cell<'a>> {
    let cell = match column {
        "reservation_id" => Cell::Id(b.reservation_id),
        "reservation_date" => Cell::Date(b.reservation_date),
        "client_name" => Cell::Text(&b.client_name),
        "room_type" => Cell::Text(&b.room_type),
        "check_in" => Cell::Date(b.check_in),
        "check_out" => Cell::Date(b.check_out),
        "stay_nights" => Cell::Nights(b.stay_nights),
        "net_amount" => Cell::Amount(b.net_amount),
        "status" => Cell::Text(&b.status),
        "payment_method" => Cell::Text(&b.payment_method),
        "special_service" => Cell::Text(&b.special_service),
        "location" => Cell::Text(&b.location),
        _ => return None,
    };
    Some(cell)
}

/// The selected names that are export columns, in the order given.
/// Unknown names are dropped.
pub fn valid_booking_columns<S: AsRef<str>>(selected: &[S]) -> Vec<&'static str> {
    selected
        .iter()
        .filter_map(|name| {
            BOOKING_EXPORT_COLUMNS
                .iter()
                .copied()
                .find(|c| *c == name.as_ref())
        })
        .collect()
}

/// Write only the `selected` booking columns, in the order given.
///
/// Names that are not in [`BOOKING_EXPORT_COLUMNS`] are skipped. Fails with
/// [`DashboardError::InvalidArgument`] when no selected name is valid.
pub fn write_booking_columns<W, S>(writer: W, rows: &[Booking], selected: &[S]) -> Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    let columns = valid_booking_columns(selected);
    if columns.is_empty() {
        return Err(DashboardError::InvalidArgument(
            "No valid columns selected for export".into(),
        ));
    }
    write_csv(
        writer,
        &columns,
        rows.iter().map(|b| {
            columns
                .iter()
                .filter_map(|c| booking_cell(b, c))
                .collect::<Vec<_>>()
        }),
    )
}

pub fn booking_columns_csv<S: AsRef<str>>(rows: &[Booking], selected: &[S]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_booking_columns(&mut buf, rows, selected)?;
    Ok(buf)
}

pub fn write_visits<W: Write>(writer: W, rows: &[Visit]) -> Result<()> {
    write_csv(
        writer,
        &VISIT_COLUMNS,
        rows.iter().map(|v| VisitLine {
            visit_date: v.visit_date,
            neighborhood: &v.neighborhood,
            route_name: &v.route_name,
            collector: &v.collector,
            kilograms: v.kilograms,
            completed: if v.completed { "yes" } else { "no" },
        }),
    )
}

pub fn visits_csv(rows: &[Visit]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_visits(&mut buf, rows)?;
    Ok(buf)
}
