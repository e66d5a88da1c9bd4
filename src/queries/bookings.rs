//! Booking loader: the reservation join that feeds every booking dashboard.

use std::cell::RefCell;

use chrono::NaiveDate;
use log::{debug, warn};

use crate::cache::QueryCache;
use crate::clean::{clean_bookings, parse_date};
use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::filter::DateRange;
use crate::models::{Booking, BookingRow};
use crate::sql_builder::SqlBuilder;

/// Cache of loaded booking rows, keyed by the load parameters.
pub type BookingCache = QueryCache<LoadBookingsParams, Vec<BookingRow>>;

// ---------------------------------------------------------------------------
// LoadBookingsParams
// ---------------------------------------------------------------------------

/// Arguments of one booking load. Also the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadBookingsParams {
    /// Only reservations made on or after this day.
    pub date_from: Option<NaiveDate>,
    /// Only reservations made on or before this day.
    pub date_to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// BookingQuery
// ---------------------------------------------------------------------------

/// Query interface for reservations and everything joined to them.
pub struct BookingQuery<'a> {
    conn: &'a Connection,
    cache: Option<&'a RefCell<BookingCache>>,
}

impl<'a> BookingQuery<'a> {
    /// Create an uncached `BookingQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, cache: None }
    }

    /// Create a `BookingQuery` that serves repeated loads from `cache`.
    pub fn with_cache(conn: &'a Connection, cache: &'a RefCell<BookingCache>) -> Self {
        Self {
            conn,
            cache: Some(cache),
        }
    }

    /// Build the reservation join for `params`.
    ///
    /// One row per reservation × room detail × special service × payment.
    pub fn sql(params: &LoadBookingsParams) -> (String, Vec<String>) {
        let payment_method = payment_method_case("pm.name");
        let mut qb = SqlBuilder::new("reservation r");
        qb.select(&[
            "r.reservation_id",
            "r.reservation_date",
            "r.amount",
            "r.status",
            "r.location",
            "c.client_id",
            "concat_ws(' ', c.first_name, c.last_name, c.second_last_name) AS client_name",
            "d.check_in",
            "d.check_out",
            "d.guests",
            "h.room_id",
            "h.room_number",
            "rt.description AS room_type",
            "h.nightly_rate",
            "s.name AS special_service",
            "s.price AS service_price",
            "p.payment_id",
            "p.amount AS payment_amount",
            "p.status AS payment_status",
            "p.payment_date",
            payment_method.as_str(),
            "i.discount AS invoice_discount",
            "pr.code AS promotion_code",
            "pr.discount_percent",
        ])
        .join("LEFT JOIN client c ON r.client_id = c.client_id")
        .join("LEFT JOIN reservation_detail d ON r.reservation_id = d.reservation_id")
        .join("LEFT JOIN room h ON d.room_id = h.room_id")
        .join("LEFT JOIN room_type rt ON h.room_type_id = rt.room_type_id")
        .join("LEFT JOIN reservation_detail_service ds ON d.detail_id = ds.detail_id")
        .join("LEFT JOIN special_service s ON ds.service_id = s.service_id")
        .join("LEFT JOIN payment p ON r.reservation_id = p.reservation_id")
        .join("LEFT JOIN payment_detail pd ON p.payment_detail_id = pd.payment_detail_id")
        .join("LEFT JOIN payment_method pm ON pd.payment_method_id = pm.payment_method_id")
        .join("LEFT JOIN invoice i ON p.invoice_id = i.invoice_id")
        .join("LEFT JOIN promotion pr ON pr.invoice_id = i.invoice_id")
        .order_by(&["r.reservation_date DESC", "r.reservation_id"]);

        if let Some(from) = params.date_from {
            qb.where_date_gte("r.reservation_date", &from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = params.date_to {
            qb.where_date_lte("r.reservation_date", &to.format("%Y-%m-%d").to_string());
        }
        if let Some(n) = params.limit {
            qb.limit(n);
        }
        qb.build()
    }

    /// Load raw booking rows, from the cache when a fresh copy is there.
    pub fn load(&self, params: &LoadBookingsParams) -> Result<Vec<BookingRow>> {
        match self.cache {
            Some(cache) => cache
                .borrow_mut()
                .get_or_try_insert_with(params, || self.fetch(params)),
            None => self.fetch(params),
        }
    }

    /// Load and clean booking rows.
    pub fn load_clean(&self, params: &LoadBookingsParams) -> Result<Vec<Booking>> {
        Ok(clean_bookings(&self.load(params)?))
    }

    /// First and last reservation dates in the database, or `None` if there
    /// are no dated reservations.
    pub fn date_bounds(&self) -> Result<Option<DateRange>> {
        let rows = self.conn.execute(
            "SELECT MIN(reservation_date) AS first_day, MAX(reservation_date) AS last_day \
             FROM reservation",
            &[],
        )?;
        Ok(rows.into_iter().next().and_then(|row| {
            let day = |key: &str| {
                row.get(key)
                    .and_then(|v| v.as_str())
                    .and_then(parse_date)
            };
            Some(DateRange::new(day("first_day")?, day("last_day")?))
        }))
    }

    fn fetch(&self, params: &LoadBookingsParams) -> Result<Vec<BookingRow>> {
        let (sql, args) = Self::sql(params);
        match self.conn.execute_into::<BookingRow>(&sql, &args) {
            Ok(rows) => {
                debug!("loaded {} booking rows for {:?}", rows.len(), params);
                Ok(rows)
            }
            Err(e) => {
                let tables = self.conn.tables().unwrap_or_default();
                warn!("booking query failed: {}; tables present: {:?}", e, tables);
                Err(e)
            }
        }
    }
}

/// SQL CASE expression mapping raw payment-method names to dashboard groups.
fn payment_method_case(column: &str) -> String {
    let arms: String = config::payment_method_groups()
        .iter()
        .map(|(raw, group)| format!(" WHEN LOWER({}) = '{}' THEN '{}'", column, raw, group))
        .collect();
    format!("CASE{} ELSE {} END AS payment_method", arms, column)
}
