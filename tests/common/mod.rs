//! Shared test fixtures for the dashboard integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with a small hotel schema (reservations, clients, rooms,
//! services, payments, invoices, promotions) and a small recycling schema
//! (visits, routes, neighborhoods, collectors) via NDJSON temp files.
//!
//! The booking join over this data yields one row per reservation:
//!
//! | id | date       | status    | client          | room   | nights | net   |
//! |----|------------|-----------|-----------------|--------|--------|-------|
//! | 4  | 2024-03-02 | pending   | Ana Lopez Diaz  | Single | 0      | 80    |
//! | 3  | 2024-02-10 | cancelled | Carla Mena Vega | Suite  | 2      | 550   |
//! | 2  | 2024-01-20 | confirmed | Bruno Ruiz      | Single | 2      | 140   |
//! | 1  | 2024-01-05 | confirmed | Ana Lopez Diaz  | Double | 3      | 290   |

#![allow(dead_code)]

use booking_dashboard::models::BookingRow;
use booking_dashboard::{Connection, Dashboard};
use proptest::prelude::*;
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const TOTAL_NET: f64 = 1060.0;

/// Create an in-memory `Connection` with every sample table loaded.
pub fn setup_sample_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();

    // -- hotel schema ---------------------------------------------------------
    register_clients(&conn);
    register_reservations(&conn);
    register_rooms(&conn);
    register_details(&conn);
    register_services(&conn);
    register_payments(&conn);

    // -- recycling schema -----------------------------------------------------
    register_visits(&conn);

    conn
}

/// A `Dashboard` over the sample database with a long cache TTL.
pub fn setup_sample_dashboard() -> Dashboard {
    Dashboard::with_connection(setup_sample_db(), Duration::from_secs(600))
}

fn register_clients(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "client",
        &[
            json!({"client_id": 1, "first_name": "Ana", "last_name": "Lopez", "second_last_name": "Diaz"}),
            json!({"client_id": 2, "first_name": "Bruno", "last_name": "Ruiz", "second_last_name": null}),
            json!({"client_id": 3, "first_name": "Carla", "last_name": "Mena", "second_last_name": "Vega"}),
        ],
    );
}

fn register_reservations(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "reservation",
        &[
            json!({"reservation_id": 1, "client_id": 1, "reservation_date": "2024-01-05", "amount": 300.0, "status": "confirmed", "location": "Lima"}),
            json!({"reservation_id": 2, "client_id": 2, "reservation_date": "2024-01-20", "amount": 150.0, "status": "confirmed", "location": "Cusco"}),
            json!({"reservation_id": 3, "client_id": 3, "reservation_date": "2024-02-10", "amount": 500.0, "status": "cancelled", "location": "Lima"}),
            json!({"reservation_id": 4, "client_id": 1, "reservation_date": "2024-03-02", "amount": 80.0, "status": "pending", "location": "Cusco"}),
        ],
    );
}

fn register_rooms(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "room_type",
        &[
            json!({"room_type_id": 1, "description": "Single"}),
            json!({"room_type_id": 2, "description": "Double"}),
            json!({"room_type_id": 3, "description": "Suite"}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "room",
        &[
            json!({"room_id": 1, "room_number": "101", "room_type_id": 1, "nightly_rate": 80.0}),
            json!({"room_id": 2, "room_number": "201", "room_type_id": 2, "nightly_rate": 120.0}),
            json!({"room_id": 3, "room_number": "301", "room_type_id": 3, "nightly_rate": 250.0}),
        ],
    );
}

fn register_details(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "reservation_detail",
        &[
            json!({"detail_id": 1, "reservation_id": 1, "room_id": 2, "guests": 2, "check_in": "2024-01-10", "check_out": "2024-01-13"}),
            json!({"detail_id": 2, "reservation_id": 2, "room_id": 1, "guests": 1, "check_in": "2024-01-25", "check_out": "2024-01-27"}),
            json!({"detail_id": 3, "reservation_id": 3, "room_id": 3, "guests": 2, "check_in": "2024-02-14", "check_out": "2024-02-16"}),
            json!({"detail_id": 4, "reservation_id": 4, "room_id": 1, "guests": 1, "check_in": "2024-03-05", "check_out": null}),
        ],
    );
}

fn register_services(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "special_service",
        &[
            json!({"service_id": 1, "name": "Breakfast", "price": 20.0}),
            json!({"service_id": 2, "name": "Spa", "price": 50.0}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "reservation_detail_service",
        &[
            json!({"detail_id": 1, "service_id": 1}),
            json!({"detail_id": 3, "service_id": 2}),
        ],
    );
}

fn register_payments(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "payment_method",
        &[
            json!({"payment_method_id": 1, "name": "Credit Card"}),
            json!({"payment_method_id": 2, "name": "Cash"}),
            json!({"payment_method_id": 3, "name": "PayPal"}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "payment_detail",
        &[
            json!({"payment_detail_id": 1, "payment_method_id": 1}),
            json!({"payment_detail_id": 2, "payment_method_id": 2}),
            json!({"payment_detail_id": 3, "payment_method_id": 3}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "invoice",
        &[
            json!({"invoice_id": 1, "discount": 0.0}),
            json!({"invoice_id": 2, "discount": 10.0}),
            json!({"invoice_id": 3, "discount": 0.0}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "promotion",
        &[
            json!({"promotion_id": 1, "invoice_id": 1, "code": "WINTER10", "discount_percent": 10.0}),
        ],
    );
    // Reservation 3 was cancelled before paying.
    write_ndjson_and_register(
        conn,
        "payment",
        &[
            json!({"payment_id": 1, "reservation_id": 1, "amount": 320.0, "status": "paid", "payment_date": "2024-01-05", "payment_detail_id": 1, "invoice_id": 1}),
            json!({"payment_id": 2, "reservation_id": 2, "amount": 140.0, "status": "paid", "payment_date": "2024-01-21", "payment_detail_id": 2, "invoice_id": 2}),
            json!({"payment_id": 3, "reservation_id": 4, "amount": 80.0, "status": "pending", "payment_date": "2024-03-02", "payment_detail_id": 3, "invoice_id": 3}),
        ],
    );
}

fn register_visits(conn: &Connection) {
    write_ndjson_and_register(
        conn,
        "neighborhood",
        &[
            json!({"neighborhood_id": 1, "name": "Centro"}),
            json!({"neighborhood_id": 2, "name": "Norte"}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "collector",
        &[
            json!({"collector_id": 1, "full_name": "Luis Paz"}),
            json!({"collector_id": 2, "full_name": "Marta Rios"}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "route",
        &[
            json!({"route_id": 1, "route_name": "Route A", "material": "plastic", "neighborhood_id": 1}),
            json!({"route_id": 2, "route_name": "Route B", "material": "glass", "neighborhood_id": 2}),
            json!({"route_id": 3, "route_name": "Route C", "material": "paper", "neighborhood_id": 2}),
        ],
    );
    write_ndjson_and_register(
        conn,
        "visit",
        &[
            json!({"visit_id": 1, "visit_date": "2024-05-01", "kilograms": 12.5, "completed": "Si", "route_id": 1, "collector_id": 1}),
            json!({"visit_id": 2, "visit_date": "2024-05-01", "kilograms": 7.5, "completed": "No", "route_id": 2, "collector_id": 2}),
            json!({"visit_id": 3, "visit_date": "2024-05-03", "kilograms": 20.0, "completed": "Si", "route_id": 2, "collector_id": 1}),
            json!({"visit_id": 4, "visit_date": "2024-05-04", "kilograms": 10.0, "completed": "yes", "route_id": 3, "collector_id": 1}),
        ],
    );
}

/// Write rows as NDJSON to a temp file and register them as a DuckDB table.
pub fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
}

// ---------------------------------------------------------------------------
// Generated rows
// ---------------------------------------------------------------------------

/// Date text as the loader may return it: ISO days, timestamps, blanks and
/// garbage.
fn date_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => (2023i32..=2025, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| Some(format!("{y:04}-{m:02}-{d:02}"))),
        1 => (2023i32..=2025, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| Some(format!("{y:04}-{m:02}-{d:02} 10:30:00"))),
        1 => Just(None),
        1 => Just(Some("not a date".to_string())),
    ]
}

fn category(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        6 => proptest::sample::select(values).prop_map(|v| Some(v.to_string())),
        1 => Just(None),
        1 => Just(Some("   ".to_string())),
    ]
}

/// Raw booking join rows with the gaps the cleaner has to fill.
pub fn booking_row() -> impl Strategy<Value = BookingRow> {
    (
        (
            proptest::option::of(1i64..50),
            date_text(),
            proptest::option::of(0u32..2000),
            category(&["confirmed", "cancelled", "pending"]),
            category(&["Single", "Double", "Suite"]),
        ),
        (
            date_text(),
            date_text(),
            category(&["Breakfast", "Spa"]),
            proptest::option::of(0u32..100),
            proptest::option::of(0u32..30),
        ),
    )
        .prop_map(
            |(
                (reservation_id, reservation_date, amount, status, room_type),
                (check_in, check_out, special_service, service_price, discount_percent),
            )| BookingRow {
                reservation_id,
                reservation_date,
                amount: amount.map(f64::from),
                status,
                room_type,
                check_in,
                check_out,
                special_service,
                service_price: service_price.map(f64::from),
                discount_percent: discount_percent.map(f64::from),
                ..Default::default()
            },
        )
}

pub fn booking_rows(max: usize) -> impl Strategy<Value = Vec<BookingRow>> {
    proptest::collection::vec(booking_row(), 0..max)
}
