//! CSV export and chart spec tests.

use booking_dashboard::aggregate::{aggregate, histogram, Metric};
use booking_dashboard::chart::{ChartKind, ChartSpec};
use booking_dashboard::clean::{clean_booking, clean_visit};
use booking_dashboard::export::{
    booking_columns_csv, bookings_csv, valid_booking_columns, visits_csv, BOOKING_EXPORT_COLUMNS,
};
use booking_dashboard::DashboardError;
use booking_dashboard::models::{BookingDimension, BookingRow, VisitRow};

fn sample_booking() -> BookingRow {
    BookingRow {
        reservation_id: Some(1),
        reservation_date: Some("2024-01-05".into()),
        amount: Some(300.0),
        status: Some("confirmed".into()),
        client_name: Some("Lopez, Ana".into()),
        room_type: Some("Double".into()),
        check_in: Some("2024-01-10".into()),
        check_out: Some("2024-01-13".into()),
        payment_status: Some("paid".into()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[test]
fn booking_csv_has_header_and_rows() {
    let rows = vec![clean_booking(&sample_booking())];
    let text = String::from_utf8(bookings_csv(&rows).unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "reservation_id,reservation_date,client_name,room_type,check_in,check_out,stay_nights,net_amount,status,payment_status"
    );
    assert_eq!(
        lines[1],
        "1,2024-01-05,\"Lopez, Ana\",Double,2024-01-10,2024-01-13,3,300.0,confirmed,paid"
    );
    assert_eq!(lines.len(), 2);
}

#[test]
fn empty_export_still_has_header() {
    let text = String::from_utf8(bookings_csv(&[]).unwrap()).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("reservation_id,"));
}

#[test]
fn selected_columns_keep_order_and_drop_unknown_names() {
    let rows = vec![clean_booking(&sample_booking())];
    let selected = ["status", "no_such_column", "net_amount", "client_name", "reservation_id"];

    let text = String::from_utf8(booking_columns_csv(&rows, &selected).unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "status,net_amount,client_name,reservation_id");
    assert_eq!(lines[1], "confirmed,300.0,\"Lopez, Ana\",1");
    assert_eq!(lines.len(), 2);
}

#[test]
fn selected_columns_cover_every_export_column() {
    let rows = vec![clean_booking(&BookingRow::default())];
    let text = String::from_utf8(booking_columns_csv(&rows, &BOOKING_EXPORT_COLUMNS).unwrap())
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], BOOKING_EXPORT_COLUMNS.join(","));
    assert_eq!(
        lines[1],
        ",,unspecified,unspecified,,,0,0.0,unspecified,unspecified,unspecified,unspecified"
    );
}

#[test]
fn no_valid_column_is_an_error() {
    assert!(valid_booking_columns(&["bogus"]).is_empty());
    assert_eq!(
        valid_booking_columns(&["location", "bogus", "check_in"]),
        vec!["location", "check_in"]
    );

    let err = booking_columns_csv(&[], &["bogus"]).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidArgument(_)));

    let empty: [&str; 0] = [];
    assert!(booking_columns_csv(&[], &empty).is_err());
}

#[test]
fn missing_values_export_as_empty_fields() {
    let rows = vec![clean_booking(&BookingRow::default())];
    let text = String::from_utf8(bookings_csv(&rows).unwrap()).unwrap();
    let fields: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();

    assert_eq!(fields[0], "");
    assert_eq!(fields[1], "");
    assert_eq!(fields[2], "unspecified");
}

#[test]
fn visit_csv_writes_completed_flag() {
    let rows = vec![clean_visit(&VisitRow {
        visit_date: Some("2024-05-01".into()),
        kilograms: Some(12.5),
        completed: Some("Si".into()),
        route_name: Some("Route A".into()),
        neighborhood: Some("Centro".into()),
        collector: Some("Luis Paz".into()),
        ..Default::default()
    })];
    let text = String::from_utf8(visits_csv(&rows).unwrap()).unwrap();

    assert_eq!(
        text,
        "visit_date,neighborhood,route_name,collector,kilograms,completed\n\
         2024-05-01,Centro,Route A,Luis Paz,12.5,yes\n"
    );
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[test]
fn ranked_chart_sorts_and_limits() {
    let rows: Vec<_> = [("Single", 2), ("Suite", 5), ("Double", 3)]
        .iter()
        .flat_map(|(room, n)| {
            std::iter::repeat(clean_booking(&BookingRow {
                room_type: Some(room.to_string()),
                ..Default::default()
            }))
            .take(*n)
        })
        .collect();
    let agg = aggregate(&rows, BookingDimension::RoomType, Metric::Count);

    let spec = ChartSpec::ranked(ChartKind::Bar, "Bookings by room type", &agg, Some(2));
    let labels: Vec<&str> = spec.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Suite", "Double"]);

    let json: serde_json::Value = serde_json::from_str(&spec.to_json().unwrap()).unwrap();
    assert_eq!(json["kind"], "bar");
    assert_eq!(json["points"][0]["value"], 5.0);
}

#[test]
fn histogram_chart_labels_bin_edges() {
    let spec = ChartSpec::histogram("Stay length", &histogram(&[0.0, 3.0, 6.0], 2));
    let labels: Vec<&str> = spec.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["0-3", "3-6"]);
    assert_eq!(spec.kind, ChartKind::Histogram);
}

#[test]
fn chart_of_empty_aggregate_is_empty() {
    let agg = aggregate(
        &[] as &[booking_dashboard::models::Booking],
        BookingDimension::Status,
        Metric::Count,
    );
    assert!(ChartSpec::from_aggregate(ChartKind::Pie, "Status", &agg).is_empty());
}
