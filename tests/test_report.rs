//! End-to-end passes through the `Dashboard` facade.

mod common;

use booking_dashboard::models::{BookingDimension, VisitDimension};
use booking_dashboard::queries::LoadVisitsParams;
use booking_dashboard::report::booking_report;
use booking_dashboard::{
    BookingPass, Dashboard, DashboardError, FilterCriteria, NoData, Outcome, VisitPass,
};
use chrono::NaiveDate;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Booking passes
// ---------------------------------------------------------------------------

#[test]
fn unfiltered_booking_pass_reports_everything() {
    let dashboard = common::setup_sample_dashboard();
    let report = dashboard
        .booking_pass(&BookingPass::default())
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.kpis.total_revenue, common::TOTAL_NET);
    assert_eq!(report.kpis.reservations, 4);
    assert_eq!(report.kpis.clients, 3);
    assert_eq!(report.kpis.services_used, 2);
    assert_eq!(report.kpis.average_stay, 7.0 / 4.0);

    assert_eq!(report.revenue_by_room_type.get("Suite"), Some(550.0));
    assert_eq!(report.revenue_by_room_type.get("Single"), Some(220.0));
    assert_eq!(report.top_clients[0], ("Carla Mena Vega".to_string(), 550.0));
    assert_eq!(report.top_services.len(), 2);
    assert_eq!(report.payment_methods.get("CARD"), Some(1.0));
    assert_eq!(report.revenue_by_spend_tier.get("economy"), Some(220.0));
    assert_eq!(report.monthly_revenue.get("2024-01"), Some(430.0));
    assert_eq!(report.daily_revenue.len(), 4);
}

#[test]
fn booking_pass_reports_rates_growth_and_rankings() {
    let dashboard = common::setup_sample_dashboard();
    let report = dashboard
        .booking_pass(&BookingPass::default())
        .unwrap()
        .ready()
        .unwrap();

    let kpis = &report.kpis;
    assert_eq!(kpis.confirmation_rate, 50.0);
    assert_eq!(kpis.cancellation_rate, 25.0);
    assert_eq!(kpis.nights_booked, 7);
    assert_eq!(kpis.monthly_growth, Some((80.0 - 430.0) / 430.0 * 100.0));

    assert_eq!(
        report.top_services_by_revenue,
        vec![("Spa".to_string(), 550.0), ("Breakfast".to_string(), 290.0)]
    );
    assert_eq!(
        report.least_used_payment_methods,
        vec![("DIGITAL".to_string(), 1.0), ("CASH".to_string(), 1.0)]
    );
}

#[test]
fn single_month_pass_has_no_growth() {
    let dashboard = common::setup_sample_dashboard();
    let mut pass = BookingPass::default();
    pass.criteria = FilterCriteria::new().between(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    );

    let report = dashboard.booking_pass(&pass).unwrap().ready().unwrap();
    assert_eq!(report.kpis.monthly_growth, None);
    assert_eq!(report.kpis.confirmation_rate, 100.0);
    assert_eq!(report.kpis.cancellation_rate, 0.0);
    assert_eq!(
        report.top_services_by_revenue,
        vec![("Breakfast".to_string(), 290.0)]
    );
}

#[test]
fn rankings_leave_out_unspecified_values() {
    let dashboard = common::setup_sample_dashboard();
    let mut pass = BookingPass::default();
    pass.criteria = FilterCriteria::new().only(BookingDimension::Status, ["cancelled"]);

    let report = dashboard.booking_pass(&pass).unwrap().ready().unwrap();
    assert_eq!(report.payment_methods.get("unspecified"), Some(1.0));
    assert!(report.least_used_payment_methods.is_empty());
    assert_eq!(report.kpis.cancellation_rate, 100.0);
}

#[test]
fn filtered_booking_pass_keeps_matching_rows() {
    let dashboard = common::setup_sample_dashboard();
    let mut pass = BookingPass::default();
    pass.criteria = FilterCriteria::new()
        .between(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .only(BookingDimension::Status, ["confirmed"]);

    let report = dashboard.booking_pass(&pass).unwrap().ready().unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.reservation_statuses.get("confirmed"), Some(2.0));
    assert_eq!(report.kpis.total_revenue, 430.0);
}

#[test]
fn no_match_is_nothing_matched() {
    let dashboard = common::setup_sample_dashboard();
    let mut pass = BookingPass::default();
    pass.criteria = FilterCriteria::new().only(BookingDimension::Status, ["archived"]);

    let outcome = dashboard.booking_pass(&pass).unwrap();
    assert_eq!(outcome, Outcome::NoData(NoData::NothingMatched));
}

#[test]
fn empty_rows_are_nothing_loaded() {
    let outcome = booking_report(&[], &FilterCriteria::new(), 10);
    assert!(!outcome.is_ready());
    assert_eq!(outcome, Outcome::NoData(NoData::NothingLoaded));
}

#[test]
fn charts_cover_every_series() {
    let dashboard = common::setup_sample_dashboard();
    let report = dashboard
        .booking_pass(&BookingPass::default())
        .unwrap()
        .ready()
        .unwrap();

    let charts = report.charts();
    assert_eq!(charts.len(), 14);
    assert!(charts.iter().all(|c| !c.is_empty()));
    assert!(charts.iter().any(|c| c.title == "Stay length"));
    assert!(charts.iter().any(|c| c.title == "Most profitable services"));
    assert!(charts.iter().any(|c| c.title == "Least used payment methods"));
}

#[test]
fn top_n_limits_rankings() {
    let dashboard = common::setup_sample_dashboard();
    let pass = BookingPass {
        top_n: 1,
        ..Default::default()
    };
    let report = dashboard.booking_pass(&pass).unwrap().ready().unwrap();
    assert_eq!(report.top_clients.len(), 1);
    assert_eq!(report.top_services.len(), 1);
}

// ---------------------------------------------------------------------------
// Visit passes
// ---------------------------------------------------------------------------

#[test]
fn visit_pass_reports_kilograms_and_completion() {
    let dashboard = common::setup_sample_dashboard();
    let report = dashboard
        .visit_pass(&VisitPass::default())
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(report.kpis.total_kilograms, 50.0);
    assert_eq!(report.kpis.completion_rate, 75.0);
    assert_eq!(report.kpis.leading_route, Some(("Route B".to_string(), 2)));
    assert_eq!(report.kpis.top_collector, Some(("Luis Paz".to_string(), 3)));
    assert_eq!(report.kilograms_by_neighborhood.get("Norte"), Some(37.5));
    assert_eq!(report.daily_visits.get("2024-05-01"), Some(2.0));
    assert_eq!(report.charts().len(), 5);
}

#[test]
fn visit_pass_with_pushed_down_and_in_memory_filters() {
    let dashboard = common::setup_sample_dashboard();
    let pass = VisitPass {
        load: LoadVisitsParams {
            neighborhood: Some("Norte".into()),
            ..Default::default()
        },
        criteria: FilterCriteria::new().only(VisitDimension::Material, ["glass"]),
    };
    let report = dashboard.visit_pass(&pass).unwrap().ready().unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.kpis.total_kilograms, 27.5);
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

#[test]
fn passes_reuse_cached_rows_until_refresh() {
    let dashboard = common::setup_sample_dashboard();
    let pass = BookingPass::default();
    assert_eq!(dashboard.booking_pass(&pass).unwrap().ready().unwrap().rows.len(), 4);

    dashboard
        .connection()
        .raw()
        .execute_batch("DELETE FROM reservation")
        .unwrap();
    assert!(dashboard.booking_pass(&pass).unwrap().is_ready());

    dashboard.refresh();
    assert_eq!(
        dashboard.booking_pass(&pass).unwrap(),
        Outcome::NoData(NoData::NothingLoaded)
    );
}

#[test]
fn missing_tables_abort_the_pass() {
    let dashboard = Dashboard::builder().in_memory().build().unwrap();
    let err = dashboard.booking_pass(&BookingPass::default()).unwrap_err();
    assert!(matches!(err, DashboardError::Query(_)));
    assert!(err.user_message().starts_with("The query failed"));
}

#[test]
fn builder_opens_database_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("hotel.duckdb");
    let dashboard = Dashboard::builder()
        .database(&path)
        .cache_ttl(Duration::from_secs(5))
        .build()
        .unwrap();

    assert!(dashboard.tables().unwrap().is_empty());
    let shown = dashboard.to_string();
    assert!(shown.contains("hotel.duckdb"));
    assert!(shown.contains("cache_ttl=5s"));
}

#[test]
fn raw_sql_escape_hatch() {
    let dashboard = common::setup_sample_dashboard();
    let rows = dashboard
        .sql(
            "SELECT COUNT(*) AS n FROM visit WHERE completed = ?",
            &["Si".to_string()],
        )
        .unwrap();
    assert_eq!(rows[0]["n"], 2);
}
