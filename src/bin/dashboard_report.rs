//! Command-line report: runs one booking or route-visit pass against a
//! DuckDB file and prints its KPIs and leading categories.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use log::info;

use booking_dashboard::chart::ChartSpec;
use booking_dashboard::models::{BookingDimension, VisitDimension};
use booking_dashboard::queries::{LoadBookingsParams, LoadVisitsParams};
use booking_dashboard::{
    export, BookingPass, BookingReport, Dashboard, NoData, Outcome, Result, VisitPass,
    VisitReport,
};

/// Print dashboard KPIs for hotel bookings or recycling route visits
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// DuckDB database file
    #[arg(short, long, env = "DASHBOARD_DATABASE")]
    database: Option<PathBuf>,

    /// Report on route visits instead of bookings
    #[arg(long)]
    visits: bool,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Reservation status to keep; repeat for several
    #[arg(long)]
    status: Vec<String>,

    #[arg(long)]
    room_type: Vec<String>,

    #[arg(long)]
    location: Vec<String>,

    #[arg(long)]
    payment_method: Vec<String>,

    #[arg(long)]
    neighborhood: Option<String>,

    #[arg(long)]
    collector: Option<String>,

    /// Route to keep in visit mode; repeat for several
    #[arg(long)]
    route: Vec<String>,

    /// Material to keep in visit mode; repeat for several
    #[arg(long)]
    material: Vec<String>,

    /// How many entries the rankings show
    #[arg(short, long, env = "DASHBOARD_TOP_N", default_value_t = 10)]
    top: usize,

    /// Write the filtered rows to this CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Booking columns to write to the CSV file, comma separated; unknown
    /// names are skipped
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Write the chart specs to this JSON file
    #[arg(long, value_name = "FILE")]
    charts: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when the pass had nothing to show.
fn run(args: &Args) -> Result<bool> {
    let mut builder = Dashboard::builder().read_only(true);
    if let Some(ref path) = args.database {
        builder = builder.database(path);
    }
    let dashboard = builder.build()?;
    info!("{}", dashboard);

    if args.visits {
        match dashboard.visit_pass(&visit_pass(args))? {
            Outcome::Ready(report) => {
                print_visits(&report, args.top);
                if let Some(ref path) = args.csv {
                    fs::write(path, export::visits_csv(&report.rows)?)?;
                }
                write_charts(args, &report.charts())?;
                Ok(true)
            }
            Outcome::NoData(why) => {
                print_no_data(why);
                Ok(false)
            }
        }
    } else {
        match dashboard.booking_pass(&booking_pass(args))? {
            Outcome::Ready(report) => {
                print_bookings(&report, args.top);
                if let Some(ref path) = args.csv {
                    let csv = if args.columns.is_empty() {
                        export::bookings_csv(&report.rows)?
                    } else {
                        export::booking_columns_csv(&report.rows, &args.columns)?
                    };
                    fs::write(path, csv)?;
                }
                write_charts(args, &report.charts())?;
                Ok(true)
            }
            Outcome::NoData(why) => {
                print_no_data(why);
                Ok(false)
            }
        }
    }
}

fn booking_pass(args: &Args) -> BookingPass {
    let mut pass = BookingPass {
        load: LoadBookingsParams {
            date_from: args.from,
            date_to: args.to,
            limit: None,
        },
        top_n: args.top,
        ..Default::default()
    };
    pass.criteria = pass
        .criteria
        .only(BookingDimension::Status, args.status.iter().cloned())
        .only(BookingDimension::RoomType, args.room_type.iter().cloned())
        .only(BookingDimension::Location, args.location.iter().cloned())
        .only(
            BookingDimension::PaymentMethod,
            args.payment_method.iter().cloned(),
        );
    pass
}

fn visit_pass(args: &Args) -> VisitPass {
    let mut pass = VisitPass {
        load: LoadVisitsParams {
            date_from: args.from,
            date_to: args.to,
            neighborhood: args.neighborhood.clone(),
            collector: args.collector.clone(),
        },
        ..Default::default()
    };
    pass.criteria = pass
        .criteria
        .only(VisitDimension::Route, args.route.iter().cloned())
        .only(VisitDimension::Material, args.material.iter().cloned());
    pass
}

fn print_no_data(why: NoData) {
    match why {
        NoData::NothingLoaded => println!("The database returned no rows."),
        NoData::NothingMatched => println!("No rows match the selected filters."),
    }
}

fn print_bookings(report: &BookingReport, top: usize) {
    let k = &report.kpis;
    println!("Total revenue        {:>12.2}", k.total_revenue);
    println!("Reservations         {:>12}", k.reservations);
    println!("Average / booking    {:>12.2}", k.average_per_reservation);
    println!("Average stay         {:>12.1} nights", k.average_stay);
    println!("Clients              {:>12}", k.clients);
    println!("Rooms                {:>12}", k.rooms);
    println!("Services used        {:>12}", k.services_used);
    println!("Nights booked        {:>12}", k.nights_booked);
    println!("Confirmation rate    {:>11.1}%", k.confirmation_rate);
    println!("Cancellation rate    {:>11.1}%", k.cancellation_rate);
    if let Some(growth) = k.monthly_growth {
        println!("Monthly growth       {:>11.1}%", growth);
    }

    section("Top clients", &report.top_clients);
    section("Revenue by room type", &report.revenue_by_room_type.top(top));
    section("Payment methods", &report.payment_methods.top(top));
    section("Least used payment methods", &report.least_used_payment_methods);
    section("Most booked services", &report.top_services);
    section("Most profitable services", &report.top_services_by_revenue);
}

fn print_visits(report: &VisitReport, top: usize) {
    let k = &report.kpis;
    println!("Kilograms collected  {:>12.1}", k.total_kilograms);
    println!("Visits               {:>12}", k.visits);
    println!("Completion rate      {:>11.1}%", k.completion_rate);
    if let Some((ref route, n)) = k.leading_route {
        println!("Busiest route        {} ({} visits)", route, n);
    }
    if let Some((ref name, n)) = k.top_collector {
        println!("Top collector        {} ({} visits)", name, n);
    }

    section(
        "Kilograms by neighborhood",
        &report.kilograms_by_neighborhood.top(top),
    );
    section("Kilograms by material", &report.kilograms_by_material.top(top));
}

fn section(title: &str, entries: &[(String, f64)]) {
    if entries.is_empty() {
        return;
    }
    println!();
    println!("{}", title);
    for (label, value) in entries {
        println!("  {:<30} {:>12.2}", label, value);
    }
}

fn write_charts(args: &Args, charts: &[ChartSpec]) -> Result<()> {
    if let Some(ref path) = args.charts {
        let json = serde_json::to_string_pretty(charts)?;
        fs::write(path, json)?;
        info!("wrote {} charts to {}", charts.len(), path.display());
    }
    Ok(())
}
