//! Booking and route-visit dashboards on top of DuckDB.
//!
//! Each user interaction runs one pass: load rows with a JOIN query, clean
//! them into typed records, filter them by the selected criteria, then
//! aggregate the survivors into KPIs, chart series and CSV exports.
//!
//! # Quick start
//!
//! ```no_run
//! use booking_dashboard::{BookingPass, Dashboard, Outcome};
//! use booking_dashboard::models::BookingDimension;
//!
//! let dashboard = Dashboard::builder().database("hotel.duckdb").build().unwrap();
//!
//! let mut pass = BookingPass::default();
//! pass.criteria = pass.criteria.only(BookingDimension::Status, ["confirmed"]);
//!
//! match dashboard.booking_pass(&pass).unwrap() {
//!     Outcome::Ready(report) => println!("revenue: {:.2}", report.kpis.total_revenue),
//!     Outcome::NoData(why) => println!("nothing to show: {:?}", why),
//! }
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod clean;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod filter;
pub mod kpi;
pub mod models;
pub mod queries;
pub mod report;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncDashboard;
pub use cache::QueryCache;
pub use connection::Connection;
pub use error::{DashboardError, Result};
pub use filter::{DateRange, FilterCriteria};
pub use report::{BookingReport, NoData, Outcome, VisitReport};
pub use sql_builder::SqlBuilder;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;

use models::{BookingDimension, VisitDimension};
use queries::{BookingCache, LoadBookingsParams, LoadVisitsParams, VisitCache};

// ---------------------------------------------------------------------------
// DashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Dashboard`].
///
/// Use [`Dashboard::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](DashboardBuilder::build).
pub struct DashboardBuilder {
    database: Option<PathBuf>,
    in_memory: bool,
    read_only: bool,
    cache_ttl: Duration,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self {
            database: None,
            in_memory: false,
            read_only: false,
            cache_ttl: config::DEFAULT_CACHE_TTL,
        }
    }
}

impl DashboardBuilder {
    /// Use this DuckDB database file.
    ///
    /// If not set, [`config::default_database_path()`] is used.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a private in-memory database instead of a file. Mostly useful
    /// together with seeding through [`Connection::register_table_from_ndjson`].
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Open the database file read-only. Defaults to `false`.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// How long loaded rows are reused by later passes with the same load
    /// parameters. Defaults to 10 minutes; zero disables caching.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Open the database connection and create the query caches.
    pub fn build(self) -> Result<Dashboard> {
        let conn = if self.in_memory {
            Connection::open_in_memory()?
        } else {
            let path = self.database.unwrap_or_else(config::default_database_path);
            Connection::open(path, self.read_only)?
        };
        Ok(Dashboard::with_connection(conn, self.cache_ttl))
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// Everything one booking pass needs: what to load and how to filter it.
#[derive(Debug, Clone)]
pub struct BookingPass {
    pub load: LoadBookingsParams,
    pub criteria: FilterCriteria<BookingDimension>,
    pub top_n: usize,
}

impl Default for BookingPass {
    fn default() -> Self {
        Self {
            load: LoadBookingsParams::default(),
            criteria: FilterCriteria::new(),
            top_n: config::DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisitPass {
    pub load: LoadVisitsParams,
    pub criteria: FilterCriteria<VisitDimension>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The main entry point.
///
/// Owns the [`Connection`] and one [`QueryCache`] per loader, and hands them
/// to the query interfaces, which borrow them for the length of a call.
pub struct Dashboard {
    conn: Connection,
    booking_cache: RefCell<BookingCache>,
    visit_cache: RefCell<VisitCache>,
    announced: Cell<bool>,
}

impl Dashboard {
    /// Create a new builder for configuring the dashboard.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    /// Wrap an already open connection.
    pub fn with_connection(conn: Connection, cache_ttl: Duration) -> Self {
        Self {
            conn,
            booking_cache: RefCell::new(BookingCache::new(cache_ttl)),
            visit_cache: RefCell::new(VisitCache::new(cache_ttl)),
            announced: Cell::new(false),
        }
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the booking loader, backed by the booking cache.
    pub fn bookings(&self) -> queries::BookingQuery<'_> {
        queries::BookingQuery::with_cache(&self.conn, &self.booking_cache)
    }

    /// Access the route-visit loader, backed by the visit cache.
    pub fn visits(&self) -> queries::VisitQuery<'_> {
        queries::VisitQuery::with_cache(&self.conn, &self.visit_cache)
    }

    // -- Passes ------------------------------------------------------------

    /// Run one booking pass: load, clean, filter and aggregate.
    ///
    /// Database errors end the pass and are returned; an empty load or an
    /// empty filter result is [`Outcome::NoData`].
    pub fn booking_pass(&self, pass: &BookingPass) -> Result<Outcome<BookingReport>> {
        self.announce();
        let rows = self.bookings().load_clean(&pass.load)?;
        Ok(report::booking_report(&rows, &pass.criteria, pass.top_n))
    }

    /// Run one route-visit pass.
    pub fn visit_pass(&self, pass: &VisitPass) -> Result<Outcome<VisitReport>> {
        self.announce();
        let rows = self.visits().load_clean(&pass.load)?;
        Ok(report::visit_report(&rows, &pass.criteria))
    }

    fn announce(&self) {
        if !self.announced.replace(true) {
            info!("Connected to database {}", self.conn.location().display());
        }
    }

    // -- Metadata and utility methods --------------------------------------

    /// Execute a raw SQL query against the database.
    ///
    /// Escape hatch for queries not covered by the loaders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Names of the tables in the database.
    pub fn tables(&self) -> Result<Vec<String>> {
        self.conn.tables()
    }

    /// Drop every cached result set so the next pass reloads.
    pub fn refresh(&self) {
        self.booking_cache.borrow_mut().clear();
        self.visit_cache.borrow_mut().clear();
        info!("Query caches cleared");
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bookings = self.booking_cache.borrow();
        let visits = self.visit_cache.borrow();
        write!(
            f,
            "Dashboard(database={}, cache_ttl={}s, cached=[bookings: {}, visits: {}])",
            self.conn.location().display(),
            bookings.ttl().as_secs(),
            bookings.len(),
            visits.len()
        )
    }
}
