//! Async wrapper around [`Dashboard`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every pass on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use booking_dashboard::{AsyncDashboard, BookingPass};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dashboard = AsyncDashboard::builder()
//!         .database("hotel.duckdb")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let outcome = dashboard.booking_pass(BookingPass::default()).await.unwrap();
//!     println!("ready: {}", outcome.is_ready());
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config;
use crate::error::{DashboardError, Result};
use crate::report::{BookingReport, Outcome, VisitReport};
use crate::{BookingPass, Dashboard, VisitPass};

// ---------------------------------------------------------------------------
// AsyncDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncDashboard`].
pub struct AsyncDashboardBuilder {
    database: Option<PathBuf>,
    in_memory: bool,
    read_only: bool,
    cache_ttl: Duration,
}

impl Default for AsyncDashboardBuilder {
    fn default() -> Self {
        Self {
            database: None,
            in_memory: false,
            read_only: false,
            cache_ttl: config::DEFAULT_CACHE_TTL,
        }
    }
}

impl AsyncDashboardBuilder {
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Open the database on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncDashboard> {
        tokio::task::spawn_blocking(move || -> Result<AsyncDashboard> {
            let mut builder = Dashboard::builder()
                .read_only(self.read_only)
                .cache_ttl(self.cache_ttl);
            if let Some(path) = self.database {
                builder = builder.database(path);
            }
            if self.in_memory {
                builder = builder.in_memory();
            }
            Ok(AsyncDashboard::from_dashboard(builder.build()?))
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncDashboard
// ---------------------------------------------------------------------------

/// Async wrapper around [`Dashboard`].
///
/// The dashboard keeps its caches in `RefCell`s, so it sits behind a
/// [`Mutex`] and passes run one at a time.
pub struct AsyncDashboard {
    inner: Arc<Mutex<Dashboard>>,
}

impl AsyncDashboard {
    pub fn builder() -> AsyncDashboardBuilder {
        AsyncDashboardBuilder::default()
    }

    /// Wrap an already configured dashboard, e.g. one seeded in memory.
    pub fn from_dashboard(dashboard: Dashboard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dashboard)),
        }
    }

    /// Run a sync dashboard operation on the blocking thread pool.
    ///
    /// ```no_run
    /// # use booking_dashboard::AsyncDashboard;
    /// # async fn example() -> booking_dashboard::Result<()> {
    /// # let dashboard = AsyncDashboard::builder().build().await?;
    /// let neighborhoods = dashboard.run(|d| d.visits().neighborhoods()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Dashboard) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let dashboard = self.inner.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let guard = dashboard
                .lock()
                .map_err(|_| DashboardError::InvalidArgument("Dashboard lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn booking_pass(&self, pass: BookingPass) -> Result<Outcome<BookingReport>> {
        self.run(move |d| d.booking_pass(&pass)).await
    }

    pub async fn visit_pass(&self, pass: VisitPass) -> Result<Outcome<VisitReport>> {
        self.run(move |d| d.visit_pass(&pass)).await
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |d| d.sql(&query, &params)).await
    }

    pub async fn tables(&self) -> Result<Vec<String>> {
        self.run(|d| d.tables()).await
    }

    /// Drop every cached result set.
    pub async fn refresh(&self) -> Result<()> {
        self.run(|d| {
            d.refresh();
            Ok(())
        })
        .await
    }
}
