//! Route-visit loader for the recycling collection dashboard.
//!
//! Unlike bookings, neighborhood and collector selections are pushed down
//! into SQL, since the widgets for them are single-select.

use std::cell::RefCell;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cache::QueryCache;
use crate::clean::{clean_visits, parse_date};
use crate::connection::Connection;
use crate::error::Result;
use crate::filter::DateRange;
use crate::models::{Visit, VisitRow};
use crate::sql_builder::SqlBuilder;

pub type VisitCache = QueryCache<LoadVisitsParams, Vec<VisitRow>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadVisitsParams {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Exact neighborhood name; `None` means all.
    pub neighborhood: Option<String>,
    /// Exact collector name; `None` means all.
    pub collector: Option<String>,
}

/// Row counts of the reference tables, shown as static totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub neighborhoods: i64,
    pub collectors: i64,
    pub routes: i64,
}

pub struct VisitQuery<'a> {
    conn: &'a Connection,
    cache: Option<&'a RefCell<VisitCache>>,
}

impl<'a> VisitQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn, cache: None }
    }

    pub fn with_cache(conn: &'a Connection, cache: &'a RefCell<VisitCache>) -> Self {
        Self {
            conn,
            cache: Some(cache),
        }
    }

    pub fn sql(params: &LoadVisitsParams) -> (String, Vec<String>) {
        let mut qb = SqlBuilder::new("visit v");
        qb.select(&[
            "v.visit_date",
            "v.kilograms",
            "v.completed",
            "r.route_name",
            "r.material",
            "n.name AS neighborhood",
            "cl.full_name AS collector",
        ])
        .join("JOIN route r ON v.route_id = r.route_id")
        .join("JOIN neighborhood n ON r.neighborhood_id = n.neighborhood_id")
        .join("JOIN collector cl ON v.collector_id = cl.collector_id")
        .order_by(&["v.visit_date DESC"]);

        if let Some(from) = params.date_from {
            qb.where_date_gte("v.visit_date", &from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = params.date_to {
            qb.where_date_lte("v.visit_date", &to.format("%Y-%m-%d").to_string());
        }
        if let Some(ref name) = params.neighborhood {
            qb.where_eq("n.name", name);
        }
        if let Some(ref name) = params.collector {
            qb.where_eq("cl.full_name", name);
        }
        qb.build()
    }

    pub fn load(&self, params: &LoadVisitsParams) -> Result<Vec<VisitRow>> {
        match self.cache {
            Some(cache) => cache
                .borrow_mut()
                .get_or_try_insert_with(params, || self.fetch(params)),
            None => self.fetch(params),
        }
    }

    pub fn load_clean(&self, params: &LoadVisitsParams) -> Result<Vec<Visit>> {
        Ok(clean_visits(&self.load(params)?))
    }

    /// All neighborhood names, sorted.
    pub fn neighborhoods(&self) -> Result<Vec<String>> {
        self.names("neighborhood", "name")
    }

    /// All collector names, sorted.
    pub fn collectors(&self) -> Result<Vec<String>> {
        self.names("collector", "full_name")
    }

    pub fn date_bounds(&self) -> Result<Option<DateRange>> {
        let rows = self.conn.execute(
            "SELECT MIN(visit_date) AS first_day, MAX(visit_date) AS last_day FROM visit",
            &[],
        )?;
        Ok(rows.into_iter().next().and_then(|row| {
            let day = |key: &str| row.get(key).and_then(|v| v.as_str()).and_then(parse_date);
            Some(DateRange::new(day("first_day")?, day("last_day")?))
        }))
    }

    pub fn catalog_counts(&self) -> Result<CatalogCounts> {
        let rows = self.conn.execute_into::<CatalogCounts>(
            "SELECT \
                (SELECT COUNT(*) FROM neighborhood) AS neighborhoods, \
                (SELECT COUNT(*) FROM collector) AS collectors, \
                (SELECT COUNT(*) FROM route) AS routes",
            &[],
        )?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    fn names(&self, table: &str, column: &str) -> Result<Vec<String>> {
        let (sql, params) = SqlBuilder::new(table)
            .select(&[column])
            .distinct()
            .where_clause(&format!("{} IS NOT NULL", column), &[])
            .order_by(&[column])
            .build();
        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                row.get(column)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
            .collect())
    }

    fn fetch(&self, params: &LoadVisitsParams) -> Result<Vec<VisitRow>> {
        let (sql, args) = Self::sql(params);
        match self.conn.execute_into::<VisitRow>(&sql, &args) {
            Ok(rows) => {
                debug!("loaded {} visit rows for {:?}", rows.len(), params);
                Ok(rows)
            }
            Err(e) => {
                let tables = self.conn.tables().unwrap_or_default();
                warn!("visit query failed: {}; tables present: {:?}", e, tables);
                Err(e)
            }
        }
    }
}
