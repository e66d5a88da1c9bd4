//! Loaders for the dashboard database.
//!
//! Each module provides a query struct that borrows a
//! [`Connection`](crate::connection::Connection), optionally together with a
//! [`QueryCache`](crate::cache::QueryCache), and returns typed raw rows.

pub mod bookings;
pub mod visits;

pub use bookings::{BookingCache, BookingQuery, LoadBookingsParams};
pub use visits::{CatalogCounts, LoadVisitsParams, VisitCache, VisitQuery};
