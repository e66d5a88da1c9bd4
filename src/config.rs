use std::path::PathBuf;
use std::time::Duration;

/// Sentinel written into textual categorical columns that have no value.
pub const UNSPECIFIED: &str = "unspecified";

/// Reservation status values the rate KPIs look for, compared
/// case-insensitively.
pub const CONFIRMED_STATUS: &str = "confirmed";
pub const CANCELLED_STATUS: &str = "cancelled";

/// Entries in the "most profitable services" ranking.
pub const REVENUE_SERVICES_SHOWN: usize = 3;

/// Entries in the "least used payment methods" ranking.
pub const LEAST_USED_PAYMENTS_SHOWN: usize = 2;

/// How long a loaded result set is served from the query cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Number of entries shown in "top N" rankings.
pub const DEFAULT_TOP_N: usize = 10;

/// Number of buckets used for stay-length histograms.
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Upper bounds (inclusive) of the client spend tiers, in currency units.
/// Anything above the last bound is `luxury`.
pub const SPEND_TIER_BOUNDS: [(f64, &str); 3] =
    [(200.0, "economy"), (350.0, "standard"), (500.0, "premium")];

pub const TOP_SPEND_TIER: &str = "luxury";

/// Raw payment-method names mapped to the groups shown on dashboards.
/// Matching is case-insensitive; unknown names pass through unchanged.
pub fn payment_method_groups() -> &'static [(&'static str, &'static str)] {
    &[
        ("credit card", "CARD"),
        ("debit card", "CARD"),
        ("cash", "CASH"),
        ("transfer", "TRANSFER"),
        ("paypal", "DIGITAL"),
        ("qr", "QR"),
    ]
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("booking-dashboard").join("hotel.duckdb")
    } else {
        PathBuf::from("hotel.duckdb")
    }
}
