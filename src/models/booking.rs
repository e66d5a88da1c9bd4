use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::{de, Record};

// ---------------------------------------------------------------------------
// BookingRow: One raw row of the reservation join, as the loader returns it
// ---------------------------------------------------------------------------

/// A reservation joined with its client, room, service and payment rows.
///
/// The join fans out: one reservation appears once per matched service and
/// payment. Every column is optional so that a query returning a narrower
/// column set still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRow {
    #[serde(deserialize_with = "de::opt_i64")]
    pub reservation_id: Option<i64>,
    #[serde(deserialize_with = "de::opt_text")]
    pub reservation_date: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "de::opt_text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub location: Option<String>,

    #[serde(deserialize_with = "de::opt_i64")]
    pub client_id: Option<i64>,
    #[serde(deserialize_with = "de::opt_text")]
    pub client_name: Option<String>,

    #[serde(deserialize_with = "de::opt_text")]
    pub check_in: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub check_out: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub guests: Option<f64>,

    #[serde(deserialize_with = "de::opt_i64")]
    pub room_id: Option<i64>,
    #[serde(deserialize_with = "de::opt_text")]
    pub room_number: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub room_type: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub nightly_rate: Option<f64>,

    #[serde(deserialize_with = "de::opt_text")]
    pub special_service: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub service_price: Option<f64>,

    #[serde(deserialize_with = "de::opt_i64")]
    pub payment_id: Option<i64>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub payment_amount: Option<f64>,
    #[serde(deserialize_with = "de::opt_text")]
    pub payment_status: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub payment_date: Option<String>,
    #[serde(deserialize_with = "de::opt_text")]
    pub payment_method: Option<String>,

    #[serde(deserialize_with = "de::opt_f64")]
    pub invoice_discount: Option<f64>,
    #[serde(deserialize_with = "de::opt_text")]
    pub promotion_code: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub discount_percent: Option<f64>,
}

// ---------------------------------------------------------------------------
// Booking: A cleaned booking row with derived columns
// ---------------------------------------------------------------------------

/// A booking row after cleaning.
///
/// Text columns hold [`UNSPECIFIED`](crate::config::UNSPECIFIED) instead of
/// nothing, numeric columns hold zero instead of nothing, and dates that
/// could not be parsed are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub reservation_id: Option<i64>,
    pub reservation_date: Option<NaiveDate>,
    pub amount: f64,
    pub status: String,
    pub location: String,

    pub client_id: Option<i64>,
    pub client_name: String,

    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: f64,

    pub room_id: Option<i64>,
    pub room_number: String,
    pub room_type: String,
    pub nightly_rate: f64,

    pub special_service: String,
    pub service_price: f64,

    pub payment_id: Option<i64>,
    pub payment_amount: f64,
    pub payment_status: String,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: String,

    pub invoice_discount: f64,
    pub promotion_code: String,
    pub discount_percent: f64,

    /// Whole nights between check-in and check-out; 0 if either is missing.
    pub stay_nights: i64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// `YYYY-MM` bucket of the reservation date.
    pub period: Option<String>,
    pub weekday: Option<String>,
    pub iso_week: Option<u32>,
    pub net_amount: f64,
    pub revenue_per_night: f64,
    pub spend_tier: String,
}

impl Booking {
    /// Turn a cleaned booking back into the raw shape the cleaner accepts.
    ///
    /// Cleaning the result yields this booking again.
    pub fn to_row(&self) -> BookingRow {
        let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
        BookingRow {
            reservation_id: self.reservation_id,
            reservation_date: date(self.reservation_date),
            amount: Some(self.amount),
            status: Some(self.status.clone()),
            location: Some(self.location.clone()),
            client_id: self.client_id,
            client_name: Some(self.client_name.clone()),
            check_in: date(self.check_in),
            check_out: date(self.check_out),
            guests: Some(self.guests),
            room_id: self.room_id,
            room_number: Some(self.room_number.clone()),
            room_type: Some(self.room_type.clone()),
            nightly_rate: Some(self.nightly_rate),
            special_service: Some(self.special_service.clone()),
            service_price: Some(self.service_price),
            payment_id: self.payment_id,
            payment_amount: Some(self.payment_amount),
            payment_status: Some(self.payment_status.clone()),
            payment_date: date(self.payment_date),
            payment_method: Some(self.payment_method.clone()),
            invoice_discount: Some(self.invoice_discount),
            promotion_code: Some(self.promotion_code.clone()),
            discount_percent: Some(self.discount_percent),
        }
    }
}

/// Categorical columns of a [`Booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingDimension {
    ReservationId,
    ClientId,
    RoomId,
    ClientName,
    Status,
    Location,
    RoomType,
    SpecialService,
    PaymentStatus,
    PaymentMethod,
    PromotionCode,
    Period,
    Weekday,
    SpendTier,
}

/// Numeric columns of a [`Booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingMeasure {
    Amount,
    NetAmount,
    StayNights,
    Guests,
    ServicePrice,
    PaymentAmount,
    RevenuePerNight,
}

fn id_text(id: Option<i64>) -> Cow<'static, str> {
    match id {
        Some(id) => Cow::Owned(id.to_string()),
        None => Cow::Borrowed(crate::config::UNSPECIFIED),
    }
}

fn opt_text(value: &Option<String>) -> Cow<'_, str> {
    match value {
        Some(v) => Cow::Borrowed(v.as_str()),
        None => Cow::Borrowed(crate::config::UNSPECIFIED),
    }
}

impl Record for Booking {
    type Dimension = BookingDimension;
    type Measure = BookingMeasure;

    fn date(&self) -> Option<NaiveDate> {
        self.reservation_date
    }

    fn dimension(&self, dim: BookingDimension) -> Cow<'_, str> {
        match dim {
            BookingDimension::ReservationId => id_text(self.reservation_id),
            BookingDimension::ClientId => id_text(self.client_id),
            BookingDimension::RoomId => id_text(self.room_id),
            BookingDimension::ClientName => Cow::Borrowed(&self.client_name),
            BookingDimension::Status => Cow::Borrowed(&self.status),
            BookingDimension::Location => Cow::Borrowed(&self.location),
            BookingDimension::RoomType => Cow::Borrowed(&self.room_type),
            BookingDimension::SpecialService => Cow::Borrowed(&self.special_service),
            BookingDimension::PaymentStatus => Cow::Borrowed(&self.payment_status),
            BookingDimension::PaymentMethod => Cow::Borrowed(&self.payment_method),
            BookingDimension::PromotionCode => Cow::Borrowed(&self.promotion_code),
            BookingDimension::Period => opt_text(&self.period),
            BookingDimension::Weekday => opt_text(&self.weekday),
            BookingDimension::SpendTier => Cow::Borrowed(&self.spend_tier),
        }
    }

    fn measure(&self, measure: BookingMeasure) -> f64 {
        match measure {
            BookingMeasure::Amount => self.amount,
            BookingMeasure::NetAmount => self.net_amount,
            BookingMeasure::StayNights => self.stay_nights as f64,
            BookingMeasure::Guests => self.guests,
            BookingMeasure::ServicePrice => self.service_price,
            BookingMeasure::PaymentAmount => self.payment_amount,
            BookingMeasure::RevenuePerNight => self.revenue_per_night,
        }
    }
}
