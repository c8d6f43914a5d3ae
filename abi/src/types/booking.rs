use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::types::PgRange, postgres::PgRow, FromRow, Row};

use crate::{
    stay_range, validate_stay, BookingError, BookingId, BookingStatus, CustomerId, CustomerInfo,
    RoomNumber, Validator,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub customer_id: CustomerId,
    pub room_number: RoomNumber,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: BookingStatus,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    pub fn is_confirmed(&self) -> bool {
        self.status.is_confirmed()
    }
}

impl FromRow<'_, PgRow> for Booking {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse()
            .map_err(|e: BookingError| sqlx::Error::ColumnDecode {
                index: "status".into(),
                source: Box::new(e),
            })?;

        Ok(Self {
            booking_id: row.try_get("booking_id")?,
            customer_id: row.try_get("customer_id")?,
            room_number: row.try_get("room_number")?,
            check_in_date: row.try_get("check_in_date")?,
            check_out_date: row.try_get("check_out_date")?,
            total_amount: row.try_get("total_amount")?,
            status,
        })
    }
}

/// The party a booking is made for: an existing directory entry, or contact
/// details to be resolved with find-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guest {
    Existing(CustomerId),
    New(CustomerInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub guest: Guest,
    pub room_number: RoomNumber,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nightly_price: Decimal,
}

impl BookingRequest {
    pub fn for_customer(
        customer_id: CustomerId,
        room_number: RoomNumber,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        nightly_price: Decimal,
    ) -> Self {
        Self {
            guest: Guest::Existing(customer_id),
            room_number,
            check_in_date,
            check_out_date,
            nightly_price,
        }
    }

    pub fn for_guest(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        room_number: RoomNumber,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        nightly_price: Decimal,
    ) -> Self {
        Self {
            guest: Guest::New(CustomerInfo::new(name, email, phone)),
            room_number,
            check_in_date,
            check_out_date,
            nightly_price,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    pub fn total_amount(&self) -> Decimal {
        Decimal::from(self.nights()) * self.nightly_price
    }

    pub fn timespan(&self) -> PgRange<NaiveDate> {
        stay_range(self.check_in_date, self.check_out_date)
    }
}

impl Validator for BookingRequest {
    fn validate(&self) -> Result<(), BookingError> {
        validate_stay(self.check_in_date, self.check_out_date)?;

        if self.nightly_price < Decimal::ZERO {
            return Err(BookingError::InvalidPrice(self.nightly_price));
        }

        if let Guest::New(info) = &self.guest {
            info.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn total_amount_should_be_nights_times_nightly_price() {
        let request = BookingRequest::for_customer(
            1,
            101,
            date("2025-01-10"),
            date("2025-01-13"),
            dec!(100.00),
        );
        assert_eq!(request.nights(), 3);
        assert_eq!(request.total_amount(), dec!(300.00));
    }

    #[test]
    fn zero_night_request_should_be_rejected() {
        let request = BookingRequest::for_customer(
            1,
            101,
            date("2025-01-10"),
            date("2025-01-10"),
            dec!(100.00),
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn negative_nightly_price_should_be_rejected() {
        let request = BookingRequest::for_customer(
            1,
            101,
            date("2025-01-10"),
            date("2025-01-12"),
            dec!(-1.00),
        );
        assert_eq!(
            request.validate().unwrap_err(),
            BookingError::InvalidPrice(dec!(-1.00))
        );
    }

    #[test]
    fn guest_request_should_validate_contact_details() {
        let request = BookingRequest::for_guest(
            "A",
            "a.example.com",
            "1234567890",
            101,
            date("2025-01-10"),
            date("2025-01-12"),
            dec!(100.00),
        );
        assert_eq!(
            request.validate().unwrap_err(),
            BookingError::InvalidEmail("a.example.com".to_string())
        );
    }
}
