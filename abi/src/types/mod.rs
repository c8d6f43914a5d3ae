mod booking;
mod booking_status;
mod customer;
mod room;

use std::ops::Bound;

use chrono::NaiveDate;
use sqlx::postgres::types::PgRange;

pub use booking::*;
pub use booking_status::*;
pub use customer::*;
pub use room::*;

use crate::BookingError;

pub type RoomNumber = i32;
pub type CustomerId = i64;
pub type BookingId = i64;

pub trait Validator {
    fn validate(&self) -> Result<(), BookingError>;
}

/// A stay must cover at least one night.
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), BookingError> {
    if check_out <= check_in {
        return Err(BookingError::InvalidStay {
            check_in,
            check_out,
        });
    }

    Ok(())
}

/// Half-open `[check_in, check_out)` window as a Postgres daterange.
pub fn stay_range(check_in: NaiveDate, check_out: NaiveDate) -> PgRange<NaiveDate> {
    PgRange {
        start: Bound::Included(check_in),
        end: Bound::Excluded(check_out),
    }
}
