mod conflict;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub use conflict::*;

use crate::{BookingId, CustomerId, RoomNumber};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("unknown error")]
    Unknown,

    #[error("invalid stay: check-out {check_out} must be after check-in {check_in}")]
    InvalidStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("customer name must not be empty")]
    InvalidName,

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid phone, expected ten digits: {0}")]
    InvalidPhone(String),

    #[error("invalid nightly price: {0}")]
    InvalidPrice(Decimal),

    #[error("invalid room type: {0}")]
    InvalidRoomType(String),

    #[error("invalid booking status: {0}")]
    InvalidStatus(String),

    #[error("room {0} not found")]
    RoomNotFound(RoomNumber),

    #[error("room {0} already exists")]
    RoomExists(RoomNumber),

    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("no customer with email {0}")]
    CustomerEmailNotFound(String),

    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("customer {id} still has {active} confirmed bookings")]
    CustomerHasBookings { id: CustomerId, active: i64 },

    #[error("booking {0} not found")]
    BookingNotFound(BookingId),

    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(BookingId),

    #[error("room not available: {0}")]
    RoomNotAvailable(BookingConflictInfo),

    #[error("db error: {0}")]
    DbError(sqlx::Error),
}

impl PartialEq for BookingError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // db errors compare by kind only
            (Self::DbError(_), Self::DbError(_)) => true,
            (Self::Unknown, Self::Unknown) => true,
            (
                Self::InvalidStay {
                    check_in: i1,
                    check_out: o1,
                },
                Self::InvalidStay {
                    check_in: i2,
                    check_out: o2,
                },
            ) => i1 == i2 && o1 == o2,
            (Self::InvalidName, Self::InvalidName) => true,
            (Self::InvalidEmail(v1), Self::InvalidEmail(v2)) => v1 == v2,
            (Self::InvalidPhone(v1), Self::InvalidPhone(v2)) => v1 == v2,
            (Self::InvalidPrice(v1), Self::InvalidPrice(v2)) => v1 == v2,
            (Self::InvalidRoomType(v1), Self::InvalidRoomType(v2)) => v1 == v2,
            (Self::InvalidStatus(v1), Self::InvalidStatus(v2)) => v1 == v2,
            (Self::RoomNotFound(v1), Self::RoomNotFound(v2)) => v1 == v2,
            (Self::RoomExists(v1), Self::RoomExists(v2)) => v1 == v2,
            (Self::CustomerNotFound(v1), Self::CustomerNotFound(v2)) => v1 == v2,
            (Self::CustomerEmailNotFound(v1), Self::CustomerEmailNotFound(v2)) => v1 == v2,
            (Self::DuplicateEmail(v1), Self::DuplicateEmail(v2)) => v1 == v2,
            (
                Self::CustomerHasBookings { id: i1, active: a1 },
                Self::CustomerHasBookings { id: i2, active: a2 },
            ) => i1 == i2 && a1 == a2,
            (Self::BookingNotFound(v1), Self::BookingNotFound(v2)) => v1 == v2,
            (Self::AlreadyCancelled(v1), Self::AlreadyCancelled(v2)) => v1 == v2,
            (Self::RoomNotAvailable(v1), Self::RoomNotAvailable(v2)) => v1 == v2,
            _ => false,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(e) => {
                let err = e.downcast_ref::<sqlx::postgres::PgDatabaseError>();
                match (err.code(), err.schema(), err.table()) {
                    // exclusion constraint on (room_number, daterange)
                    ("23P01", Some("hotel"), Some("bookings")) => {
                        Self::RoomNotAvailable(err.detail().unwrap_or_default().into())
                    }
                    ("23505", Some("hotel"), Some("customers")) => {
                        Self::DuplicateEmail(err.detail().unwrap_or_default().to_string())
                    }
                    _ => Self::DbError(sqlx::Error::Database(e)),
                }
            }
            _ => Self::DbError(e),
        }
    }
}
