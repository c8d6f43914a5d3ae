use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::{BookingError, RoomNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Standard,
    Deluxe,
    Suite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_number: RoomNumber,
    pub room_type: RoomType,
    pub price: Decimal,
    pub is_available: bool,
    pub amenities: String,
}

/// Optional filters for the inventory search; both default to "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSearch {
    pub room_type: Option<RoomType>,
    pub max_price: Option<Decimal>,
}

impl Room {
    pub fn new(
        room_number: RoomNumber,
        room_type: RoomType,
        price: Decimal,
        amenities: impl Into<String>,
    ) -> Self {
        Self {
            room_number,
            room_type,
            price,
            is_available: true,
            amenities: amenities.into(),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::Deluxe => write!(f, "Deluxe"),
            Self::Suite => write!(f, "Suite"),
        }
    }
}

impl FromStr for RoomType {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "Deluxe" => Ok(Self::Deluxe),
            "Suite" => Ok(Self::Suite),
            _ => Err(BookingError::InvalidRoomType(s.to_string())),
        }
    }
}

impl FromRow<'_, PgRow> for Room {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let room_type: String = row.try_get("room_type")?;
        let room_type = room_type
            .parse()
            .map_err(|e: BookingError| sqlx::Error::ColumnDecode {
                index: "room_type".into(),
                source: Box::new(e),
            })?;

        Ok(Self {
            room_number: row.try_get("room_number")?,
            room_type,
            price: row.try_get("price")?,
            is_available: row.try_get("is_available")?,
            amenities: row.try_get("amenities")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_room_should_start_available() {
        let room = Room::new(101, RoomType::Standard, dec!(100.00), "WiFi, TV");
        assert!(room.is_available);
        assert_eq!(room.price, dec!(100.00));
    }

    #[test]
    fn room_type_should_round_trip_through_its_label() {
        assert_eq!("Suite".parse::<RoomType>().unwrap(), RoomType::Suite);
        assert_eq!(RoomType::Deluxe.to_string(), "Deluxe");
    }

    #[test]
    fn unknown_room_type_should_be_rejected() {
        let err = "Penthouse".parse::<RoomType>().unwrap_err();
        assert_eq!(err, BookingError::InvalidRoomType("Penthouse".to_string()));
    }
}
