use abi::{BookingError, Room, RoomNumber, RoomSearch};
use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::{Inventory, RoomInventory};

#[async_trait]
impl Inventory for RoomInventory {
    async fn list_all(&self) -> Result<Vec<Room>, BookingError> {
        let rooms = sqlx::query_as(
            "SELECT room_number, room_type, price, is_available, amenities FROM hotel.rooms ORDER BY room_number",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rooms)
    }

    async fn list_available(&self) -> Result<Vec<Room>, BookingError> {
        let rooms = sqlx::query_as(
            "SELECT room_number, room_type, price, is_available, amenities FROM hotel.rooms WHERE is_available = TRUE ORDER BY room_number",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rooms)
    }

    async fn search(&self, filter: RoomSearch) -> Result<Vec<Room>, BookingError> {
        let mut query = QueryBuilder::new(
            "SELECT room_number, room_type, price, is_available, amenities FROM hotel.rooms WHERE is_available = TRUE",
        );

        if let Some(room_type) = filter.room_type {
            query.push(" AND room_type = ");
            query.push_bind(room_type.to_string());
        }

        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ");
            query.push_bind(max_price);
        }

        query.push(" ORDER BY price");

        let rooms = query.build_query_as().fetch_all(self.pool()).await?;

        Ok(rooms)
    }

    async fn get_by_number(&self, room_number: RoomNumber) -> Result<Room, BookingError> {
        let room = sqlx::query_as(
            "SELECT room_number, room_type, price, is_available, amenities FROM hotel.rooms WHERE room_number = $1",
        )
        .bind(room_number)
        .fetch_optional(self.pool())
        .await?;

        room.ok_or(BookingError::RoomNotFound(room_number))
    }

    async fn set_availability(
        &self,
        room_number: RoomNumber,
        is_available: bool,
    ) -> Result<(), BookingError> {
        let done = sqlx::query("UPDATE hotel.rooms SET is_available = $1 WHERE room_number = $2")
            .bind(is_available)
            .bind(room_number)
            .execute(self.pool())
            .await?;

        if done.rows_affected() == 0 {
            return Err(BookingError::RoomNotFound(room_number));
        }

        tracing::debug!(room = room_number, is_available, "availability hint updated");
        Ok(())
    }

    async fn add(&self, room: Room) -> Result<(), BookingError> {
        let inserted = sqlx::query(
            "INSERT INTO hotel.rooms (room_number, room_type, price, is_available, amenities) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(room.room_number)
        .bind(room.room_type.to_string())
        .bind(room.price)
        .bind(room.is_available)
        .bind(&room.amenities)
        .execute(self.pool())
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(BookingError::RoomExists(room.room_number))
            }
            Err(e) => Err(e.into()),
        }
    }
}
