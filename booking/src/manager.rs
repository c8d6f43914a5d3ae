use abi::{
    stay_range, validate_stay, Booking, BookingConflict, BookingConflictInfo, BookingError,
    BookingId, BookingRequest, BookingStatus, BookingWindow, CustomerId, Guest, RoomNumber,
    Validator,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Row};

use crate::{BookingManager, Directory, Ledger};

#[async_trait]
impl Ledger for BookingManager {
    async fn reserve(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        request.validate()?;

        let customer_id = match &request.guest {
            Guest::Existing(id) => *id,
            Guest::New(info) => self.directory().find_or_create(info.clone()).await?,
        };

        let mut tx = self.pool().begin().await?;

        // lock the room row so concurrent attempts on the same room serialize;
        // dropping the transaction on any early return rolls everything back
        let room = sqlx::query("SELECT room_number FROM hotel.rooms WHERE room_number = $1 FOR UPDATE")
            .bind(request.room_number)
            .fetch_optional(&mut *tx)
            .await?;
        if room.is_none() {
            return Err(BookingError::RoomNotFound(request.room_number));
        }

        if let Guest::Existing(id) = &request.guest {
            let customer = sqlx::query("SELECT customer_id FROM hotel.customers WHERE customer_id = $1")
                .bind(*id)
                .fetch_optional(&mut *tx)
                .await?;
            if customer.is_none() {
                return Err(BookingError::CustomerNotFound(*id));
            }
        }

        // re-check availability on the exact dates while holding the lock
        let conflict = sqlx::query(
            "SELECT check_in_date, check_out_date FROM hotel.bookings WHERE room_number = $1 AND status = 'CONFIRMED' AND daterange(check_in_date, check_out_date) && $2 LIMIT 1",
        )
        .bind(request.room_number)
        .bind(request.timespan())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = conflict {
            let old = BookingWindow::new(
                request.room_number,
                row.try_get("check_in_date")?,
                row.try_get("check_out_date")?,
            );
            let new = BookingWindow::new(
                request.room_number,
                request.check_in_date,
                request.check_out_date,
            );
            tracing::debug!(room = request.room_number, "requested window is taken");
            return Err(BookingError::RoomNotAvailable(BookingConflictInfo::Parsed(
                BookingConflict { new, old },
            )));
        }

        let total_amount = request.total_amount();

        // the bookings_no_overlap exclusion constraint backstops this insert
        let booking_id: BookingId = sqlx::query(
            "INSERT INTO hotel.bookings (customer_id, room_number, check_in_date, check_out_date, total_amount, status) VALUES ($1, $2, $3, $4, $5, 'CONFIRMED') RETURNING booking_id",
        )
        .bind(customer_id)
        .bind(request.room_number)
        .bind(request.check_in_date)
        .bind(request.check_out_date)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?
        .try_get(0)?;

        sqlx::query("UPDATE hotel.rooms SET is_available = FALSE WHERE room_number = $1")
            .bind(request.room_number)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(booking_id, room = request.room_number, "booking confirmed");

        Ok(Booking {
            booking_id,
            customer_id,
            room_number: request.room_number,
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            total_amount,
            status: BookingStatus::Confirmed,
        })
    }

    async fn cancel(&self, id: BookingId) -> Result<Booking, BookingError> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(
            "UPDATE hotel.bookings SET status = 'CANCELLED' WHERE booking_id = $1 AND status = 'CONFIRMED' RETURNING booking_id, customer_id, room_number, check_in_date, check_out_date, total_amount, status",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            // distinguish a missing id from a repeated cancel
            let existing = sqlx::query("SELECT booking_id FROM hotel.bookings WHERE booking_id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            return match existing {
                Some(_) => Err(BookingError::AlreadyCancelled(id)),
                None => Err(BookingError::BookingNotFound(id)),
            };
        };

        let booking = Booking::from_row(&row)?;

        // availability hint only; other confirmed stays may still exist
        sqlx::query("UPDATE hotel.rooms SET is_available = TRUE WHERE room_number = $1")
            .bind(booking.room_number)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(booking_id = id, room = booking.room_number, "booking cancelled");

        Ok(booking)
    }

    async fn get(&self, id: BookingId) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as(
            "SELECT booking_id, customer_id, room_number, check_in_date, check_out_date, total_amount, status FROM hotel.bookings WHERE booking_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        booking.ok_or(BookingError::BookingNotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as(
            "SELECT booking_id, customer_id, room_number, check_in_date, check_out_date, total_amount, status FROM hotel.bookings ORDER BY booking_id DESC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    async fn list_by_customer(&self, id: CustomerId) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as(
            "SELECT booking_id, customer_id, room_number, check_in_date, check_out_date, total_amount, status FROM hotel.bookings WHERE customer_id = $1 ORDER BY check_in_date DESC",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    async fn list_by_customer_email(&self, email: &str) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as(
            "SELECT b.booking_id, b.customer_id, b.room_number, b.check_in_date, b.check_out_date, b.total_amount, b.status FROM hotel.bookings b JOIN hotel.customers c ON b.customer_id = c.customer_id WHERE c.email = $1 ORDER BY b.check_in_date DESC",
        )
        .bind(email)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    async fn is_room_available(
        &self,
        room_number: RoomNumber,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, BookingError> {
        validate_stay(check_in, check_out)?;

        let available = sqlx::query_scalar(
            "SELECT NOT EXISTS (SELECT 1 FROM hotel.bookings WHERE room_number = $1 AND status = 'CONFIRMED' AND daterange(check_in_date, check_out_date) && $2)",
        )
        .bind(room_number)
        .bind(stay_range(check_in, check_out))
        .fetch_one(self.pool())
        .await?;

        Ok(available)
    }

    async fn confirmed_count(&self, id: CustomerId) -> Result<i64, BookingError> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM hotel.bookings WHERE customer_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await?;

        Ok(count)
    }
}
