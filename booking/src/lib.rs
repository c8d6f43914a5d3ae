mod customers;
mod manager;
mod rooms;

use abi::{
    Booking, BookingError, BookingId, BookingRequest, Customer, CustomerId, CustomerInfo,
    DbConfig, Room, RoomNumber, RoomSearch,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// The room catalog. `is_available` is a presentation hint maintained by the
/// ledger; the authoritative availability answer is `Ledger::is_room_available`.
#[derive(Debug, Clone)]
pub struct RoomInventory {
    pool: PgPool,
}

/// The customer records, keyed externally by email.
#[derive(Debug, Clone)]
pub struct CustomerDirectory {
    pool: PgPool,
}

/// The booking ledger. Sole writer of booking rows and of the room
/// availability hint.
#[derive(Debug, Clone)]
pub struct BookingManager {
    pool: PgPool,
    directory: CustomerDirectory,
}

#[async_trait]
pub trait Inventory {
    /// all rooms, ordered by room number
    async fn list_all(&self) -> Result<Vec<Room>, BookingError>;
    /// rooms whose availability hint is set, ordered by room number
    async fn list_available(&self) -> Result<Vec<Room>, BookingError>;
    /// available rooms matching the optional filters, ordered by price
    async fn search(&self, filter: RoomSearch) -> Result<Vec<Room>, BookingError>;
    /// single room by number
    async fn get_by_number(&self, room_number: RoomNumber) -> Result<Room, BookingError>;
    /// flip the availability hint; meant for the ledger and admin re-sync
    async fn set_availability(
        &self,
        room_number: RoomNumber,
        is_available: bool,
    ) -> Result<(), BookingError>;
    /// insert a new room; fails if the number is taken
    async fn add(&self, room: Room) -> Result<(), BookingError>;
}

#[async_trait]
pub trait Directory {
    /// insert a validated customer; fails on a duplicate email
    async fn create(&self, info: CustomerInfo) -> Result<Customer, BookingError>;
    async fn find_by_email(&self, email: &str) -> Result<Customer, BookingError>;
    async fn find_by_id(&self, id: CustomerId) -> Result<Customer, BookingError>;
    /// resolve contact details to an id, inserting at most one row per email
    async fn find_or_create(&self, info: CustomerInfo) -> Result<CustomerId, BookingError>;
    /// overwrite a customer's details; email uniqueness still applies
    async fn update(&self, id: CustomerId, info: CustomerInfo) -> Result<Customer, BookingError>;
    /// delete a customer, refused while the ledger holds confirmed bookings
    async fn delete(
        &self,
        id: CustomerId,
        ledger: &(dyn Ledger + Sync),
    ) -> Result<(), BookingError>;
    /// case-insensitive substring match on the name, ordered by name
    async fn search_by_name(&self, name: &str) -> Result<Vec<Customer>, BookingError>;
    /// all customers, ordered by name
    async fn list_all(&self) -> Result<Vec<Customer>, BookingError>;
}

#[async_trait]
pub trait Ledger {
    /// atomically reserve a room for the requested window
    async fn reserve(&self, request: BookingRequest) -> Result<Booking, BookingError>;
    /// CONFIRMED -> CANCELLED, once; frees the room availability hint
    async fn cancel(&self, id: BookingId) -> Result<Booking, BookingError>;
    async fn get(&self, id: BookingId) -> Result<Booking, BookingError>;
    /// every booking, newest first
    async fn list_all(&self) -> Result<Vec<Booking>, BookingError>;
    /// a customer's bookings, check-in descending
    async fn list_by_customer(&self, id: CustomerId) -> Result<Vec<Booking>, BookingError>;
    async fn list_by_customer_email(&self, email: &str) -> Result<Vec<Booking>, BookingError>;
    /// true iff no confirmed booking on the room overlaps `[check_in, check_out)`
    async fn is_room_available(
        &self,
        room_number: RoomNumber,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, BookingError>;
    /// confirmed bookings held by a customer; backs the directory delete guard
    async fn confirmed_count(&self, id: CustomerId) -> Result<i64, BookingError>;
}

async fn pool_from_config(config: &DbConfig) -> Result<PgPool, BookingError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.to_url())
        .await?;

    Ok(pool)
}

impl RoomInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn from_config(config: &DbConfig) -> Result<Self, BookingError> {
        Ok(Self::new(pool_from_config(config).await?))
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CustomerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn from_config(config: &DbConfig) -> Result<Self, BookingError> {
        Ok(Self::new(pool_from_config(config).await?))
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BookingManager {
    pub fn new(pool: PgPool) -> Self {
        let directory = CustomerDirectory::new(pool.clone());
        Self { pool, directory }
    }

    pub async fn from_config(config: &DbConfig) -> Result<Self, BookingError> {
        Ok(Self::new(pool_from_config(config).await?))
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn directory(&self) -> &CustomerDirectory {
        &self.directory
    }
}
