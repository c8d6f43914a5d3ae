use abi::{BookingError, Customer, CustomerId, CustomerInfo, Validator};
use async_trait::async_trait;
use sqlx::Row;

use crate::{CustomerDirectory, Directory, Ledger};

#[async_trait]
impl Directory for CustomerDirectory {
    async fn create(&self, info: CustomerInfo) -> Result<Customer, BookingError> {
        info.validate()?;

        let row = sqlx::query(
            "INSERT INTO hotel.customers (name, email, phone) VALUES ($1, $2, $3) RETURNING customer_id",
        )
        .bind(&info.name)
        .bind(&info.email)
        .bind(&info.phone)
        .fetch_one(self.pool())
        .await?;

        let customer_id: CustomerId = row.try_get(0)?;
        tracing::info!(customer_id, "customer created");

        Ok(Customer {
            customer_id,
            name: info.name,
            email: info.email,
            phone: info.phone,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Customer, BookingError> {
        let customer = sqlx::query_as(
            "SELECT customer_id, name, email, phone FROM hotel.customers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        customer.ok_or_else(|| BookingError::CustomerEmailNotFound(email.to_string()))
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Customer, BookingError> {
        let customer = sqlx::query_as(
            "SELECT customer_id, name, email, phone FROM hotel.customers WHERE customer_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        customer.ok_or(BookingError::CustomerNotFound(id))
    }

    async fn find_or_create(&self, info: CustomerInfo) -> Result<CustomerId, BookingError> {
        info.validate()?;

        // upsert keyed on the email; the no-op DO UPDATE makes RETURNING
        // yield the existing row's id instead of nothing
        let row = sqlx::query(
            "INSERT INTO hotel.customers (name, email, phone) VALUES ($1, $2, $3) ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email RETURNING customer_id",
        )
        .bind(&info.name)
        .bind(&info.email)
        .bind(&info.phone)
        .fetch_one(self.pool())
        .await?;

        Ok(row.try_get(0)?)
    }

    async fn update(&self, id: CustomerId, info: CustomerInfo) -> Result<Customer, BookingError> {
        info.validate()?;

        let customer = sqlx::query_as(
            "UPDATE hotel.customers SET name = $1, email = $2, phone = $3 WHERE customer_id = $4 RETURNING customer_id, name, email, phone",
        )
        .bind(&info.name)
        .bind(&info.email)
        .bind(&info.phone)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        customer.ok_or(BookingError::CustomerNotFound(id))
    }

    async fn delete(
        &self,
        id: CustomerId,
        ledger: &(dyn Ledger + Sync),
    ) -> Result<(), BookingError> {
        let active = ledger.confirmed_count(id).await?;
        if active > 0 {
            tracing::warn!(customer_id = id, active, "refusing to delete customer");
            return Err(BookingError::CustomerHasBookings { id, active });
        }

        let done = sqlx::query("DELETE FROM hotel.customers WHERE customer_id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if done.rows_affected() == 0 {
            return Err(BookingError::CustomerNotFound(id));
        }

        tracing::info!(customer_id = id, "customer deleted");
        Ok(())
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Customer>, BookingError> {
        let customers = sqlx::query_as(
            "SELECT customer_id, name, email, phone FROM hotel.customers WHERE name ILIKE $1 ORDER BY name",
        )
        .bind(format!("%{}%", name))
        .fetch_all(self.pool())
        .await?;

        Ok(customers)
    }

    async fn list_all(&self) -> Result<Vec<Customer>, BookingError> {
        let customers = sqlx::query_as(
            "SELECT customer_id, name, email, phone FROM hotel.customers ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CustomerInfo {
        CustomerInfo::new("Alice", "alice@example.com", "1234567890")
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn create_and_lookups_should_work() {
        let directory = CustomerDirectory::new(pool.clone());

        let created = directory.create(alice()).await.unwrap();
        assert_eq!(created.name, "Alice");

        let by_email = directory.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email, created);

        let by_id = directory.find_by_id(created.customer_id).await.unwrap();
        assert_eq!(by_id, created);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn duplicate_email_should_be_rejected() {
        let directory = CustomerDirectory::new(pool.clone());
        directory.create(alice()).await.unwrap();

        let err = directory
            .create(CustomerInfo::new("Other", "alice@example.com", "0987654321"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateEmail(_)));
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn find_or_create_should_return_one_id_per_email() {
        let directory = CustomerDirectory::new(pool.clone());

        let first = directory.find_or_create(alice()).await.unwrap();
        let second = directory.find_or_create(alice()).await.unwrap();
        let third = directory
            .find_or_create(CustomerInfo::new("Alice B", "alice@example.com", "1112223333"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(directory.list_all().await.unwrap().len(), 1);
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn invalid_contact_details_should_never_reach_the_store() {
        let directory = CustomerDirectory::new(pool.clone());

        let err = directory
            .create(CustomerInfo::new("A", "a.example.com", "1234567890"))
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::InvalidEmail("a.example.com".to_string()));
        assert!(directory.list_all().await.unwrap().is_empty());
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn update_should_enforce_email_uniqueness() {
        let directory = CustomerDirectory::new(pool.clone());
        let alice = directory.create(alice()).await.unwrap();
        directory
            .create(CustomerInfo::new("Bob", "bob@example.com", "0987654321"))
            .await
            .unwrap();

        let updated = directory
            .update(
                alice.customer_id,
                CustomerInfo::new("Alice Smith", "alice@example.com", "1234567890"),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alice Smith");

        let err = directory
            .update(
                alice.customer_id,
                CustomerInfo::new("Alice", "bob@example.com", "1234567890"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateEmail(_)));

        let err = directory
            .update(9999, CustomerInfo::new("Nobody", "no@x.com", "1234567890"))
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::CustomerNotFound(9999));
    }

    #[sqlx_database_tester::test(pool(variable = "pool", migrations = "../migrations"))]
    async fn search_by_name_should_be_case_insensitive() {
        let directory = CustomerDirectory::new(pool.clone());
        directory.create(alice()).await.unwrap();
        directory
            .create(CustomerInfo::new("alina", "alina@example.com", "2223334444"))
            .await
            .unwrap();
        directory
            .create(CustomerInfo::new("Bob", "bob@example.com", "0987654321"))
            .await
            .unwrap();

        let hits = directory.search_by_name("ali").await.unwrap();
        let names: Vec<_> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "alina"]);
    }
}
