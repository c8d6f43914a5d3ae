use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{BookingError, CustomerId, Validator};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Contact details for a customer that may not exist in the directory yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerInfo {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

impl Validator for CustomerInfo {
    fn validate(&self) -> Result<(), BookingError> {
        if self.name.trim().is_empty() {
            return Err(BookingError::InvalidName);
        }

        if !self.email.contains('@') || !self.email.contains('.') {
            return Err(BookingError::InvalidEmail(self.email.clone()));
        }

        if self.phone.len() != 10 || !self.phone.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BookingError::InvalidPhone(self.phone.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_contact_details_should_pass() {
        let info = CustomerInfo::new("Alice", "alice@example.com", "1234567890");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn empty_name_should_be_rejected() {
        let info = CustomerInfo::new("  ", "alice@example.com", "1234567890");
        assert_eq!(info.validate().unwrap_err(), BookingError::InvalidName);
    }

    #[test]
    fn email_without_at_sign_should_be_rejected() {
        let info = CustomerInfo::new("A", "a.example.com", "1234567890");
        assert_eq!(
            info.validate().unwrap_err(),
            BookingError::InvalidEmail("a.example.com".to_string())
        );
    }

    #[test]
    fn email_without_dot_should_be_rejected() {
        let info = CustomerInfo::new("A", "a@example", "1234567890");
        assert!(info.validate().is_err());
    }

    #[test]
    fn dashed_phone_should_be_rejected() {
        let info = CustomerInfo::new("A", "a@x.com", "123-456-7890");
        assert_eq!(
            info.validate().unwrap_err(),
            BookingError::InvalidPhone("123-456-7890".to_string())
        );
    }

    #[test]
    fn short_phone_should_be_rejected() {
        let info = CustomerInfo::new("A", "a@x.com", "12345");
        assert!(info.validate().is_err());
    }
}
