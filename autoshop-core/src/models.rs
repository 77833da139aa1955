//! Record types for the shop: customers, mechanics, cars, ownership, and
//! the two halves of a service request's life.
//!
//! Writable records are built through validating constructors so that
//! anything handed to the store already satisfies the field-shape rules;
//! the store only has to enforce referential and uniqueness rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ShopError};

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_PHONE_LEN: usize = 13;
pub const MAX_ADDRESS_LEN: usize = 256;
/// This shop's convention, narrower than the 17-character road standard.
pub const VIN_LEN: usize = 16;
pub const MAX_YEAR: u16 = 9999;

fn check_max(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(ShopError::invalid(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

fn check_required(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ShopError::invalid(field, "must not be empty"));
    }
    check_max(field, value, max)
}

pub(crate) fn check_vin(vin: &str) -> Result<()> {
    if vin.chars().count() != VIN_LEN {
        return Err(ShopError::invalid(
            "vin",
            format!("must be exactly {} characters", VIN_LEN),
        ));
    }
    Ok(())
}

/// A customer of the shop. The id is assigned by the front office and
/// supplied with the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self> {
        if id <= 0 {
            return Err(ShopError::invalid("customer id", "must be positive"));
        }
        let first_name = first_name.into();
        let last_name = last_name.into();
        let phone = phone.into();
        let address = address.into();
        check_max("first name", &first_name, MAX_NAME_LEN)?;
        check_max("last name", &last_name, MAX_NAME_LEN)?;
        check_max("phone", &phone, MAX_PHONE_LEN)?;
        check_max("address", &address, MAX_ADDRESS_LEN)?;
        Ok(Self {
            id,
            first_name,
            last_name,
            phone,
            address,
        })
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.id, self.first_name, self.last_name)
    }
}

/// A mechanic employed by the shop, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mechanic {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub experience_years: u32,
}

impl fmt::Display for Mechanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} ({} yr)",
            self.id, self.first_name, self.last_name, self.experience_years
        )
    }
}

/// Input for registering a mechanic; the id is allocated at insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMechanic {
    pub first_name: String,
    pub last_name: String,
    pub experience_years: u32,
}

impl NewMechanic {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        experience_years: u32,
    ) -> Result<Self> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        check_required("first name", &first_name, MAX_NAME_LEN)?;
        check_required("last name", &last_name, MAX_NAME_LEN)?;
        Ok(Self {
            first_name,
            last_name,
            experience_years,
        })
    }
}

/// A car, keyed by its VIN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: u16,
}

impl Car {
    pub fn new(
        vin: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: u16,
    ) -> Result<Self> {
        let vin = vin.into();
        let make = make.into();
        let model = model.into();
        check_vin(&vin)?;
        check_required("make", &make, MAX_NAME_LEN)?;
        check_required("model", &model, MAX_NAME_LEN)?;
        if year > MAX_YEAR {
            return Err(ShopError::invalid("year", "must be at most 4 digits"));
        }
        Ok(Self {
            vin,
            make,
            model,
            year,
        })
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} [{}]", self.year, self.make, self.model, self.vin)
    }
}

/// Links a customer to a car they own. The row id is store-managed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ownership {
    pub id: i64,
    pub customer_id: i64,
    pub car_vin: String,
}

/// An open service request: the intake half of the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub customer_id: i64,
    pub car_vin: String,
    pub opened_at: DateTime<Utc>,
    pub odometer: u32,
    pub complaint: String,
}

impl fmt::Display for ServiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} at {} mi: {}",
            self.id, self.car_vin, self.odometer, self.complaint
        )
    }
}

/// The closure record finalizing exactly one service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedRequest {
    pub id: i64,
    pub request_id: i64,
    pub mechanic_id: i64,
    pub closed_on: NaiveDate,
    pub comments: Option<String>,
    pub bill: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_rejects_overlong_fields() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            Customer::new(601, long, "Doe", "555-0100", "12 Main St"),
            Err(ShopError::InvalidArgument { field: "first name", .. })
        ));
        let long_phone = "5".repeat(MAX_PHONE_LEN + 1);
        assert!(matches!(
            Customer::new(601, "Jane", "Doe", long_phone, "12 Main St"),
            Err(ShopError::InvalidArgument { field: "phone", .. })
        ));
    }

    #[test]
    fn customer_id_must_be_positive() {
        assert!(Customer::new(0, "Jane", "Doe", "555-0100", "12 Main St").is_err());
        assert!(Customer::new(601, "Jane", "Doe", "555-0100", "12 Main St").is_ok());
    }

    #[test]
    fn mechanic_names_are_required() {
        assert!(matches!(
            NewMechanic::new("", "Hobbs", 7),
            Err(ShopError::InvalidArgument { field: "first name", .. })
        ));
        assert!(NewMechanic::new("Ray", "Hobbs", 0).is_ok());
    }

    #[test]
    fn vin_must_be_exactly_sixteen_characters() {
        assert!(Car::new("1HGCM82633A00435", "Honda", "Civic", 1993).is_ok());
        assert!(Car::new("1HGCM82633A004352", "Honda", "Civic", 1993).is_err());
        assert!(Car::new("SHORT", "Honda", "Civic", 1993).is_err());
    }

    #[test]
    fn car_year_is_capped_at_four_digits() {
        assert!(Car::new("1HGCM82633A00435", "Honda", "Civic", 10000).is_err());
    }
}
