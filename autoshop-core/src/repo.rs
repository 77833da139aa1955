//! Thin typed façade over the store for entity registration and lookup.
//!
//! Records arrive already validated (the constructors in `models` enforce
//! the field-shape rules); the store enforces uniqueness and references.

use crate::db::ShopStore;
use crate::error::Result;
use crate::models::{Car, Customer, Mechanic, NewMechanic};

pub struct EntityRepository<'a> {
    store: &'a dyn ShopStore,
}

impl<'a> EntityRepository<'a> {
    pub fn new(store: &'a dyn ShopStore) -> Self {
        Self { store }
    }

    /// Registers a customer under the id carried by the record.
    pub fn register_customer(&self, customer: &Customer) -> Result<i64> {
        let id = self.store.register_customer(customer)?;
        tracing::debug!(customer = id, "registered customer");
        Ok(id)
    }

    /// Registers a mechanic and returns the allocated id.
    pub fn register_mechanic(&self, mechanic: &NewMechanic) -> Result<i64> {
        let id = self.store.register_mechanic(mechanic)?;
        tracing::debug!(mechanic = id, "registered mechanic");
        Ok(id)
    }

    /// Registers a car under its VIN.
    pub fn register_car(&self, car: &Car) -> Result<String> {
        let vin = self.store.register_car(car)?;
        tracing::debug!(vin = %vin, "registered car");
        Ok(vin)
    }

    /// Links a customer to a car and returns the ownership row id.
    pub fn record_ownership(&self, customer_id: i64, vin: &str) -> Result<i64> {
        let id = self.store.record_ownership(customer_id, vin)?;
        tracing::debug!(customer = customer_id, vin = %vin, "recorded ownership");
        Ok(id)
    }

    /// Exact-match search, ordered by customer id.
    pub fn find_customers_by_last_name(&self, last_name: &str) -> Result<Vec<Customer>> {
        self.store.find_customers_by_last_name(last_name)
    }

    /// Cars linked to the customer through ownership, ordered by VIN.
    pub fn cars_owned_by(&self, customer_id: i64) -> Result<Vec<Car>> {
        self.store.cars_owned_by(customer_id)
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        self.store.list_customers()
    }

    pub fn list_mechanics(&self) -> Result<Vec<Mechanic>> {
        self.store.list_mechanics()
    }

    pub fn list_cars(&self) -> Result<Vec<Car>> {
        self.store.list_cars()
    }
}
