//! The store abstraction.
//!
//! `ShopStore` is the transactional query interface the core is written
//! against. Implementations must bind every user-supplied value as a
//! statement parameter and must execute each multi-statement operation as a
//! single atomic unit.

use crate::error::Result;
use crate::ids::IdKind;
use crate::ledger::{RequestClosure, RequestIntake};
use crate::models::{
    Car, ClosedRequest, Customer, Mechanic, NewMechanic, Ownership, ServiceRequest,
};
use crate::reports::{BillingLine, CustomerBill, CustomerName, ServiceCount};

pub trait ShopStore: Send + Sync {
    // =========================================================================
    // Identifier allocation
    // =========================================================================

    /// Allocates the next id for `kind`. Strictly increasing per kind;
    /// serialized by the store so independent sessions never collide.
    fn next_id(&self, kind: IdKind) -> Result<i64>;

    // =========================================================================
    // Entity writes
    // =========================================================================

    /// Inserts a customer. The id travels with the record; a duplicate is a
    /// `ConstraintViolation`.
    fn register_customer(&self, customer: &Customer) -> Result<i64>;

    /// Inserts a mechanic under a freshly allocated id and returns it.
    fn register_mechanic(&self, mechanic: &NewMechanic) -> Result<i64>;

    /// Inserts a car. A duplicate VIN is a `ConstraintViolation`.
    fn register_car(&self, car: &Car) -> Result<String>;

    /// Links a customer to a car. Either side missing is `NotFound`.
    /// Returns the ownership row id.
    fn record_ownership(&self, customer_id: i64, vin: &str) -> Result<i64>;

    // =========================================================================
    // Entity reads
    // =========================================================================

    /// Customers matching a last name exactly, ordered by id.
    fn find_customers_by_last_name(&self, last_name: &str) -> Result<Vec<Customer>>;

    /// Cars linked to a customer through ownership, ordered by VIN.
    fn cars_owned_by(&self, customer_id: i64) -> Result<Vec<Car>>;

    fn list_customers(&self) -> Result<Vec<Customer>>;

    fn list_mechanics(&self) -> Result<Vec<Mechanic>>;

    fn list_cars(&self) -> Result<Vec<Car>>;

    fn list_ownerships(&self) -> Result<Vec<Ownership>>;

    // =========================================================================
    // Request ledger
    // =========================================================================

    /// Inserts a service request under a freshly allocated id, after
    /// verifying in the same transaction that the customer and car exist.
    fn open_request(&self, intake: &RequestIntake) -> Result<i64>;

    /// Inserts the closure record for a still-open request. The open check
    /// and the insert are one atomic unit: of two racing closers, exactly
    /// one succeeds and the other sees `AlreadyClosed`.
    fn close_request(&self, closure: &RequestClosure) -> Result<i64>;

    fn get_request(&self, id: i64) -> Result<Option<ServiceRequest>>;

    fn get_closure(&self, id: i64) -> Result<Option<ClosedRequest>>;

    /// Requests with no closure record yet, ordered by id.
    fn list_open_requests(&self) -> Result<Vec<ServiceRequest>>;

    fn list_requests(&self) -> Result<Vec<ServiceRequest>>;

    fn list_closures(&self) -> Result<Vec<ClosedRequest>>;

    // =========================================================================
    // Reporting
    // =========================================================================

    fn customers_with_bill_under(&self, threshold: u32) -> Result<Vec<BillingLine>>;

    fn customers_owning_more_than(&self, count: u32) -> Result<Vec<CustomerName>>;

    fn cars_older_than_with_odometer_under(&self, year: u16, mileage: u32) -> Result<Vec<Car>>;

    fn top_cars_by_service_count(&self, limit: u32) -> Result<Vec<ServiceCount>>;

    fn customers_by_descending_total_bill(&self) -> Result<Vec<CustomerBill>>;
}
