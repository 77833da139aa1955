//! The service-request ledger.
//!
//! A request is **Open** from the moment its intake row exists and becomes
//! **Closed** when exactly one closure record references it. The transition
//! is one-directional and terminal; there is no reopen. Intake happens
//! before diagnosis, so the bill exists only on the closure record — a
//! request with no closure contributes nothing to billing totals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::ShopStore;
use crate::error::{Result, ShopError};
use crate::models;

/// A validated intake for a new service request.
///
/// Shape rules are enforced here, before any store access; the store
/// verifies that the customer and car actually exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestIntake {
    pub customer_id: i64,
    pub car_vin: String,
    pub opened_at: DateTime<Utc>,
    pub odometer: u32,
    pub complaint: String,
}

impl RequestIntake {
    /// `opened_at` defaults to the current time when not supplied.
    pub fn new(
        customer_id: i64,
        car_vin: impl Into<String>,
        odometer: u32,
        complaint: impl Into<String>,
        opened_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let car_vin = car_vin.into();
        models::check_vin(&car_vin)?;
        let complaint = complaint.into();
        if complaint.trim().is_empty() {
            return Err(ShopError::invalid("complaint", "must not be empty"));
        }
        Ok(Self {
            customer_id,
            car_vin,
            opened_at: opened_at.unwrap_or_else(Utc::now),
            odometer,
            complaint,
        })
    }
}

/// A validated closure for an open service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestClosure {
    pub request_id: i64,
    pub mechanic_id: i64,
    pub closed_on: NaiveDate,
    pub comments: Option<String>,
    pub bill: u32,
}

impl RequestClosure {
    pub fn new(
        request_id: i64,
        mechanic_id: i64,
        closed_on: NaiveDate,
        bill: u32,
        comments: Option<String>,
    ) -> Result<Self> {
        if bill == 0 {
            return Err(ShopError::invalid("bill", "must be a positive amount"));
        }
        // Blank comments are stored as absent.
        let comments = comments
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self {
            request_id,
            mechanic_id,
            closed_on,
            comments,
            bill,
        })
    }
}

/// Drives a request through its life: intake to closure.
pub struct RequestLedger<'a> {
    store: &'a dyn ShopStore,
}

impl<'a> RequestLedger<'a> {
    pub fn new(store: &'a dyn ShopStore) -> Self {
        Self { store }
    }

    /// Opens a service request and returns its allocated id. Every intake
    /// that passes validation is persisted.
    pub fn open(&self, intake: &RequestIntake) -> Result<i64> {
        let id = self.store.open_request(intake)?;
        tracing::debug!(
            request = id,
            customer = intake.customer_id,
            vin = %intake.car_vin,
            "opened service request"
        );
        Ok(id)
    }

    /// Closes a still-open request and returns the closure record's id.
    /// The open check and the insert are one atomic store operation, so a
    /// second close of the same request fails with `AlreadyClosed`.
    pub fn close(&self, closure: &RequestClosure) -> Result<i64> {
        let id = self.store.close_request(closure)?;
        tracing::debug!(
            closure = id,
            request = closure.request_id,
            bill = closure.bill,
            "closed service request"
        );
        Ok(id)
    }
}
