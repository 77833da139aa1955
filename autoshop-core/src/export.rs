//! JSON export of the full store contents.

use anyhow::Result;
use serde::Serialize;

use crate::db::ShopStore;
use crate::models::{Car, ClosedRequest, Customer, Mechanic, Ownership, ServiceRequest};

/// Everything in the store, in insertion order per table.
#[derive(Debug, Serialize)]
pub struct ShopSnapshot {
    pub customers: Vec<Customer>,
    pub mechanics: Vec<Mechanic>,
    pub cars: Vec<Car>,
    pub ownerships: Vec<Ownership>,
    pub service_requests: Vec<ServiceRequest>,
    pub closed_requests: Vec<ClosedRequest>,
}

pub fn snapshot(store: &dyn ShopStore) -> crate::error::Result<ShopSnapshot> {
    Ok(ShopSnapshot {
        customers: store.list_customers()?,
        mechanics: store.list_mechanics()?,
        cars: store.list_cars()?,
        ownerships: store.list_ownerships()?,
        service_requests: store.list_requests()?,
        closed_requests: store.list_closures()?,
    })
}

/// Renders the snapshot as pretty-printed JSON.
pub fn to_json(store: &dyn ShopStore) -> Result<String> {
    let snapshot = snapshot(store)?;
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::ids::IdSeeds;
    use crate::models::NewMechanic;
    use tempfile::NamedTempFile;

    #[test]
    fn snapshot_covers_every_table() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = SqliteStore::open(file.path(), &IdSeeds::default()).unwrap();

        let jane = Customer::new(601, "Jane", "Doe", "555-0100", "12 Main St").unwrap();
        store.register_customer(&jane).unwrap();
        store
            .register_mechanic(&NewMechanic::new("Ray", "Hobbs", 12).unwrap())
            .unwrap();

        let json = to_json(&store).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["customers"][0]["last_name"], "Doe");
        assert_eq!(value["mechanics"][0]["id"], 251);
        assert!(value["cars"].as_array().unwrap().is_empty());
        assert!(value["closed_requests"].as_array().unwrap().is_empty());
    }
}
