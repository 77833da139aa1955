pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod ids;
pub mod ledger;
pub mod models;
pub mod repo;
pub mod reports;

// Re-export commonly used types
pub use config::{default_config_path, default_database_path, ShopConfig};
pub use db::{open_store, ShopStore, SqliteStore};
pub use error::{Entity, Result, ShopError};
pub use export::{snapshot, to_json, ShopSnapshot};
pub use ids::{IdKind, IdSeeds};
pub use ledger::{RequestClosure, RequestIntake, RequestLedger};
pub use models::{
    Car, ClosedRequest, Customer, Mechanic, NewMechanic, Ownership, ServiceRequest,
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PHONE_LEN, MAX_YEAR, VIN_LEN,
};
pub use repo::EntityRepository;
pub use reports::{BillingLine, CustomerBill, CustomerName, ReportingEngine, ServiceCount};
