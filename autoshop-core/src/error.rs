//! Error taxonomy for shop operations.
//!
//! Field-shape problems are rejected as `InvalidArgument` before any store
//! access; referential and state problems surface from the store as
//! `NotFound` / `AlreadyClosed`. Uniqueness failures the store itself
//! detects become `ConstraintViolation`, and everything else wrong with the
//! store connection is `StoreUnavailable`.

use std::fmt;
use thiserror::Error;

/// The entity kinds a failed lookup can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Customer,
    Mechanic,
    Car,
    ServiceRequest,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Customer => write!(f, "customer"),
            Entity::Mechanic => write!(f, "mechanic"),
            Entity::Car => write!(f, "car"),
            Entity::ServiceRequest => write!(f, "service request"),
        }
    }
}

/// Typed failures returned by every core operation.
#[derive(Debug, Error)]
pub enum ShopError {
    /// A field failed shape validation (length, range, required-ness).
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} {key} not found")]
    NotFound { entity: Entity, key: String },

    /// The service request already has a closure record.
    #[error("service request {0} is already closed")]
    AlreadyClosed(i64),

    /// The store rejected the write (duplicate key, check failure).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store connection or transaction failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] rusqlite::Error),
}

impl ShopError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ShopError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: Entity, key: impl ToString) -> Self {
        ShopError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ShopError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ShopError::ConstraintViolation(message.unwrap_or_else(|| code.to_string()))
            }
            other => ShopError::StoreUnavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
