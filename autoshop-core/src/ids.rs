//! Identifier allocation.
//!
//! Mechanics, service requests, and closure records draw their ids from
//! per-kind sequences kept in the store itself, so allocation is serialized
//! by the store's own concurrency control and stays safe when several
//! sessions share one database file. The seeds are configuration; the first
//! allocated id is always seed + 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity kinds that draw from a store-managed id sequence.
///
/// Customers are absent: their ids are assigned by the front office and
/// supplied to the core with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Mechanic,
    Request,
    Closure,
}

impl IdKind {
    pub const ALL: [IdKind; 3] = [IdKind::Mechanic, IdKind::Request, IdKind::Closure];

    /// Key under which the sequence row is stored.
    pub fn key(self) -> &'static str {
        match self {
            IdKind::Mechanic => "mechanic",
            IdKind::Request => "request",
            IdKind::Closure => "closure",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Seed values for the id sequences.
///
/// The defaults preserve the legacy numbering: requests and closures start
/// above 30000 to stay clear of seeded data, mechanics above 250. Seeds only
/// matter when a database is first created; an existing database keeps its
/// counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdSeeds {
    pub mechanic: i64,
    pub request: i64,
    pub closure: i64,
}

impl Default for IdSeeds {
    fn default() -> Self {
        Self {
            mechanic: 250,
            request: 30000,
            closure: 30000,
        }
    }
}

impl IdSeeds {
    pub fn for_kind(&self, kind: IdKind) -> i64 {
        match kind {
            IdKind::Mechanic => self.mechanic,
            IdKind::Request => self.request,
            IdKind::Closure => self.closure,
        }
    }
}
