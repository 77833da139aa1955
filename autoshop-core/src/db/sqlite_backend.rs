//! SQLite implementation of the shop store.
//!
//! Connection discipline: one `Mutex<Connection>` per store, WAL journal
//! mode, foreign keys on. Every statement binds its values as parameters,
//! and every multi-statement operation runs inside a scoped transaction so
//! the rollback path is simply the drop path.

use anyhow::Result as BootResult;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Entity, Result, ShopError};
use crate::ids::{IdKind, IdSeeds};
use crate::ledger::{RequestClosure, RequestIntake};
use crate::models::{
    Car, ClosedRequest, Customer, Mechanic, NewMechanic, Ownership, ServiceRequest,
};
use crate::reports::{BillingLine, CustomerBill, CustomerName, ServiceCount};

use super::traits::ShopStore;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and prepares the schema
    /// and id sequences. `seeds` only take effect on first creation; an
    /// existing database keeps its counters.
    pub fn open<P: AsRef<Path>>(path: P, seeds: &IdSeeds) -> BootResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let store = Self {
            path,
            conn: Mutex::new(conn),
        };

        store.init_schema(seeds)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_schema(&self, seeds: &IdSeeds) -> BootResult<()> {
        let conn = self.conn.lock().unwrap();

        let current_version: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if current_version == 0 {
            conn.execute_batch(include_str!("schema.sql"))?;
        } else if current_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is not supported, expected {}",
                current_version,
                SCHEMA_VERSION
            );
        }

        let mut stmt = conn.prepare("INSERT OR IGNORE INTO sequences (kind, value) VALUES (?1, ?2)")?;
        for kind in IdKind::ALL {
            stmt.execute(params![kind.key(), seeds.for_kind(kind)])?;
        }

        Ok(())
    }

    /// Bumps and reads the sequence for `kind`. Must run inside the
    /// caller's transaction when the id feeds an insert.
    fn next_id_in(conn: &Connection, kind: IdKind) -> Result<i64> {
        let updated = conn.execute(
            "UPDATE sequences SET value = value + 1 WHERE kind = ?1",
            params![kind.key()],
        )?;
        if updated == 0 {
            return Err(ShopError::ConstraintViolation(format!(
                "id sequence '{}' is missing",
                kind
            )));
        }
        let value = conn.query_row(
            "SELECT value FROM sequences WHERE kind = ?1",
            params![kind.key()],
            |row| row.get(0),
        )?;
        Ok(value)
    }

    fn exists(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<bool> {
        let hit = conn
            .query_row(sql, params, |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(hit.is_some())
    }

    fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
        Ok(Customer {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            phone: row.get(3)?,
            address: row.get(4)?,
        })
    }

    fn mechanic_from_row(row: &Row<'_>) -> rusqlite::Result<Mechanic> {
        Ok(Mechanic {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            experience_years: row.get(3)?,
        })
    }

    fn car_from_row(row: &Row<'_>) -> rusqlite::Result<Car> {
        Ok(Car {
            vin: row.get(0)?,
            make: row.get(1)?,
            model: row.get(2)?,
            year: row.get(3)?,
        })
    }

    fn request_from_row(row: &Row<'_>) -> rusqlite::Result<(ServiceRequest, String)> {
        let opened_at: String = row.get(3)?;
        Ok((
            ServiceRequest {
                id: row.get(0)?,
                customer_id: row.get(1)?,
                car_vin: row.get(2)?,
                opened_at: Utc::now(),
                odometer: row.get(4)?,
                complaint: row.get(5)?,
            },
            opened_at,
        ))
    }

    fn closure_from_row(row: &Row<'_>) -> rusqlite::Result<(ClosedRequest, String)> {
        let closed_on: String = row.get(3)?;
        Ok((
            ClosedRequest {
                id: row.get(0)?,
                request_id: row.get(1)?,
                mechanic_id: row.get(2)?,
                closed_on: NaiveDate::MIN,
                comments: row.get(4)?,
                bill: row.get(5)?,
            },
            closed_on,
        ))
    }

    fn collect_requests(
        rows: impl Iterator<Item = rusqlite::Result<(ServiceRequest, String)>>,
    ) -> Result<Vec<ServiceRequest>> {
        let mut out = Vec::new();
        for row in rows {
            let (mut request, opened_at) = row?;
            request.opened_at = parse_timestamp(&opened_at);
            out.push(request);
        }
        Ok(out)
    }

    fn collect_closures(
        rows: impl Iterator<Item = rusqlite::Result<(ClosedRequest, String)>>,
    ) -> Result<Vec<ClosedRequest>> {
        let mut out = Vec::new();
        for row in rows {
            let (mut closure, closed_on) = row?;
            closure.closed_on = parse_date(&closed_on);
            out.push(closure);
        }
        Ok(out)
    }
}

/// Lenient timestamp read; a malformed stored value falls back to now.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

impl ShopStore for SqliteStore {
    fn next_id(&self, kind: IdKind) -> Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let id = Self::next_id_in(&tx, kind)?;
        tx.commit()?;
        Ok(id)
    }

    fn register_customer(&self, customer: &Customer) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO customers (id, first_name, last_name, phone, address)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                customer.id,
                customer.first_name,
                customer.last_name,
                customer.phone,
                customer.address,
            ],
        )?;
        Ok(customer.id)
    }

    fn register_mechanic(&self, mechanic: &NewMechanic) -> Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let id = Self::next_id_in(&tx, IdKind::Mechanic)?;
        tx.execute(
            "INSERT INTO mechanics (id, first_name, last_name, experience_years)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                mechanic.first_name,
                mechanic.last_name,
                mechanic.experience_years,
            ],
        )?;
        tx.commit()?;
        Ok(id)
    }

    fn register_car(&self, car: &Car) -> Result<String> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cars (vin, make, model, year) VALUES (?1, ?2, ?3, ?4)",
            params![car.vin, car.make, car.model, car.year],
        )?;
        Ok(car.vin.clone())
    }

    fn record_ownership(&self, customer_id: i64, vin: &str) -> Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        if !Self::exists(&tx, "SELECT 1 FROM customers WHERE id = ?1", params![customer_id])? {
            return Err(ShopError::not_found(Entity::Customer, customer_id));
        }
        if !Self::exists(&tx, "SELECT 1 FROM cars WHERE vin = ?1", params![vin])? {
            return Err(ShopError::not_found(Entity::Car, vin));
        }
        tx.execute(
            "INSERT INTO ownerships (customer_id, car_vin) VALUES (?1, ?2)",
            params![customer_id, vin],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn find_customers_by_last_name(&self, last_name: &str) -> Result<Vec<Customer>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, phone, address
             FROM customers WHERE last_name = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![last_name], Self::customer_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn cars_owned_by(&self, customer_id: i64) -> Result<Vec<Car>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT c.vin, c.make, c.model, c.year
             FROM cars c
             JOIN ownerships o ON o.car_vin = c.vin
             WHERE o.customer_id = ?1
             ORDER BY c.vin",
        )?;
        let rows = stmt.query_map(params![customer_id], Self::car_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, phone, address FROM customers ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::customer_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn list_mechanics(&self) -> Result<Vec<Mechanic>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, experience_years FROM mechanics ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::mechanic_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn list_cars(&self) -> Result<Vec<Car>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT vin, make, model, year FROM cars ORDER BY vin")?;
        let rows = stmt.query_map([], Self::car_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn list_ownerships(&self) -> Result<Vec<Ownership>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, customer_id, car_vin FROM ownerships ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Ownership {
                id: row.get(0)?,
                customer_id: row.get(1)?,
                car_vin: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn open_request(&self, intake: &RequestIntake) -> Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        if !Self::exists(
            &tx,
            "SELECT 1 FROM customers WHERE id = ?1",
            params![intake.customer_id],
        )? {
            return Err(ShopError::not_found(Entity::Customer, intake.customer_id));
        }
        if !Self::exists(&tx, "SELECT 1 FROM cars WHERE vin = ?1", params![intake.car_vin])? {
            return Err(ShopError::not_found(Entity::Car, &intake.car_vin));
        }
        let id = Self::next_id_in(&tx, IdKind::Request)?;
        tx.execute(
            "INSERT INTO service_requests (id, customer_id, car_vin, opened_at, odometer, complaint)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                intake.customer_id,
                intake.car_vin,
                intake.opened_at.to_rfc3339(),
                intake.odometer,
                intake.complaint,
            ],
        )?;
        tx.commit()?;
        Ok(id)
    }

    fn close_request(&self, closure: &RequestClosure) -> Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let opened_at: Option<String> = tx
            .query_row(
                "SELECT opened_at FROM service_requests WHERE id = ?1",
                params![closure.request_id],
                |row| row.get(0),
            )
            .optional()?;
        let opened_at = match opened_at {
            Some(ts) => parse_timestamp(&ts),
            None => {
                return Err(ShopError::not_found(
                    Entity::ServiceRequest,
                    closure.request_id,
                ))
            }
        };

        if !Self::exists(
            &tx,
            "SELECT 1 FROM mechanics WHERE id = ?1",
            params![closure.mechanic_id],
        )? {
            return Err(ShopError::not_found(Entity::Mechanic, closure.mechanic_id));
        }

        if Self::exists(
            &tx,
            "SELECT 1 FROM closed_requests WHERE request_id = ?1",
            params![closure.request_id],
        )? {
            return Err(ShopError::AlreadyClosed(closure.request_id));
        }

        if closure.closed_on < opened_at.date_naive() {
            return Err(ShopError::invalid(
                "closing date",
                format!("precedes the request's open date {}", opened_at.date_naive()),
            ));
        }

        let id = Self::next_id_in(&tx, IdKind::Closure)?;
        tx.execute(
            "INSERT INTO closed_requests (id, request_id, mechanic_id, closed_on, comments, bill)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                closure.request_id,
                closure.mechanic_id,
                closure.closed_on.to_string(),
                closure.comments,
                closure.bill,
            ],
        )?;
        tx.commit()?;
        Ok(id)
    }

    fn get_request(&self, id: i64) -> Result<Option<ServiceRequest>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, customer_id, car_vin, opened_at, odometer, complaint
                 FROM service_requests WHERE id = ?1",
                params![id],
                Self::request_from_row,
            )
            .optional()?;
        Ok(row.map(|(mut request, opened_at)| {
            request.opened_at = parse_timestamp(&opened_at);
            request
        }))
    }

    fn get_closure(&self, id: i64) -> Result<Option<ClosedRequest>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, request_id, mechanic_id, closed_on, comments, bill
                 FROM closed_requests WHERE id = ?1",
                params![id],
                Self::closure_from_row,
            )
            .optional()?;
        Ok(row.map(|(mut closure, closed_on)| {
            closure.closed_on = parse_date(&closed_on);
            closure
        }))
    }

    fn list_open_requests(&self) -> Result<Vec<ServiceRequest>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT sr.id, sr.customer_id, sr.car_vin, sr.opened_at, sr.odometer, sr.complaint
             FROM service_requests sr
             WHERE NOT EXISTS (SELECT 1 FROM closed_requests cr WHERE cr.request_id = sr.id)
             ORDER BY sr.id",
        )?;
        let rows = stmt.query_map([], Self::request_from_row)?;
        Self::collect_requests(rows)
    }

    fn list_requests(&self) -> Result<Vec<ServiceRequest>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, customer_id, car_vin, opened_at, odometer, complaint
             FROM service_requests ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::request_from_row)?;
        Self::collect_requests(rows)
    }

    fn list_closures(&self) -> Result<Vec<ClosedRequest>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, request_id, mechanic_id, closed_on, comments, bill
             FROM closed_requests ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::closure_from_row)?;
        Self::collect_closures(rows)
    }

    fn customers_with_bill_under(&self, threshold: u32) -> Result<Vec<BillingLine>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT cu.first_name, cu.last_name, cr.closed_on, cr.comments, cr.bill
             FROM closed_requests cr
             JOIN service_requests sr ON sr.id = cr.request_id
             JOIN customers cu ON cu.id = sr.customer_id
             WHERE cr.bill < ?1
             ORDER BY cr.id",
        )?;
        let rows = stmt.query_map(params![threshold], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (first_name, last_name, closed_on, comments, bill) = row?;
            out.push(BillingLine {
                first_name,
                last_name,
                closed_on: parse_date(&closed_on),
                comments,
                bill,
            });
        }
        Ok(out)
    }

    fn customers_owning_more_than(&self, count: u32) -> Result<Vec<CustomerName>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT cu.first_name, cu.last_name
             FROM customers cu
             JOIN ownerships o ON o.customer_id = cu.id
             GROUP BY cu.id
             HAVING COUNT(DISTINCT o.car_vin) > ?1
             ORDER BY cu.id",
        )?;
        let rows = stmt.query_map(params![count], |row| {
            Ok(CustomerName {
                first_name: row.get(0)?,
                last_name: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn cars_older_than_with_odometer_under(&self, year: u16, mileage: u32) -> Result<Vec<Car>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT c.vin, c.make, c.model, c.year
             FROM cars c
             JOIN service_requests sr ON sr.car_vin = c.vin
             WHERE c.year < ?1 AND sr.odometer < ?2
             ORDER BY c.year, c.vin",
        )?;
        let rows = stmt.query_map(params![year, mileage], Self::car_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn top_cars_by_service_count(&self, limit: u32) -> Result<Vec<ServiceCount>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT c.make, c.model, COUNT(*) AS requests
             FROM cars c
             JOIN service_requests sr ON sr.car_vin = c.vin
             GROUP BY c.make, c.model
             ORDER BY COUNT(*) DESC, c.make, c.model
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(ServiceCount {
                make: row.get(0)?,
                model: row.get(1)?,
                requests: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn customers_by_descending_total_bill(&self) -> Result<Vec<CustomerBill>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT cu.first_name, cu.last_name, SUM(cr.bill) AS total_bill
             FROM customers cu
             JOIN service_requests sr ON sr.customer_id = cu.id
             JOIN closed_requests cr ON cr.request_id = sr.id
             GROUP BY cu.id
             ORDER BY total_bill DESC, cu.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CustomerBill {
                first_name: row.get(0)?,
                last_name: row.get(1)?,
                total_bill: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn open_store(file: &NamedTempFile) -> SqliteStore {
        SqliteStore::open(file.path(), &IdSeeds::default()).unwrap()
    }

    #[test]
    fn sequences_start_above_their_seeds() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        assert_eq!(store.next_id(IdKind::Mechanic).unwrap(), 251);
        assert_eq!(store.next_id(IdKind::Mechanic).unwrap(), 252);
        assert_eq!(store.next_id(IdKind::Request).unwrap(), 30001);
        assert_eq!(store.next_id(IdKind::Closure).unwrap(), 30001);
    }

    #[test]
    fn sequences_survive_reopen_and_ignore_new_seeds() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);
        store.next_id(IdKind::Request).unwrap();
        drop(store);

        let reseeded = IdSeeds {
            mechanic: 1,
            request: 1,
            closure: 1,
        };
        let store = SqliteStore::open(file.path(), &reseeded).unwrap();
        assert_eq!(store.next_id(IdKind::Request).unwrap(), 30002);
    }

    #[test]
    fn duplicate_customer_id_is_a_constraint_violation() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        let jane = Customer::new(601, "Jane", "Doe", "555-0100", "12 Main St").unwrap();
        assert_eq!(store.register_customer(&jane).unwrap(), 601);
        assert!(matches!(
            store.register_customer(&jane),
            Err(ShopError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn duplicate_vin_is_a_constraint_violation() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        let car = Car::new("1HGCM82633A00435", "Honda", "Civic", 1993).unwrap();
        store.register_car(&car).unwrap();
        assert!(matches!(
            store.register_car(&car),
            Err(ShopError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn ownership_requires_both_sides() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        let jane = Customer::new(601, "Jane", "Doe", "555-0100", "12 Main St").unwrap();
        store.register_customer(&jane).unwrap();

        assert!(matches!(
            store.record_ownership(999, "1HGCM82633A00435"),
            Err(ShopError::NotFound {
                entity: Entity::Customer,
                ..
            })
        ));
        assert!(matches!(
            store.record_ownership(601, "1HGCM82633A00435"),
            Err(ShopError::NotFound {
                entity: Entity::Car,
                ..
            })
        ));

        let car = Car::new("1HGCM82633A00435", "Honda", "Civic", 1993).unwrap();
        store.register_car(&car).unwrap();
        let id = store.record_ownership(601, "1HGCM82633A00435").unwrap();
        assert!(id > 0);

        let owned = store.cars_owned_by(601).unwrap();
        assert_eq!(owned, vec![car]);
    }

    #[test]
    fn last_name_search_is_exact_and_ordered() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        for (id, first) in [(603, "Carol"), (601, "Jane"), (602, "John")] {
            let c = Customer::new(id, first, "Doe", "555-0100", "12 Main St").unwrap();
            store.register_customer(&c).unwrap();
        }
        let smith = Customer::new(700, "Ann", "Smith", "555-0101", "9 Elm St").unwrap();
        store.register_customer(&smith).unwrap();

        let does = store.find_customers_by_last_name("Doe").unwrap();
        let ids: Vec<i64> = does.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![601, 602, 603]);
        assert!(store.find_customers_by_last_name("doe").unwrap().is_empty());
    }

    #[test]
    fn open_request_checks_references_in_order() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        let intake =
            RequestIntake::new(601, "1HGCM82633A00435", 40000, "brake noise", None).unwrap();
        assert!(matches!(
            store.open_request(&intake),
            Err(ShopError::NotFound {
                entity: Entity::Customer,
                ..
            })
        ));

        let jane = Customer::new(601, "Jane", "Doe", "555-0100", "12 Main St").unwrap();
        store.register_customer(&jane).unwrap();
        assert!(matches!(
            store.open_request(&intake),
            Err(ShopError::NotFound {
                entity: Entity::Car,
                ..
            })
        ));

        let car = Car::new("1HGCM82633A00435", "Honda", "Civic", 1993).unwrap();
        store.register_car(&car).unwrap();
        let id = store.open_request(&intake).unwrap();
        assert_eq!(id, 30001);

        let stored = store.get_request(id).unwrap().unwrap();
        assert_eq!(stored.complaint, "brake noise");
        assert_eq!(stored.odometer, 40000);
    }

    #[test]
    fn failed_open_consumes_no_request_id() {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = open_store(&file);

        let jane = Customer::new(601, "Jane", "Doe", "555-0100", "12 Main St").unwrap();
        store.register_customer(&jane).unwrap();
        let car = Car::new("1HGCM82633A00435", "Honda", "Civic", 1993).unwrap();
        store.register_car(&car).unwrap();

        let bad = RequestIntake::new(601, "MISSINGMISSING16", 10, "squeak", None).unwrap();
        assert!(store.open_request(&bad).is_err());

        let good = RequestIntake::new(601, "1HGCM82633A00435", 10, "squeak", None).unwrap();
        assert_eq!(store.open_request(&good).unwrap(), 30001);
    }
}
