//! Read-only reporting over the ledger and the entity tables.
//!
//! Every query is a deterministic function of current store state. Billing
//! aggregations only ever see closure records, so an open request
//! contributes nothing to any total.

use serde::Serialize;

use crate::db::ShopStore;
use crate::error::{Result, ShopError};
use crate::models::Car;

/// One closed request under the billing threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingLine {
    pub first_name: String,
    pub last_name: String,
    pub closed_on: chrono::NaiveDate,
    pub comments: Option<String>,
    pub bill: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerName {
    pub first_name: String,
    pub last_name: String,
}

/// Service-request count for a (make, model) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCount {
    pub make: String,
    pub model: String,
    pub requests: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerBill {
    pub first_name: String,
    pub last_name: String,
    pub total_bill: i64,
}

pub struct ReportingEngine<'a> {
    store: &'a dyn ShopStore,
}

impl<'a> ReportingEngine<'a> {
    pub fn new(store: &'a dyn ShopStore) -> Self {
        Self { store }
    }

    /// Closed requests billed under `threshold`, joined back to their
    /// customers, ordered by closure id.
    pub fn customers_with_bill_under(&self, threshold: u32) -> Result<Vec<BillingLine>> {
        self.store.customers_with_bill_under(threshold)
    }

    /// Customers linked to more than `count` distinct cars.
    pub fn customers_owning_more_than(&self, count: u32) -> Result<Vec<CustomerName>> {
        self.store.customers_owning_more_than(count)
    }

    /// Distinct cars built before `year` with at least one service request
    /// under `mileage`, ordered by year ascending.
    pub fn cars_older_than_with_odometer_under(
        &self,
        year: u16,
        mileage: u32,
    ) -> Result<Vec<Car>> {
        self.store.cars_older_than_with_odometer_under(year, mileage)
    }

    /// The `k` most-serviced (make, model) groups, descending by request
    /// count. `k` must be at least 1; the check runs before any query.
    pub fn top_cars_by_service_count(&self, k: u32) -> Result<Vec<ServiceCount>> {
        if k == 0 {
            return Err(ShopError::invalid("k", "must be a positive integer"));
        }
        self.store.top_cars_by_service_count(k)
    }

    /// Total closed bill per customer, descending. Customers with no closed
    /// requests do not appear: the sum over an empty set is undefined here,
    /// not zero.
    pub fn customers_by_descending_total_bill(&self) -> Result<Vec<CustomerBill>> {
        self.store.customers_by_descending_total_bill()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::ids::IdSeeds;
    use crate::ledger::{RequestClosure, RequestIntake, RequestLedger};
    use crate::models::{Customer, NewMechanic};
    use chrono::Utc;
    use tempfile::NamedTempFile;

    struct Fixture {
        _file: NamedTempFile,
        store: SqliteStore,
        mechanic_id: i64,
    }

    fn fixture() -> Fixture {
        let file = NamedTempFile::with_suffix(".db").unwrap();
        let store = SqliteStore::open(file.path(), &IdSeeds::default()).unwrap();
        let mechanic_id = store
            .register_mechanic(&NewMechanic::new("Ray", "Hobbs", 12).unwrap())
            .unwrap();
        Fixture {
            _file: file,
            store,
            mechanic_id,
        }
    }

    fn add_customer(fx: &Fixture, id: i64, first: &str, last: &str) {
        let c = Customer::new(id, first, last, "555-0100", "12 Main St").unwrap();
        fx.store.register_customer(&c).unwrap();
    }

    fn add_car(fx: &Fixture, vin: &str, make: &str, model: &str, year: u16) {
        let car = Car::new(vin, make, model, year).unwrap();
        fx.store.register_car(&car).unwrap();
    }

    fn open_request(fx: &Fixture, customer: i64, vin: &str, odometer: u32) -> i64 {
        let ledger = RequestLedger::new(&fx.store);
        let intake = RequestIntake::new(customer, vin, odometer, "needs service", None).unwrap();
        ledger.open(&intake).unwrap()
    }

    fn close_request(fx: &Fixture, request: i64, bill: u32) {
        let ledger = RequestLedger::new(&fx.store);
        let closure = RequestClosure::new(
            request,
            fx.mechanic_id,
            Utc::now().date_naive(),
            bill,
            None,
        )
        .unwrap();
        ledger.close(&closure).unwrap();
    }

    #[test]
    fn intake_to_billing_scenario() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_car(&fx, "1HGCM82633A00435", "Honda", "Civic", 1993);
        let request = open_request(&fx, 601, "1HGCM82633A00435", 40000);

        let ledger = RequestLedger::new(&fx.store);
        let closure = RequestClosure::new(
            request,
            fx.mechanic_id,
            Utc::now().date_naive(),
            80,
            Some("brake noise".into()),
        )
        .unwrap();
        ledger.close(&closure).unwrap();

        let reports = ReportingEngine::new(&fx.store);

        let lines = reports.customers_with_bill_under(100).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].first_name, "Jane");
        assert_eq!(lines[0].last_name, "Doe");
        assert_eq!(lines[0].bill, 80);
        assert_eq!(lines[0].comments.as_deref(), Some("brake noise"));

        let cars = reports
            .cars_older_than_with_odometer_under(1995, 50000)
            .unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].make, "Honda");
        assert_eq!(cars[0].model, "Civic");
        assert_eq!(cars[0].year, 1993);
    }

    #[test]
    fn bill_threshold_is_strict() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_car(&fx, "1HGCM82633A00435", "Honda", "Civic", 1993);
        let request = open_request(&fx, 601, "1HGCM82633A00435", 40000);
        close_request(&fx, request, 100);

        let reports = ReportingEngine::new(&fx.store);
        assert!(reports.customers_with_bill_under(100).unwrap().is_empty());
        assert_eq!(reports.customers_with_bill_under(101).unwrap().len(), 1);
    }

    #[test]
    fn ownership_count_filter_is_strictly_greater() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_customer(&fx, 602, "Ann", "Smith");
        for i in 0..3 {
            let vin = format!("AAAAAAAAAAAAAA{:02}", i);
            add_car(&fx, &vin, "Honda", "Civic", 1993);
            fx.store.record_ownership(601, &vin).unwrap();
        }
        let vin = "BBBBBBBBBBBBBB01";
        add_car(&fx, vin, "Ford", "Focus", 2001);
        fx.store.record_ownership(602, vin).unwrap();

        let reports = ReportingEngine::new(&fx.store);
        let owners = reports.customers_owning_more_than(2).unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].first_name, "Jane");
        assert!(reports.customers_owning_more_than(3).unwrap().is_empty());
    }

    #[test]
    fn old_car_filter_requires_a_qualifying_request() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_car(&fx, "AAAAAAAAAAAAAA01", "Honda", "Civic", 1993);
        add_car(&fx, "BBBBBBBBBBBBBB01", "Ford", "Model T", 1920);

        // Old car, but its only reading is above the mileage cut.
        open_request(&fx, 601, "AAAAAAAAAAAAAA01", 90000);

        let reports = ReportingEngine::new(&fx.store);
        assert!(reports
            .cars_older_than_with_odometer_under(1995, 50000)
            .unwrap()
            .is_empty());

        // A later low-odometer reading qualifies the car exactly once.
        open_request(&fx, 601, "AAAAAAAAAAAAAA01", 30000);
        open_request(&fx, 601, "AAAAAAAAAAAAAA01", 20000);
        let cars = reports
            .cars_older_than_with_odometer_under(1995, 50000)
            .unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].vin, "AAAAAAAAAAAAAA01");
    }

    #[test]
    fn old_car_results_are_ordered_by_year() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_car(&fx, "AAAAAAAAAAAAAA01", "Honda", "Civic", 1993);
        add_car(&fx, "BBBBBBBBBBBBBB01", "Ford", "Model A", 1930);
        open_request(&fx, 601, "AAAAAAAAAAAAAA01", 10000);
        open_request(&fx, 601, "BBBBBBBBBBBBBB01", 10000);

        let reports = ReportingEngine::new(&fx.store);
        let years: Vec<u16> = reports
            .cars_older_than_with_odometer_under(1995, 50000)
            .unwrap()
            .iter()
            .map(|c| c.year)
            .collect();
        assert_eq!(years, vec![1930, 1993]);
    }

    #[test]
    fn top_serviced_rejects_non_positive_k() {
        let fx = fixture();
        let reports = ReportingEngine::new(&fx.store);
        assert!(matches!(
            reports.top_cars_by_service_count(0),
            Err(ShopError::InvalidArgument { field: "k", .. })
        ));
    }

    #[test]
    fn top_serviced_groups_by_make_and_model() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_car(&fx, "AAAAAAAAAAAAAA01", "Honda", "Civic", 1993);
        add_car(&fx, "AAAAAAAAAAAAAA02", "Honda", "Civic", 1997);
        add_car(&fx, "BBBBBBBBBBBBBB01", "Ford", "Focus", 2001);

        // Three Civic requests split across two cars, two Focus requests.
        open_request(&fx, 601, "AAAAAAAAAAAAAA01", 100);
        open_request(&fx, 601, "AAAAAAAAAAAAAA01", 200);
        open_request(&fx, 601, "AAAAAAAAAAAAAA02", 300);
        open_request(&fx, 601, "BBBBBBBBBBBBBB01", 400);
        open_request(&fx, 601, "BBBBBBBBBBBBBB01", 500);

        let reports = ReportingEngine::new(&fx.store);
        let top = reports.top_cars_by_service_count(1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].make, "Honda");
        assert_eq!(top[0].requests, 3);

        let all = reports.top_cars_by_service_count(10).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].requests >= all[1].requests);
    }

    #[test]
    fn total_bills_descend_and_skip_unbilled_customers() {
        let fx = fixture();
        add_customer(&fx, 601, "Jane", "Doe");
        add_customer(&fx, 602, "Ann", "Smith");
        add_customer(&fx, 603, "Ned", "Poor");
        add_car(&fx, "AAAAAAAAAAAAAA01", "Honda", "Civic", 1993);
        add_car(&fx, "BBBBBBBBBBBBBB01", "Ford", "Focus", 2001);
        fx.store.record_ownership(601, "AAAAAAAAAAAAAA01").unwrap();
        fx.store.record_ownership(602, "BBBBBBBBBBBBBB01").unwrap();

        let r1 = open_request(&fx, 601, "AAAAAAAAAAAAAA01", 100);
        let r2 = open_request(&fx, 601, "AAAAAAAAAAAAAA01", 200);
        let r3 = open_request(&fx, 602, "BBBBBBBBBBBBBB01", 300);
        close_request(&fx, r1, 50);
        close_request(&fx, r2, 75);
        close_request(&fx, r3, 500);
        // Ned opened a request but it was never closed.
        open_request(&fx, 603, "AAAAAAAAAAAAAA01", 400);

        let reports = ReportingEngine::new(&fx.store);
        let totals = reports.customers_by_descending_total_bill().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].last_name, "Smith");
        assert_eq!(totals[0].total_bill, 500);
        assert_eq!(totals[1].last_name, "Doe");
        assert_eq!(totals[1].total_bill, 125);
        assert!(totals.windows(2).all(|w| w[0].total_bill >= w[1].total_bill));
    }
}
