mod cli;
mod prompts;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use colored::Colorize;
use inquire::{Confirm, Select};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autoshop_core::{
    default_config_path, open_store, Car, Customer, EntityRepository, NewMechanic,
    ReportingEngine, RequestClosure, RequestIntake, RequestLedger, ShopConfig, ShopStore,
};

use crate::cli::{Cli, Command, ReportCommand};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = ShopConfig::load(&config_path)?;
    if let Some(db) = cli.db.clone() {
        config.database = db;
    }

    let store = open_store(&config.database, &config.seeds)
        .with_context(|| format!("Failed to open database: {:?}", config.database))?;

    dispatch(cli.command, store.as_ref())
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("autoshop=debug,autoshop_core=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

fn dispatch(command: Command, store: &dyn ShopStore) -> Result<()> {
    match command {
        Command::AddCustomer {
            id,
            first_name,
            last_name,
            phone,
            address,
        } => add_customer(store, id, first_name, last_name, phone, address),
        Command::AddMechanic {
            first_name,
            last_name,
            experience,
        } => add_mechanic(store, first_name, last_name, experience),
        Command::AddCar {
            vin,
            make,
            model,
            year,
        } => add_car(store, vin, make, model, year),
        Command::Own { customer, vin } => record_ownership(store, customer, vin),
        Command::OpenRequest {
            customer,
            vin,
            odometer,
            complaint,
        } => open_request(store, customer, vin, odometer, complaint),
        Command::CloseRequest {
            request,
            mechanic,
            date,
            bill,
            comments,
        } => close_request(store, request, mechanic, date, bill, comments),
        Command::Report(report) => run_report(store, &report),
        Command::Export { output } => export(store, output.as_deref()),
        Command::Menu => menu(store),
    }
}

fn add_customer(
    store: &dyn ShopStore,
    id: Option<i64>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let repo = EntityRepository::new(store);

    let customer = match (first_name, last_name, phone, address) {
        (Some(first), Some(last), Some(phone), Some(address)) => {
            let id = id.context("--id is required when the other fields are given")?;
            Customer::new(id, first, last, phone, address)?
        }
        _ => prompts::prompt_customer(id)?,
    };

    let id = repo.register_customer(&customer)?;
    println!("{}", format!("Customer {} registered.", id).green());
    Ok(())
}

fn add_mechanic(
    store: &dyn ShopStore,
    first_name: Option<String>,
    last_name: Option<String>,
    experience: Option<u32>,
) -> Result<()> {
    let repo = EntityRepository::new(store);

    let mechanic = match (first_name, last_name, experience) {
        (Some(first), Some(last), Some(years)) => NewMechanic::new(first, last, years)?,
        _ => prompts::prompt_mechanic()?,
    };

    let id = repo.register_mechanic(&mechanic)?;
    println!("{}", format!("Mechanic registered with id {}.", id).green());
    Ok(())
}

fn add_car(
    store: &dyn ShopStore,
    vin: Option<String>,
    make: Option<String>,
    model: Option<String>,
    year: Option<u16>,
) -> Result<()> {
    let repo = EntityRepository::new(store);

    let car = match (vin, make, model, year) {
        (Some(vin), Some(make), Some(model), Some(year)) => Car::new(vin, make, model, year)?,
        (vin, ..) => prompts::prompt_car(vin)?,
    };

    let vin = repo.register_car(&car)?;
    println!("{}", format!("Car {} registered.", vin).green());
    Ok(())
}

fn record_ownership(
    store: &dyn ShopStore,
    customer: Option<i64>,
    vin: Option<String>,
) -> Result<()> {
    let repo = EntityRepository::new(store);

    let customer_id = match customer {
        Some(id) => id,
        None => prompts::prompt_id("Customer id:")?,
    };
    let vin = match vin {
        Some(vin) => vin,
        None => prompts::prompt_vin()?,
    };

    let id = repo.record_ownership(customer_id, &vin)?;
    println!("{}", format!("Ownership {} recorded.", id).green());
    Ok(())
}

fn open_request(
    store: &dyn ShopStore,
    customer: Option<i64>,
    vin: Option<String>,
    odometer: Option<u32>,
    complaint: Option<String>,
) -> Result<()> {
    let repo = EntityRepository::new(store);
    let ledger = RequestLedger::new(store);

    let customer_id = match customer {
        Some(id) => id,
        None => pick_customer(&repo)?,
    };
    let car_vin = match vin {
        Some(vin) => vin,
        None => pick_car(&repo, customer_id)?,
    };
    let odometer = match odometer {
        Some(miles) => miles,
        None => prompts::prompt_u32("Odometer:")?,
    };
    let complaint = match complaint {
        Some(text) => text,
        None => prompts::prompt_nonempty("Complaint:")?,
    };

    let intake = RequestIntake::new(customer_id, car_vin, odometer, complaint, None)?;
    let id = ledger.open(&intake)?;
    println!("{}", format!("Service request {} opened.", id).green());
    Ok(())
}

/// Front-desk intake: search by last name, offer to register a new customer
/// when the search comes up empty.
fn pick_customer(repo: &EntityRepository) -> Result<i64> {
    let last_name = prompts::prompt_nonempty("Customer last name:")?;
    let matches = repo.find_customers_by_last_name(&last_name)?;

    if matches.is_empty() {
        println!("No customers named {}.", last_name);
        if Confirm::new("Register a new customer?").prompt()? {
            let customer = prompts::prompt_customer(None)?;
            let id = repo.register_customer(&customer)?;
            println!("{}", format!("Customer {} registered.", id).green());
            return Ok(id);
        }
        anyhow::bail!("No customer selected");
    }

    let index = prompts::prompt_pick("Customer:", &matches)?;
    Ok(matches[index].id)
}

const NEW_CAR_CHOICE: &str = "Register a new car";

fn pick_car(repo: &EntityRepository, customer_id: i64) -> Result<String> {
    let owned = repo.cars_owned_by(customer_id)?;

    if !owned.is_empty() {
        let mut options: Vec<String> = owned.iter().map(|car| car.to_string()).collect();
        options.push(NEW_CAR_CHOICE.to_string());
        let selection = Select::new("Car:", options.clone()).prompt()?;
        if selection != NEW_CAR_CHOICE {
            let index = options.iter().position(|o| o == &selection).unwrap();
            return Ok(owned[index].vin.clone());
        }
    } else {
        println!("No cars on file for this customer.");
    }

    let car = prompts::prompt_car(None)?;
    let vin = repo.register_car(&car)?;
    println!("{}", format!("Car {} registered.", vin).green());
    if Confirm::new("Record this customer as the owner?").prompt()? {
        repo.record_ownership(customer_id, &vin)?;
    }
    Ok(vin)
}

fn close_request(
    store: &dyn ShopStore,
    request: Option<i64>,
    mechanic: Option<i64>,
    date: Option<NaiveDate>,
    bill: Option<u32>,
    comments: Option<String>,
) -> Result<()> {
    let repo = EntityRepository::new(store);
    let ledger = RequestLedger::new(store);
    let interactive = request.is_none() || mechanic.is_none() || bill.is_none();

    let request_id = match request {
        Some(id) => id,
        None => {
            let open = store.list_open_requests()?;
            if open.is_empty() {
                anyhow::bail!("No open service requests");
            }
            let index = prompts::prompt_pick("Service request:", &open)?;
            open[index].id
        }
    };

    let mechanic_id = match mechanic {
        Some(id) => id,
        None => {
            let mechanics = repo.list_mechanics()?;
            if mechanics.is_empty() {
                anyhow::bail!("No mechanics on file; add one first");
            }
            let index = prompts::prompt_pick("Mechanic:", &mechanics)?;
            mechanics[index].id
        }
    };

    let closed_on = match date {
        Some(date) => date,
        None if interactive => prompts::prompt_date("Closing date (empty for today):")?,
        None => Utc::now().date_naive(),
    };
    let bill = match bill {
        Some(amount) => amount,
        None => prompts::prompt_positive_u32("Bill amount:")?,
    };
    let comments = match comments {
        Some(text) => Some(text),
        None if interactive => prompts::prompt_optional("Comments:")?,
        None => None,
    };

    let closure = RequestClosure::new(request_id, mechanic_id, closed_on, bill, comments)?;
    let closure_id = ledger.close(&closure)?;
    println!(
        "{}",
        format!(
            "Service request {} closed, closure id {}.",
            request_id, closure_id
        )
        .green()
    );
    Ok(())
}

fn run_report(store: &dyn ShopStore, report: &ReportCommand) -> Result<()> {
    let engine = ReportingEngine::new(store);

    match report {
        ReportCommand::BillUnder { threshold, format } => {
            let rows = engine.customers_with_bill_under(*threshold)?;
            if format == "json" {
                return print_json(&rows);
            }
            print_table(
                &["First name", "Last name", "Closed on", "Comments", "Bill"],
                rows.iter()
                    .map(|row| {
                        vec![
                            row.first_name.clone(),
                            row.last_name.clone(),
                            row.closed_on.to_string(),
                            row.comments.clone().unwrap_or_default(),
                            row.bill.to_string(),
                        ]
                    })
                    .collect(),
            );
        }
        ReportCommand::OwnersOver { count, format } => {
            let rows = engine.customers_owning_more_than(*count)?;
            if format == "json" {
                return print_json(&rows);
            }
            print_table(
                &["First name", "Last name"],
                rows.iter()
                    .map(|row| vec![row.first_name.clone(), row.last_name.clone()])
                    .collect(),
            );
        }
        ReportCommand::OldLowMileage {
            year,
            mileage,
            format,
        } => {
            let rows = engine.cars_older_than_with_odometer_under(*year, *mileage)?;
            if format == "json" {
                return print_json(&rows);
            }
            print_table(
                &["VIN", "Make", "Model", "Year"],
                rows.iter()
                    .map(|car| {
                        vec![
                            car.vin.clone(),
                            car.make.clone(),
                            car.model.clone(),
                            car.year.to_string(),
                        ]
                    })
                    .collect(),
            );
        }
        ReportCommand::TopServiced { k, format } => {
            let rows = engine.top_cars_by_service_count(*k)?;
            if format == "json" {
                return print_json(&rows);
            }
            print_table(
                &["Make", "Model", "Requests"],
                rows.iter()
                    .map(|row| {
                        vec![
                            row.make.clone(),
                            row.model.clone(),
                            row.requests.to_string(),
                        ]
                    })
                    .collect(),
            );
        }
        ReportCommand::TotalBills { format } => {
            let rows = engine.customers_by_descending_total_bill()?;
            if format == "json" {
                return print_json(&rows);
            }
            print_table(
                &["First name", "Last name", "Total bill"],
                rows.iter()
                    .map(|row| {
                        vec![
                            row.first_name.clone(),
                            row.last_name.clone(),
                            row.total_bill.to_string(),
                        ]
                    })
                    .collect(),
            );
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(rows: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("(no rows)");
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, header)| format!("{:<width$}", header, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header_line.bold());

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line);
    }
}

fn export(store: &dyn ShopStore, output: Option<&Path>) -> Result<()> {
    let json = autoshop_core::to_json(store)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export file: {:?}", path))?;
            println!("{}", format!("Exported to {:?}.", path).green());
        }
        None => println!("{}", json),
    }
    Ok(())
}

const MENU_ITEMS: [&str; 12] = [
    "Add customer",
    "Add mechanic",
    "Add car",
    "Record ownership",
    "Open service request",
    "Close service request",
    "Customers with bill under 100",
    "Customers owning more than 20 cars",
    "Cars before 1995 serviced under 50000 miles",
    "K most-serviced cars",
    "Customers by total bill",
    "Exit",
];

/// Interactive session: the same operations as the subcommands, driven by a
/// selection loop. A failed operation reports and returns to the menu.
fn menu(store: &dyn ShopStore) -> Result<()> {
    loop {
        println!();
        let choice = Select::new("MAIN MENU", MENU_ITEMS.to_vec()).prompt()?;
        if choice == "Exit" {
            println!("Bye!");
            return Ok(());
        }

        let result = match choice {
            "Add customer" => add_customer(store, None, None, None, None, None),
            "Add mechanic" => add_mechanic(store, None, None, None),
            "Add car" => add_car(store, None, None, None, None),
            "Record ownership" => record_ownership(store, None, None),
            "Open service request" => open_request(store, None, None, None, None),
            "Close service request" => close_request(store, None, None, None, None, None),
            "Customers with bill under 100" => run_report(
                store,
                &ReportCommand::BillUnder {
                    threshold: 100,
                    format: "table".into(),
                },
            ),
            "Customers owning more than 20 cars" => run_report(
                store,
                &ReportCommand::OwnersOver {
                    count: 20,
                    format: "table".into(),
                },
            ),
            "Cars before 1995 serviced under 50000 miles" => run_report(
                store,
                &ReportCommand::OldLowMileage {
                    year: 1995,
                    mileage: 50000,
                    format: "table".into(),
                },
            ),
            "K most-serviced cars" => {
                let k = prompts::prompt_positive_u32("Number of cars k:")?;
                run_report(
                    store,
                    &ReportCommand::TopServiced {
                        k,
                        format: "table".into(),
                    },
                )
            }
            "Customers by total bill" => run_report(
                store,
                &ReportCommand::TotalBills {
                    format: "table".into(),
                },
            ),
            _ => unreachable!(),
        };

        if let Err(err) = result {
            eprintln!("{}", format!("Error: {:#}", err).red());
        }
    }
}
