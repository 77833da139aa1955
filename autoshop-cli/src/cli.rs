use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Record keeping for an auto-repair shop")]
pub struct Cli {
    /// Path to the configuration file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Path to the database file (overrides the configured location)
    #[clap(long)]
    pub db: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long, short = 'v')]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new customer
    AddCustomer {
        /// Customer id, assigned by the front office
        #[clap(long)]
        id: Option<i64>,

        /// First name (max 32 characters)
        #[clap(long)]
        first_name: Option<String>,

        /// Last name (max 32 characters)
        #[clap(long)]
        last_name: Option<String>,

        /// Phone number (max 13 characters)
        #[clap(long)]
        phone: Option<String>,

        /// Street address (max 256 characters)
        #[clap(long)]
        address: Option<String>,
    },

    /// Register a new mechanic
    AddMechanic {
        /// First name (max 32 characters)
        #[clap(long)]
        first_name: Option<String>,

        /// Last name (max 32 characters)
        #[clap(long)]
        last_name: Option<String>,

        /// Years of experience
        #[clap(long)]
        experience: Option<u32>,
    },

    /// Register a new car
    AddCar {
        /// Vehicle identification number (exactly 16 characters)
        #[clap(long)]
        vin: Option<String>,

        /// Make (max 32 characters)
        #[clap(long)]
        make: Option<String>,

        /// Model (max 32 characters)
        #[clap(long)]
        model: Option<String>,

        /// Model year
        #[clap(long)]
        year: Option<u16>,
    },

    /// Record that a customer owns a car
    Own {
        /// Customer id
        #[clap(long)]
        customer: Option<i64>,

        /// Car VIN
        #[clap(long)]
        vin: Option<String>,
    },

    /// Open a service request
    OpenRequest {
        /// Customer id
        #[clap(long)]
        customer: Option<i64>,

        /// Car VIN
        #[clap(long)]
        vin: Option<String>,

        /// Odometer reading in miles
        #[clap(long)]
        odometer: Option<u32>,

        /// The customer's complaint
        #[clap(long)]
        complaint: Option<String>,
    },

    /// Close a service request
    CloseRequest {
        /// Service request id
        #[clap(long)]
        request: Option<i64>,

        /// Mechanic id
        #[clap(long)]
        mechanic: Option<i64>,

        /// Closing date (YYYY-MM-DD, defaults to today)
        #[clap(long)]
        date: Option<NaiveDate>,

        /// Bill amount (a positive integer)
        #[clap(long)]
        bill: Option<u32>,

        /// Closing comments
        #[clap(long)]
        comments: Option<String>,
    },

    /// Reporting queries
    #[clap(subcommand)]
    Report(ReportCommand),

    /// Dump the entire database as JSON
    Export {
        /// Output file path (stdout when omitted)
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Interactive session over the same operations
    Menu,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Customers with a closed bill under a threshold
    BillUnder {
        #[clap(default_value_t = 100)]
        threshold: u32,

        /// Output format (table, json)
        #[clap(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Customers owning more than a number of cars
    OwnersOver {
        #[clap(default_value_t = 20)]
        count: u32,

        /// Output format (table, json)
        #[clap(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Cars built before a year with a service odometer reading under a mileage
    OldLowMileage {
        #[clap(default_value_t = 1995)]
        year: u16,

        #[clap(default_value_t = 50000)]
        mileage: u32,

        /// Output format (table, json)
        #[clap(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// The K most-serviced cars by make and model
    TopServiced {
        #[clap(default_value_t = 10)]
        k: u32,

        /// Output format (table, json)
        #[clap(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Customers by descending total bill
    TotalBills {
        /// Output format (table, json)
        #[clap(long, short = 'f', default_value = "table")]
        format: String,
    },
}
