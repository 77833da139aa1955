use anyhow::Result;
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use inquire::{Select, Text};

use autoshop_core::{
    Car, Customer, NewMechanic, MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PHONE_LEN, MAX_YEAR, VIN_LEN,
};

/// Prompts until the entry fits in `max` characters. Empty input is allowed.
fn text_limited(prompt: &str, max: usize) -> Result<String> {
    loop {
        let value = Text::new(prompt).prompt()?;
        if value.chars().count() <= max {
            return Ok(value);
        }
        println!(
            "{}",
            format!("Invalid entry, at most {} characters.", max).red()
        );
    }
}

/// Prompts until the entry is non-empty and fits in `max` characters.
fn text_required(prompt: &str, max: usize) -> Result<String> {
    loop {
        let value = Text::new(prompt).prompt()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            println!("{}", "Invalid entry, a value is required.".red());
        } else if trimmed.chars().count() > max {
            println!(
                "{}",
                format!("Invalid entry, at most {} characters.", max).red()
            );
        } else {
            return Ok(trimmed.to_string());
        }
    }
}

pub fn prompt_nonempty(prompt: &str) -> Result<String> {
    loop {
        let value = Text::new(prompt).prompt()?;
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        println!("{}", "Invalid entry, a value is required.".red());
    }
}

pub fn prompt_u32(prompt: &str) -> Result<u32> {
    loop {
        let value = Text::new(prompt).prompt()?;
        match value.trim().parse::<u32>() {
            Ok(n) => return Ok(n),
            Err(_) => println!("{}", "Invalid entry, enter a non-negative number.".red()),
        }
    }
}

pub fn prompt_positive_u32(prompt: &str) -> Result<u32> {
    loop {
        let n = prompt_u32(prompt)?;
        if n > 0 {
            return Ok(n);
        }
        println!("{}", "Invalid entry, enter a positive number.".red());
    }
}

pub fn prompt_id(prompt: &str) -> Result<i64> {
    loop {
        let value = Text::new(prompt).prompt()?;
        match value.trim().parse::<i64>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => println!("{}", "Invalid entry, enter a positive id.".red()),
        }
    }
}

pub fn prompt_vin() -> Result<String> {
    loop {
        let value = Text::new("VIN:").prompt()?;
        let trimmed = value.trim();
        if trimmed.chars().count() == VIN_LEN {
            return Ok(trimmed.to_string());
        }
        println!(
            "{}",
            format!("Invalid entry, a VIN is exactly {} characters here.", VIN_LEN).red()
        );
    }
}

fn prompt_year() -> Result<u16> {
    loop {
        let value = Text::new("Year:").prompt()?;
        match value.trim().parse::<u16>() {
            Ok(year) if year <= MAX_YEAR => return Ok(year),
            _ => println!("{}", "Invalid entry, enter a year of at most 4 digits.".red()),
        }
    }
}

/// Prompts for a date; empty input means today.
pub fn prompt_date(prompt: &str) -> Result<NaiveDate> {
    loop {
        let value = Text::new(prompt).prompt()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Utc::now().date_naive());
        }
        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => return Ok(date),
            Err(_) => println!("{}", "Invalid entry, use YYYY-MM-DD.".red()),
        }
    }
}

/// Optional free text; empty input means none.
pub fn prompt_optional(prompt: &str) -> Result<Option<String>> {
    let value = Text::new(prompt).prompt()?;
    let trimmed = value.trim();
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}

/// Prompts the user for a new customer record.
pub fn prompt_customer(id: Option<i64>) -> Result<Customer> {
    let id = match id {
        Some(id) => id,
        None => prompt_id("Customer id:")?,
    };
    let first_name = text_limited("First name:", MAX_NAME_LEN)?;
    let last_name = text_limited("Last name:", MAX_NAME_LEN)?;
    let phone = text_limited("Phone number:", MAX_PHONE_LEN)?;
    let address = text_limited("Address:", MAX_ADDRESS_LEN)?;
    Ok(Customer::new(id, first_name, last_name, phone, address)?)
}

/// Prompts the user for a new mechanic record.
pub fn prompt_mechanic() -> Result<NewMechanic> {
    let first_name = text_required("First name:", MAX_NAME_LEN)?;
    let last_name = text_required("Last name:", MAX_NAME_LEN)?;
    let experience = prompt_u32("Experience in years:")?;
    Ok(NewMechanic::new(first_name, last_name, experience)?)
}

/// Prompts the user for a new car record.
pub fn prompt_car(vin: Option<String>) -> Result<Car> {
    let vin = match vin {
        Some(vin) => vin,
        None => prompt_vin()?,
    };
    let make = text_required("Make:", MAX_NAME_LEN)?;
    let model = text_required("Model:", MAX_NAME_LEN)?;
    let year = prompt_year()?;
    Ok(Car::new(vin, make, model, year)?)
}

/// Prompts the user to pick one entry from `options` by display label.
pub fn prompt_pick<T: std::fmt::Display>(prompt: &str, items: &[T]) -> Result<usize> {
    let options: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    let options_clone = options.clone();
    let selection = Select::new(prompt, options_clone).prompt()?;
    let index = options.iter().position(|o| o == &selection).unwrap();
    Ok(index)
}
