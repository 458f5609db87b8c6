//! Maps lookup results onto flat report rows.
//!
//! Success rows take the primary activity from the first entry of the
//! registry's activity list and the secondary one from the second entry,
//! in the order the registry returned them. Failure rows keep only the
//! identifier and the error kind.

use crate::constants::{REGISTRY_DATE_FORMAT, REPORT_DATE_FORMAT};
use crate::models::{LookupResult, OutputRow};
use crate::registry::{Activity, Address, RegistryRecord};
use chrono::NaiveDate;

/// Build the report row for one result
pub fn shape(result: &LookupResult) -> OutputRow {
    match result {
        LookupResult::Success { identifier, record } => shape_record(identifier, record),
        LookupResult::Failure {
            kind, identifier, ..
        } => OutputRow {
            identifier: identifier.clone(),
            error: kind.to_string(),
            ..OutputRow::default()
        },
    }
}

fn shape_record(identifier: &str, record: &RegistryRecord) -> OutputRow {
    let (primary_code, primary_description) = activity_cells(record.primary_activity());
    let (secondary_code, secondary_description) = activity_cells(record.secondary_activity());

    OutputRow {
        identifier: identifier.to_string(),
        legal_name: record.legal_name.clone(),
        trade_name: record.trade_name.clone(),
        primary_activity_code: primary_code,
        primary_activity_description: primary_description,
        secondary_activity_code: secondary_code,
        secondary_activity_description: secondary_description,
        address: format_address(&record.address),
        size: record.size.clone(),
        share_capital: record.share_capital,
        status: record.status.clone(),
        status_date: format_date(&record.status_date),
        phone: record.phones.join(" / "),
        email: record.email.clone(),
        error: String::new(),
    }
}

fn activity_cells(activity: Option<&Activity>) -> (String, String) {
    match activity {
        Some(a) => (a.code.clone(), a.description.clone()),
        None => (String::new(), String::new()),
    }
}

/// `street, number, complement, district, city - UF, CEP 00000000`, empty parts skipped
pub fn format_address(address: &Address) -> String {
    let city_state = [address.municipality.as_str(), address.state.as_str()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" - ");

    let postal = if address.postal_code.is_empty() {
        String::new()
    } else {
        format!("CEP {}", address.postal_code)
    };

    [
        address.street.as_str(),
        address.number.as_str(),
        address.complement.as_str(),
        address.district.as_str(),
        city_state.as_str(),
        postal.as_str(),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Registry dates come as ISO dates; anything else passes through
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, REGISTRY_DATE_FORMAT) {
        Ok(date) => date.format(REPORT_DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
