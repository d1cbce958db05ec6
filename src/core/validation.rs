//! Field-level predicates shared by the entity constructors.

use super::{Result, StoreError};
use chrono::{Local, NaiveDate};
use regex::Regex;

lazy_static::lazy_static! {
    static ref PESEL_DIGITS: Regex = Regex::new(r"^[0-9]{11}$").unwrap();
    static ref EMAIL: Regex = Regex::new(
        r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$"
    )
    .unwrap();
}

pub const PERSON_NAME_MIN_LEN: usize = 2;
pub const PERSON_NAME_MAX_LEN: usize = 100;

const PESEL_WEIGHTS: [u32; 10] = [1, 3, 7, 9, 1, 3, 7, 9, 1, 3];

/// Canonical form used for every case-insensitive name comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn names_equal(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

pub fn require_person_name(field: &str, value: &str) -> Result<()> {
    require_non_empty(field, value)?;
    let len = value.chars().count();
    if !(PERSON_NAME_MIN_LEN..=PERSON_NAME_MAX_LEN).contains(&len) {
        return Err(StoreError::validation(format!(
            "{} length must be between {} and {}",
            field, PERSON_NAME_MIN_LEN, PERSON_NAME_MAX_LEN
        )));
    }
    Ok(())
}

/// Checks shape and control digit of a PESEL number.
pub fn is_valid_pesel(pesel: &str) -> bool {
    if !PESEL_DIGITS.is_match(pesel) {
        return false;
    }
    let digits: Vec<u32> = pesel.bytes().map(|b| u32::from(b - b'0')).collect();
    let Some((control, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .zip(PESEL_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    (10 - (sum % 10)) % 10 == *control
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
