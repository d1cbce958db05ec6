use crate::core::Result;
use crate::core::validation::require_non_empty;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    street_number: String,
    flat_number: Option<String>,
    city: String,
    postal_code: String,
}

impl Address {
    pub fn new(street: &str, street_number: &str, city: &str, postal_code: &str) -> Result<Self> {
        require_non_empty("Street", street)?;
        require_non_empty("Street number", street_number)?;
        require_non_empty("City", city)?;
        require_non_empty("Postal code", postal_code)?;
        Ok(Self {
            street: street.to_string(),
            street_number: street_number.to_string(),
            flat_number: None,
            city: city.to_string(),
            postal_code: postal_code.to_string(),
        })
    }

    /// Blank flat numbers are stored as absent.
    pub fn with_flat_number(mut self, flat_number: &str) -> Self {
        self.flat_number = Some(flat_number.trim().to_string()).filter(|flat| !flat.is_empty());
        self
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn street_number(&self) -> &str {
        &self.street_number
    }

    pub fn flat_number(&self) -> Option<&str> {
        self.flat_number.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.street, self.street_number)?;
        if let Some(flat) = &self.flat_number {
            write!(f, "/{}", flat)?;
        }
        write!(f, ", {} {}", self.postal_code, self.city)
    }
}
