use crate::core::Result;
use crate::core::validation::{require_non_empty, require_person_name};
use serde::{Deserialize, Serialize};

/// Personal data shared by employees and clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInfo {
    name: String,
    surname: String,
    email: String,
}

impl PersonInfo {
    pub fn new(name: &str, surname: &str, email: &str) -> Result<Self> {
        require_person_name("Name", name)?;
        require_person_name("Surname", surname)?;
        require_non_empty("Email", email)?;
        Ok(Self {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

pub trait Person {
    fn person(&self) -> &PersonInfo;

    /// The identifier people are told apart by (PESEL, user name).
    fn identity(&self) -> &str;

    fn is_valid(&self) -> bool;

    fn name(&self) -> &str {
        self.person().name()
    }

    fn surname(&self) -> &str {
        self.person().surname()
    }

    fn email(&self) -> &str {
        self.person().email()
    }
}
