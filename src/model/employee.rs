use crate::core::validation::{is_valid_pesel, require_non_empty};
use crate::core::{Id, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{Contract, Person, PersonInfo};
use crate::storage::Keyed;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub(crate) person: PersonInfo,
    pub(crate) pesel: String,
    pub(crate) contracts: Vec<Id<Contract>>,
}

impl Employee {
    pub fn pesel(&self) -> &str {
        &self.pesel
    }

    pub fn contracts(&self) -> &[Id<Contract>] {
        &self.contracts
    }
}

impl Person for Employee {
    fn person(&self) -> &PersonInfo {
        &self.person
    }

    fn identity(&self) -> &str {
        &self.pesel
    }

    fn is_valid(&self) -> bool {
        is_valid_pesel(&self.pesel)
    }
}

impl Keyed for Employee {
    fn key(&self) -> &str {
        &self.pesel
    }

    // PESELs are digits; no case folding.
    fn key_matches(&self, key: &str) -> bool {
        self.pesel == key.trim()
    }
}

impl Store {
    pub fn create_employee(
        &mut self,
        pesel: &str,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<Id<Employee>> {
        let person = PersonInfo::new(name, surname, email)
            .and_then(|person| {
                require_non_empty("PESEL", pesel)?;
                if !is_valid_pesel(pesel.trim()) {
                    return Err(StoreError::validation(format!("Invalid PESEL '{}'", pesel)));
                }
                self.ensure_unique::<Employee>("PESEL", pesel, None)?;
                Ok(person)
            })
            .inspect_err(|err| debug!("Rejected employee {} {}: {}", name, surname, err))?;

        let id = self.extent_mut::<Employee>().register(Employee {
            person,
            pesel: pesel.trim().to_string(),
            contracts: Vec::new(),
        });
        debug!("Registered employee {} {} {}", id, name, surname);
        Ok(id)
    }
}

impl Cascade for Employee {
    fn cascade_delete(store: &mut Store, id: Id<Employee>) -> Result<()> {
        while let Some(contract) = store.require(id)?.contracts.first().copied() {
            store.delete(contract)?;
        }
        store.extent_mut::<Employee>().unregister(id);
        Ok(())
    }
}
