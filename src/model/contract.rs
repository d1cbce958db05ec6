use crate::core::validation::{require_non_empty, today};
use crate::core::{ContractType, Id, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{Employee, Restaurant};
use chrono::{Days, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// Employment of one employee at one restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub(crate) employee: Id<Employee>,
    pub(crate) restaurant: Id<Restaurant>,
    pub(crate) contract_type: ContractType,
    pub(crate) description: String,
    pub(crate) sign_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
}

impl Contract {
    pub fn employee(&self) -> Id<Employee> {
        self.employee
    }

    pub fn restaurant(&self) -> Id<Restaurant> {
        self.restaurant
    }

    pub fn contract_type(&self) -> ContractType {
        self.contract_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sign_date(&self) -> NaiveDate {
        self.sign_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    fn binds(&self, restaurant: Id<Restaurant>, contract_type: ContractType) -> bool {
        self.restaurant == restaurant && self.contract_type == contract_type
    }
}

impl Store {
    /// Signs a contract today, running for `duration_days`.
    pub fn create_contract(
        &mut self,
        employee: Id<Employee>,
        restaurant: Id<Restaurant>,
        contract_type: ContractType,
        description: &str,
        duration_days: u32,
    ) -> Result<Id<Contract>> {
        self.ensure_live(restaurant)?;
        if self.find_contract(employee, restaurant, contract_type)?.is_some() {
            return Err(StoreError::relationship(format!(
                "employee {} already holds a {} contract with restaurant {}",
                employee, contract_type, restaurant
            )));
        }
        require_non_empty("Contract description", description)?;
        if duration_days == 0 {
            return Err(StoreError::validation("Duration must be greater than 0"));
        }
        let sign_date = today();
        let end_date = sign_date
            .checked_add_days(Days::new(u64::from(duration_days)))
            .ok_or_else(|| StoreError::validation("Contract end date is out of range"))?;

        let id = self.extent_mut::<Contract>().register(Contract {
            employee,
            restaurant,
            contract_type,
            description: description.to_string(),
            sign_date,
            end_date,
        });
        self.require_mut(employee)?.contracts.push(id);
        self.require_mut(restaurant)?.contracts.push(id);
        debug!(
            "Signed {} contract {} between employee {} and restaurant {}",
            contract_type, id, employee, restaurant
        );
        Ok(id)
    }

    /// Deletes the matching contract. Returns whether one existed.
    pub fn end_contract(
        &mut self,
        employee: Id<Employee>,
        restaurant: Id<Restaurant>,
        contract_type: ContractType,
    ) -> Result<bool> {
        match self.find_contract(employee, restaurant, contract_type)? {
            Some(contract) => {
                self.delete(contract)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn find_contract(
        &self,
        employee: Id<Employee>,
        restaurant: Id<Restaurant>,
        contract_type: ContractType,
    ) -> Result<Option<Id<Contract>>> {
        let found = self.require(employee)?.contracts.iter().copied().find(|contract| {
            self.get(*contract)
                .is_some_and(|contract| contract.binds(restaurant, contract_type))
        });
        Ok(found)
    }
}

impl Cascade for Contract {
    fn cascade_delete(store: &mut Store, id: Id<Contract>) -> Result<()> {
        let (employee, restaurant) = {
            let contract = store.require(id)?;
            (contract.employee, contract.restaurant)
        };
        store.require_mut(employee)?.contracts.retain(|c| *c != id);
        store.require_mut(restaurant)?.contracts.retain(|c| *c != id);
        store.extent_mut::<Contract>().unregister(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, RestaurantClass};
    use crate::model::Address;

    fn setup(store: &mut Store) -> (Id<Employee>, Id<Restaurant>) {
        let employee = store
            .create_employee("72040874798", "Ewa", "Lis", "ewa@restmax.pl")
            .unwrap();
        let address = Address::new("Koszykowa", "23", "Warsaw", "12-345").unwrap();
        let restaurant = store
            .create_restaurant("Koszykowa Bistro", address, [RestaurantClass::DriveThru])
            .unwrap();
        (employee, restaurant)
    }

    #[test]
    fn test_contract_links_both_ends() {
        let mut store = Store::default();
        let (employee, restaurant) = setup(&mut store);
        let contract = store
            .create_contract(employee, restaurant, ContractType::PartTime, "Weekend shifts", 90)
            .unwrap();

        assert_eq!(store.get(employee).unwrap().contracts(), &[contract]);
        assert_eq!(store.get(restaurant).unwrap().contracts(), &[contract]);
        let entry = store.get(contract).unwrap();
        assert_eq!(entry.sign_date(), today());
        assert_eq!(entry.end_date(), today().checked_add_days(Days::new(90)).unwrap());
    }

    #[test]
    fn test_duplicate_contract_rejected() {
        let mut store = Store::default();
        let (employee, restaurant) = setup(&mut store);
        store
            .create_contract(employee, restaurant, ContractType::Employment, "Chef", 365)
            .unwrap();

        let err = store
            .create_contract(employee, restaurant, ContractType::Employment, "Chef again", 30)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Relationship);

        store
            .create_contract(employee, restaurant, ContractType::Contractor, "Catering", 30)
            .unwrap();
        assert_eq!(store.all::<Contract>().count(), 2);
    }

    #[test]
    fn test_contract_field_validation() {
        let mut store = Store::default();
        let (employee, restaurant) = setup(&mut store);
        let err = store
            .create_contract(employee, restaurant, ContractType::Internship, "  ", 30)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store
            .create_contract(employee, restaurant, ContractType::Internship, "Summer", 0)
            .is_err());
        assert!(store.get(employee).unwrap().contracts().is_empty());
    }

    #[test]
    fn test_end_contract() {
        let mut store = Store::default();
        let (employee, restaurant) = setup(&mut store);
        store
            .create_contract(employee, restaurant, ContractType::Volunteer, "Charity day", 1)
            .unwrap();

        assert!(!store.end_contract(employee, restaurant, ContractType::Employment).unwrap());
        assert!(store.end_contract(employee, restaurant, ContractType::Volunteer).unwrap());
        assert!(store.get(employee).unwrap().contracts().is_empty());
        assert!(store.get(restaurant).unwrap().contracts().is_empty());
        assert_eq!(store.all::<Contract>().count(), 0);
    }
}
