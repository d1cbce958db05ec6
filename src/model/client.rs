use crate::core::validation::{is_valid_email, require_non_empty};
use crate::core::{Id, Result, StoreError};
use crate::facade::{Cascade, Store};
use crate::model::{Discount, Person, PersonInfo, Review};
use crate::storage::Keyed;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub(crate) person: PersonInfo,
    pub(crate) user_name: String,
    pub(crate) reviews: Vec<Id<Review>>,
    pub(crate) discounts: Vec<Id<Discount>>,
    /// Always a subset of `discounts`.
    pub(crate) active_discounts: Vec<Id<Discount>>,
}

impl Client {
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn reviews(&self) -> &[Id<Review>] {
        &self.reviews
    }

    pub fn discounts(&self) -> &[Id<Discount>] {
        &self.discounts
    }

    pub fn active_discounts(&self) -> &[Id<Discount>] {
        &self.active_discounts
    }
}

impl Person for Client {
    fn person(&self) -> &PersonInfo {
        &self.person
    }

    fn identity(&self) -> &str {
        &self.user_name
    }

    fn is_valid(&self) -> bool {
        is_valid_email(self.email())
    }
}

impl Keyed for Client {
    fn key(&self) -> &str {
        &self.user_name
    }
}

impl Store {
    pub fn create_client(
        &mut self,
        user_name: &str,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<Id<Client>> {
        let person = PersonInfo::new(name, surname, email)
            .and_then(|person| require_non_empty("User name", user_name).map(|_| person))
            .inspect_err(|err| debug!("Rejected client '{}': {}", user_name, err))?;

        let id = self.extent_mut::<Client>().register(Client {
            person,
            user_name: user_name.to_string(),
            reviews: Vec::new(),
            discounts: Vec::new(),
            active_discounts: Vec::new(),
        });
        debug!("Registered client {} '{}'", id, user_name);
        Ok(id)
    }

    /// Gives `discount` to `client`. A discount owned by another client must
    /// be released first.
    pub fn client_add_discount(&mut self, client: Id<Client>, discount: Id<Discount>) -> Result<()> {
        if let Some(owner) = self.require(discount)?.client.filter(|owner| *owner != client) {
            return Err(StoreError::relationship(format!(
                "discount {} already belongs to client {}",
                discount, owner
            )));
        }
        let entry = self.require_mut(client)?;
        if entry.discounts.contains(&discount) {
            return Ok(());
        }
        entry.discounts.push(discount);
        debug!("Linked client {} -> discount {}", client, discount);
        self.discount_add_client(discount, client)
    }

    /// Takes `discount` away from `client`, active or not.
    pub fn client_remove_discount(
        &mut self,
        client: Id<Client>,
        discount: Id<Discount>,
    ) -> Result<()> {
        let entry = self.require_mut(client)?;
        let Some(position) = entry.discounts.iter().position(|d| *d == discount) else {
            return Ok(());
        };
        entry.discounts.remove(position);
        entry.active_discounts.retain(|d| *d != discount);
        debug!("Unlinked client {} -> discount {}", client, discount);
        self.discount_remove_client(discount, client)
    }

    /// Activates a discount the client already holds; otherwise a no-op.
    pub fn client_add_active_discount(
        &mut self,
        client: Id<Client>,
        discount: Id<Discount>,
    ) -> Result<()> {
        self.ensure_live(discount)?;
        let entry = self.require_mut(client)?;
        if entry.discounts.contains(&discount) && !entry.active_discounts.contains(&discount) {
            entry.active_discounts.push(discount);
        }
        Ok(())
    }

    pub fn client_remove_active_discount(
        &mut self,
        client: Id<Client>,
        discount: Id<Discount>,
    ) -> Result<()> {
        self.require_mut(client)?
            .active_discounts
            .retain(|d| *d != discount);
        Ok(())
    }

    /// Reviews are parts of their client, so removing one deletes it.
    pub fn client_remove_review(&mut self, client: Id<Client>, review: Id<Review>) -> Result<()> {
        if self.require(client)?.reviews.contains(&review) {
            self.delete(review)?;
        }
        Ok(())
    }
}

impl Cascade for Client {
    fn cascade_delete(store: &mut Store, id: Id<Client>) -> Result<()> {
        while let Some(review) = store.require(id)?.reviews.first().copied() {
            store.delete(review)?;
        }
        while let Some(discount) = store.require(id)?.discounts.first().copied() {
            store.client_remove_discount(id, discount)?;
        }
        store.extent_mut::<Client>().unregister(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn client(store: &mut Store, user_name: &str) -> Id<Client> {
        store
            .create_client(user_name, "Marta", "Kowalska", "marta@example.com")
            .unwrap()
    }

    #[test]
    fn test_client_identity_and_email_validity() {
        let mut store = Store::default();
        let good = client(&mut store, "marta");
        let bad = store
            .create_client("kuba", "Jakub", "Nowak", "not-an-email")
            .unwrap();
        assert_eq!(store.get(good).unwrap().identity(), "marta");
        assert!(store.get(good).unwrap().is_valid());
        assert!(!store.get(bad).unwrap().is_valid());
        assert!(store.create_client("", "Jakub", "Nowak", "k@example.com").is_err());
    }

    #[test]
    fn test_discount_link_is_symmetric_and_idempotent() {
        let mut store = Store::default();
        let marta = client(&mut store, "marta");
        let card = store.create_giftcard(50.0).unwrap();

        store.client_add_discount(marta, card).unwrap();
        store.discount_add_client(card, marta).unwrap();
        store.client_add_discount(marta, card).unwrap();
        assert_eq!(store.get(marta).unwrap().discounts(), &[card]);
        assert_eq!(store.get(card).unwrap().client(), Some(marta));

        store.discount_remove_client(card, marta).unwrap();
        store.client_remove_discount(marta, card).unwrap();
        assert!(store.get(marta).unwrap().discounts().is_empty());
        assert_eq!(store.get(card).unwrap().client(), None);
    }

    #[test]
    fn test_discount_cannot_change_owner_implicitly() {
        let mut store = Store::default();
        let marta = client(&mut store, "marta");
        let kuba = client(&mut store, "kuba");
        let card = store.create_giftcard(50.0).unwrap();
        store.client_add_discount(marta, card).unwrap();

        let err = store.client_add_discount(kuba, card).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Relationship);
        assert!(store.discount_add_client(card, kuba).is_err());
        assert!(store.get(kuba).unwrap().discounts().is_empty());
    }

    #[test]
    fn test_active_discounts_stay_a_subset() {
        let mut store = Store::default();
        let marta = client(&mut store, "marta");
        let held = store.create_giftcard(20.0).unwrap();
        let foreign = store.create_giftcard(30.0).unwrap();
        store.client_add_discount(marta, held).unwrap();

        store.client_add_active_discount(marta, foreign).unwrap();
        store.client_add_active_discount(marta, held).unwrap();
        store.client_add_active_discount(marta, held).unwrap();
        assert_eq!(store.get(marta).unwrap().active_discounts(), &[held]);

        store.client_remove_discount(marta, held).unwrap();
        assert!(store.get(marta).unwrap().active_discounts().is_empty());
    }

    #[test]
    fn test_delete_client_removes_reviews_and_releases_discounts() {
        let mut store = Store::default();
        let marta = client(&mut store, "marta");
        let review = store.create_review(marta, "Great", "Best pierogi in town").unwrap();
        let card = store.create_giftcard(25.0).unwrap();
        store.client_add_discount(marta, card).unwrap();
        store.client_add_active_discount(marta, card).unwrap();

        store.delete(marta).unwrap();

        assert!(!store.contains(marta));
        assert!(!store.contains(review));
        assert!(store.contains(card));
        assert_eq!(store.get(card).unwrap().client(), None);
    }
}
