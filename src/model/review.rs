use crate::core::validation::require_non_empty;
use crate::core::{Id, Result};
use crate::facade::{Cascade, Store};
use crate::model::Client;
use log::debug;
use serde::{Deserialize, Serialize};

/// Part of exactly one client for its whole life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub(crate) client: Id<Client>,
    pub(crate) title: String,
    pub(crate) content: String,
}

impl Review {
    pub fn client(&self) -> Id<Client> {
        self.client
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Store {
    pub fn create_review(
        &mut self,
        client: Id<Client>,
        title: &str,
        content: &str,
    ) -> Result<Id<Review>> {
        self.ensure_live(client)?;
        require_non_empty("Review title", title)?;
        require_non_empty("Review content", content)?;

        let id = self.extent_mut::<Review>().register(Review {
            client,
            title: title.to_string(),
            content: content.to_string(),
        });
        self.require_mut(client)?.reviews.push(id);
        debug!("Client {} wrote review {}", client, id);
        Ok(id)
    }

    pub fn set_review_title(&mut self, review: Id<Review>, title: &str) -> Result<()> {
        require_non_empty("Review title", title)?;
        self.require_mut(review)?.title = title.to_string();
        Ok(())
    }
}

impl Cascade for Review {
    fn cascade_delete(store: &mut Store, id: Id<Review>) -> Result<()> {
        let client = store.require(id)?.client;
        store.require_mut(client)?.reviews.retain(|r| *r != id);
        store.extent_mut::<Review>().unregister(id);
        Ok(())
    }
}
