use super::repo_tx_memory::{MemoryStore, MemoryTable};
use super::util::downcast;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct MemoryFriendshipRepo {
    store: Arc<MemoryStore>,
}

impl MemoryFriendshipRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryFriendshipRepo { store }
    }
}

impl MemoryTable {
    fn select(&self, filter: &FriendshipFilter, page: Page) -> Vec<Friendship> {
        page.apply(self.rows.values().filter(|f| filter.matches(f)).cloned())
    }

    fn matching_ids(&self, filter: &FriendshipFilter) -> Vec<FriendshipId> {
        self.rows
            .values()
            .filter(|f| filter.matches(f))
            .map(|f| f.id)
            .collect()
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MemoryFriendshipRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        new: NewFriendship,
    ) -> Result<Friendship, FriendshipError> {
        let table = downcast(tx)?.table();
        let pair = EntityPair::new(&new.sender, &new.recipient)
            .ok_or(FriendshipError::SelfRelationship)?;
        let key = pair.key();

        if table.pair_index.contains_key(&key) {
            return Err(FriendshipError::DuplicateRelationship);
        }

        table.next_id += 1;
        let now = Utc::now();
        let friendship = Friendship {
            id: FriendshipId(table.next_id),
            sender: new.sender,
            recipient: new.recipient,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        table.pair_index.insert(key, friendship.id);
        table.rows.insert(friendship.id, friendship.clone());

        Ok(friendship)
    }

    async fn find_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError> {
        Ok(downcast(tx)?.table().select(filter, page))
    }

    async fn update_status_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
        status: FriendshipStatus,
    ) -> Result<u64, FriendshipError> {
        let table = downcast(tx)?.table();
        let now = Utc::now();

        let ids = table.matching_ids(filter);
        for id in &ids {
            if let Some(row) = table.rows.get_mut(id) {
                row.status = status;
                row.updated_at = now;
            }
        }

        Ok(ids.len() as u64)
    }

    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        filter: &FriendshipFilter,
    ) -> Result<u64, FriendshipError> {
        let table = downcast(tx)?.table();

        let ids = table.matching_ids(filter);
        for id in &ids {
            if let Some(row) = table.rows.remove(id) {
                if let Some(pair) = EntityPair::new(&row.sender, &row.recipient) {
                    table.pair_index.remove(&pair.key());
                }
            }
        }

        Ok(ids.len() as u64)
    }

    async fn find(
        &self,
        filter: &FriendshipFilter,
        page: Page,
    ) -> Result<Vec<Friendship>, FriendshipError> {
        Ok(self.store.lock().await.select(filter, page))
    }

    async fn count(&self, filter: &FriendshipFilter) -> Result<u64, FriendshipError> {
        Ok(self.store.lock().await.matching_ids(filter).len() as u64)
    }
}
