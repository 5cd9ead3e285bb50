//! In-process entity store

use anyhow::Result;
use async_trait::async_trait;
use salon_common::Entity;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::EntityStore;

/// `HashMap`-backed store, used for tests and `STORAGE_BACKEND=memory`
pub struct MemoryStore<E: Entity> {
    rows: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn oldest_first<E: Entity>(mut rows: Vec<E>) -> Vec<E> {
    rows.sort_by_key(|row| row.created_at());
    rows
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    async fn create(&self, entity: &E) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&entity.id()) {
            anyhow::bail!("{} row {} already exists", E::KIND, entity.id());
        }
        rows.insert(entity.id(), entity.clone());
        debug!("Inserted {} row {}", E::KIND, entity.id());
        Ok(())
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        let rows = self.rows.read().await.values().cloned().collect();
        Ok(oldest_first(rows))
    }

    async fn find_by_index(&self, key: &str) -> Result<Vec<E>> {
        let rows = self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.index_keys().iter().any(|k| k == key))
            .cloned()
            .collect();
        Ok(oldest_first(rows))
    }

    async fn update(&self, entity: &E) -> Result<()> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&entity.id()) {
            Some(row) => {
                *row = entity.clone();
                debug!("Updated {} row {}", E::KIND, entity.id());
                Ok(())
            }
            None => anyhow::bail!("{} row {} does not exist", E::KIND, entity.id()),
        }
    }

    async fn delete(&self, id: &E::Id) -> Result<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }

    async fn exists(&self, id: &E::Id) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(id))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.rows.read().await.len())
    }
}
