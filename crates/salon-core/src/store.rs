//! Store collaborator contract
//!
//! The core never talks to a database directly. Each entity kind is reached
//! through an [`EntityStore`]; "not found" is `Ok(None)` / `Ok(false)`, while
//! `Err` always means the store itself failed.

use anyhow::Result;
use async_trait::async_trait;
use salon_common::{Appointment, Customer, Entity, SalonService, Staff};
use std::sync::Arc;

use crate::memory::MemoryStore;

/// Row-oriented persistence for one entity kind
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn create(&self, entity: &E) -> Result<()>;

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>>;

    /// All rows, oldest first.
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Rows whose `index_keys()` contain `key`, oldest first.
    async fn find_by_index(&self, key: &str) -> Result<Vec<E>>;

    async fn update(&self, entity: &E) -> Result<()>;

    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, id: &E::Id) -> Result<bool>;

    async fn exists(&self, id: &E::Id) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

/// One store handle per entity kind
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn EntityStore<Customer>>,
    pub staff: Arc<dyn EntityStore<Staff>>,
    pub services: Arc<dyn EntityStore<SalonService>>,
    pub appointments: Arc<dyn EntityStore<Appointment>>,
}

impl Repositories {
    /// Fresh, empty in-process stores
    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(MemoryStore::<Customer>::new()),
            staff: Arc::new(MemoryStore::<Staff>::new()),
            services: Arc::new(MemoryStore::<SalonService>::new()),
            appointments: Arc::new(MemoryStore::<Appointment>::new()),
        }
    }
}
