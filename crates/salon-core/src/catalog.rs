//! Catalog of services offered by the salon

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use salon_common::{Error, Result, SalonService, ServiceId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::search::filter_matching;
use crate::store::EntityStore;

pub struct ServiceCatalog {
    store: Arc<dyn EntityStore<SalonService>>,
}

fn validate(name: &str, price: Decimal) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName);
    }
    if price <= Decimal::ZERO {
        return Err(Error::InvalidPrice);
    }
    Ok(())
}

impl ServiceCatalog {
    pub fn new(store: Arc<dyn EntityStore<SalonService>>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        name: String,
        description: String,
        category: String,
        price: Decimal,
    ) -> Result<SalonService> {
        validate(&name, price)?;

        let service = SalonService::new(name, description, category, price);
        self.store
            .create(&service)
            .await
            .context("failed to create service")?;

        info!("Created service: {} (ID: {})", service.name, service.id);
        Ok(service)
    }

    pub async fn get(&self, id: ServiceId) -> Result<SalonService> {
        self.store
            .find_by_id(&id)
            .await
            .context("failed to get service")?
            .ok_or(Error::ServiceNotFound)
    }

    /// Current price of a service, `None` if it does not exist.
    pub async fn price_of(&self, id: ServiceId) -> Result<Option<Decimal>> {
        let service = self
            .store
            .find_by_id(&id)
            .await
            .context("failed to get service")?;
        Ok(service.map(|s| s.price))
    }

    pub async fn list(&self) -> Result<Vec<SalonService>> {
        Ok(self
            .store
            .find_all()
            .await
            .context("failed to get all services")?)
    }

    /// Services in a category; an empty category lists everything.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<SalonService>> {
        if category.trim().is_empty() {
            return self.list().await;
        }
        Ok(self
            .store
            .find_by_index(&SalonService::category_index(category))
            .await
            .context("failed to get services by category")?)
    }

    /// Distinct non-empty categories, sorted.
    pub async fn categories(&self) -> Result<Vec<String>> {
        let categories: BTreeSet<String> = self
            .list()
            .await?
            .into_iter()
            .map(|s| s.category)
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }

    /// Search name and description.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SalonService>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let all = self.list().await?;
        Ok(filter_matching(all, query, limit, |s| {
            vec![s.name.as_str(), s.description.as_str()]
        }))
    }

    /// Changing the price never touches existing appointments; they keep
    /// the price captured when they were booked or last updated.
    pub async fn update(
        &self,
        id: ServiceId,
        name: String,
        description: String,
        category: String,
        price: Decimal,
    ) -> Result<SalonService> {
        validate(&name, price)?;

        let mut service = self.get(id).await?;
        service.name = name;
        service.description = description;
        service.category = category;
        service.price = price;
        service.updated_at = Utc::now();

        self.store
            .update(&service)
            .await
            .context("failed to update service")?;

        info!("Updated service: {} (ID: {})", service.name, service.id);
        Ok(service)
    }

    pub async fn delete(&self, id: ServiceId) -> Result<()> {
        if !self.exists(id).await? {
            return Err(Error::ServiceNotFound);
        }
        self.store
            .delete(&id)
            .await
            .context("failed to delete service")?;

        info!("Deleted service with ID: {}", id);
        Ok(())
    }

    pub async fn exists(&self, id: ServiceId) -> Result<bool> {
        Ok(self
            .store
            .exists(&id)
            .await
            .context("failed to check service existence")?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self
            .store
            .count()
            .await
            .context("failed to get service count")?)
    }
}
