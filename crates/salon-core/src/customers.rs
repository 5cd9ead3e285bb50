//! Customer directory

use anyhow::Context;
use salon_common::{Customer, CustomerId, Error, Result};
use std::sync::Arc;
use tracing::info;

use crate::locks::KeyedLocks;
use crate::search::filter_matching;
use crate::store::EntityStore;

pub struct CustomerDirectory {
    store: Arc<dyn EntityStore<Customer>>,
    /// Serializes the email uniqueness check with the write
    emails: KeyedLocks<String>,
}

fn validate(name: &str, email: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName);
    }
    if email.trim().is_empty() {
        return Err(Error::InvalidEmail);
    }
    Ok(())
}

impl CustomerDirectory {
    pub fn new(store: Arc<dyn EntityStore<Customer>>) -> Self {
        Self {
            store,
            emails: KeyedLocks::new(),
        }
    }

    pub async fn create(&self, name: String, email: String, phone: String) -> Result<Customer> {
        validate(&name, &email)?;

        let _email = self.emails.acquire(email.trim().to_lowercase()).await;
        if self.find_by_email(&email).await?.is_some() {
            return Err(Error::AlreadyExists(format!("customer with email {}", email)));
        }

        let customer = Customer::new(name, email, phone);
        self.store
            .create(&customer)
            .await
            .context("failed to create customer")?;

        info!("Created customer: {} (ID: {})", customer.name, customer.id);
        Ok(customer)
    }

    pub async fn get(&self, id: CustomerId) -> Result<Customer> {
        self.store
            .find_by_id(&id)
            .await
            .context("failed to get customer")?
            .ok_or(Error::CustomerNotFound)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Customer> {
        if email.trim().is_empty() {
            return Err(Error::InvalidEmail);
        }
        self.find_by_email(email).await?.ok_or(Error::CustomerNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Customer>> {
        Ok(self
            .store
            .find_all()
            .await
            .context("failed to get all customers")?)
    }

    /// Search name, email and phone.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Customer>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let all = self.list().await?;
        Ok(filter_matching(all, query, limit, |c| {
            vec![c.name.as_str(), c.email.as_str(), c.phone.as_str()]
        }))
    }

    /// Case-insensitive substring match on the name alone, unlimited.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Customer>> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }
        let all = self.list().await?;
        Ok(filter_matching(all, name, usize::MAX, |c| vec![c.name.as_str()]))
    }

    pub async fn update(
        &self,
        id: CustomerId,
        name: String,
        email: String,
        phone: String,
    ) -> Result<Customer> {
        validate(&name, &email)?;

        let _email = self.emails.acquire(email.trim().to_lowercase()).await;
        let mut customer = self.get(id).await?;

        if !customer.email.eq_ignore_ascii_case(&email) {
            if let Some(existing) = self.find_by_email(&email).await? {
                if existing.id != id {
                    return Err(Error::AlreadyExists(format!("customer with email {}", email)));
                }
            }
        }

        customer.name = name;
        customer.email = email;
        customer.phone = phone;
        customer.updated_at = chrono::Utc::now();

        self.store
            .update(&customer)
            .await
            .context("failed to update customer")?;

        info!("Updated customer: {} (ID: {})", customer.name, customer.id);
        Ok(customer)
    }

    pub async fn delete(&self, id: CustomerId) -> Result<()> {
        if !self.exists(id).await? {
            return Err(Error::CustomerNotFound);
        }
        self.store
            .delete(&id)
            .await
            .context("failed to delete customer")?;

        info!("Deleted customer with ID: {}", id);
        Ok(())
    }

    pub async fn exists(&self, id: CustomerId) -> Result<bool> {
        Ok(self
            .store
            .exists(&id)
            .await
            .context("failed to check customer existence")?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self
            .store
            .count()
            .await
            .context("failed to get customer count")?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let matches = self
            .store
            .find_by_index(&Customer::email_index(email))
            .await
            .context("failed to check existing customer")?;
        Ok(matches.into_iter().next())
    }
}
