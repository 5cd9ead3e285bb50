//! Staff directory

use anyhow::Context;
use chrono::Utc;
use salon_common::{Error, Result, Staff, StaffId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::locks::KeyedLocks;
use crate::search::filter_matching;
use crate::store::EntityStore;

pub struct StaffDirectory {
    store: Arc<dyn EntityStore<Staff>>,
    /// Serializes the email uniqueness check with the write
    emails: KeyedLocks<String>,
}

fn validate(name: &str, email: &str, role: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName);
    }
    if email.trim().is_empty() {
        return Err(Error::InvalidEmail);
    }
    if role.trim().is_empty() {
        return Err(Error::InvalidRole);
    }
    Ok(())
}

impl StaffDirectory {
    pub fn new(store: Arc<dyn EntityStore<Staff>>) -> Self {
        Self {
            store,
            emails: KeyedLocks::new(),
        }
    }

    pub async fn create(
        &self,
        name: String,
        email: String,
        role: String,
        phone: String,
    ) -> Result<Staff> {
        validate(&name, &email, &role)?;

        let _email = self.emails.acquire(email.trim().to_lowercase()).await;
        if self.find_by_email(&email).await?.is_some() {
            return Err(Error::AlreadyExists(format!("staff with email {}", email)));
        }

        let staff = Staff::new(name, email, role, phone);
        self.store
            .create(&staff)
            .await
            .context("failed to create staff")?;

        info!("Created staff: {} (ID: {})", staff.name, staff.id);
        Ok(staff)
    }

    pub async fn get(&self, id: StaffId) -> Result<Staff> {
        self.store
            .find_by_id(&id)
            .await
            .context("failed to get staff")?
            .ok_or(Error::StaffNotFound)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Staff> {
        if email.trim().is_empty() {
            return Err(Error::InvalidEmail);
        }
        self.find_by_email(email).await?.ok_or(Error::StaffNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Staff>> {
        Ok(self
            .store
            .find_all()
            .await
            .context("failed to get all staff")?)
    }

    /// Staff with the given role; an empty role lists everyone.
    pub async fn list_by_role(&self, role: &str) -> Result<Vec<Staff>> {
        if role.trim().is_empty() {
            return self.list().await;
        }
        Ok(self
            .store
            .find_by_index(&Staff::role_index(role))
            .await
            .context("failed to get staff by role")?)
    }

    /// Distinct roles, sorted.
    pub async fn roles(&self) -> Result<Vec<String>> {
        let roles: BTreeSet<String> = self.list().await?.into_iter().map(|s| s.role).collect();
        Ok(roles.into_iter().collect())
    }

    /// Search name, email and role.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Staff>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let all = self.list().await?;
        Ok(filter_matching(all, query, limit, |s| {
            vec![s.name.as_str(), s.email.as_str(), s.role.as_str()]
        }))
    }

    pub async fn update(
        &self,
        id: StaffId,
        name: String,
        email: String,
        role: String,
        phone: String,
    ) -> Result<Staff> {
        validate(&name, &email, &role)?;

        let _email = self.emails.acquire(email.trim().to_lowercase()).await;
        let mut staff = self.get(id).await?;

        if !staff.email.eq_ignore_ascii_case(&email) {
            if let Some(existing) = self.find_by_email(&email).await? {
                if existing.id != id {
                    return Err(Error::AlreadyExists(format!("staff with email {}", email)));
                }
            }
        }

        staff.name = name;
        staff.email = email;
        staff.role = role;
        staff.phone = phone;
        staff.updated_at = Utc::now();

        self.store
            .update(&staff)
            .await
            .context("failed to update staff")?;

        info!("Updated staff: {} (ID: {})", staff.name, staff.id);
        Ok(staff)
    }

    pub async fn delete(&self, id: StaffId) -> Result<()> {
        if !self.exists(id).await? {
            return Err(Error::StaffNotFound);
        }
        self.store
            .delete(&id)
            .await
            .context("failed to delete staff")?;

        info!("Deleted staff with ID: {}", id);
        Ok(())
    }

    pub async fn exists(&self, id: StaffId) -> Result<bool> {
        Ok(self
            .store
            .exists(&id)
            .await
            .context("failed to check staff existence")?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self
            .store
            .count()
            .await
            .context("failed to get staff count")?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Staff>> {
        let matches = self
            .store
            .find_by_index(&Staff::email_index(email))
            .await
            .context("failed to check existing staff")?;
        Ok(matches.into_iter().next())
    }
}
