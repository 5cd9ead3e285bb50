//! Appointment booking core
//!
//! Validates bookings against the customer, staff and service directories,
//! rejects double bookings, snapshots the service price and applies status
//! changes. Every check fails fast and nothing is written unless all checks
//! pass.
//!
//! Status changes are deliberately permissive: any of the four statuses may
//! follow any other, including itself.

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use salon_common::{
    Appointment, AppointmentId, AppointmentStatus, CustomerId, Error, Result, ServiceId, Slot,
    StaffId,
};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use crate::catalog::ServiceCatalog;
use crate::customers::CustomerDirectory;
use crate::locks::SlotLocks;
use crate::staff::StaffDirectory;
use crate::store::EntityStore;

/// Input for booking a new appointment.
///
/// `date`/`time` are optional so that a missing value is reported as
/// `InvalidDate`/`InvalidTime` by the booking pipeline itself.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub service_id: ServiceId,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: String,
}

/// Input for a full update of an existing appointment.
#[derive(Debug, Clone)]
pub struct RescheduleRequest {
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
    pub service_id: ServiceId,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Raw status token, validated against the four known statuses
    pub status: String,
    pub notes: String,
}

/// References that passed validation, with the price captured from the service.
struct ValidatedBooking {
    slot: Slot,
    price: Decimal,
}

pub struct AppointmentService {
    store: Arc<dyn EntityStore<Appointment>>,
    customers: Arc<CustomerDirectory>,
    staff: Arc<StaffDirectory>,
    catalog: Arc<ServiceCatalog>,
    locks: SlotLocks,
}

impl AppointmentService {
    pub fn new(
        store: Arc<dyn EntityStore<Appointment>>,
        customers: Arc<CustomerDirectory>,
        staff: Arc<StaffDirectory>,
        catalog: Arc<ServiceCatalog>,
    ) -> Self {
        Self {
            store,
            customers,
            staff,
            catalog,
            locks: SlotLocks::new(),
        }
    }

    /// Book a new appointment in `scheduled` state.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment> {
        let booking = self
            .validate_references(
                request.customer_id,
                request.staff_id,
                request.service_id,
                request.date,
                request.time,
            )
            .await?;

        let _schedule = self.locks.acquire(booking.slot.staff_id).await;

        debug!("Checking for conflicts on {:?}", booking.slot);
        self.ensure_slot_free(&booking.slot).await?;

        let appointment = Appointment::new(
            request.customer_id,
            booking.slot.staff_id,
            request.service_id,
            booking.slot.date,
            booking.slot.time,
            request.notes,
            booking.price,
        );

        self.store
            .create(&appointment)
            .await
            .context("failed to create appointment")?;

        info!(
            "Created appointment {} for staff {} on {} at {}",
            appointment.id, appointment.staff_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    pub async fn get(&self, id: AppointmentId) -> Result<Appointment> {
        self.store
            .find_by_id(&id)
            .await
            .context("failed to get appointment")?
            .ok_or(Error::AppointmentNotFound)
    }

    /// Overwrite every mutable field and re-snapshot the service price.
    ///
    /// The conflict check only runs when staff, date or time change, so an
    /// appointment never conflicts with itself. The comparison is made
    /// against the row as re-read under the schedule locks.
    pub async fn update(&self, id: AppointmentId, request: RescheduleRequest) -> Result<Appointment> {
        let seen = self.get(id).await?;

        let booking = self
            .validate_references(
                request.customer_id,
                request.staff_id,
                request.service_id,
                request.date,
                request.time,
            )
            .await?;

        let status: AppointmentStatus = request.status.parse()?;

        let (mut appointment, _schedules) = self
            .lock_schedules(id, seen, Some(booking.slot.staff_id))
            .await?;

        if appointment.slot() != booking.slot {
            debug!(
                "Appointment {} moves from {:?} to {:?}",
                id,
                appointment.slot(),
                booking.slot
            );
            self.ensure_slot_free(&booking.slot).await?;
        }

        appointment.customer_id = request.customer_id;
        appointment.staff_id = booking.slot.staff_id;
        appointment.service_id = request.service_id;
        appointment.date = booking.slot.date;
        appointment.time = booking.slot.time;
        appointment.status = status;
        appointment.notes = request.notes;
        appointment.total_price = booking.price;
        appointment.touch();

        self.store
            .update(&appointment)
            .await
            .context("failed to update appointment")?;

        info!("Updated appointment {}", appointment.id);
        Ok(appointment)
    }

    /// Change only the status. The slot is untouched, so no conflict check.
    pub async fn update_status(&self, id: AppointmentId, status: &str) -> Result<Appointment> {
        let seen = self.get(id).await?;
        let status: AppointmentStatus = status.parse()?;

        let (mut appointment, _schedule) = self.lock_schedules(id, seen, None).await?;

        let previous = appointment.status;
        appointment.status = status;
        appointment.touch();

        self.store
            .update(&appointment)
            .await
            .context("failed to update appointment status")?;

        info!(
            "Updated appointment status: {} -> {} (ID: {})",
            previous, status, appointment.id
        );
        Ok(appointment)
    }

    pub async fn delete(&self, id: AppointmentId) -> Result<()> {
        let seen = self.get(id).await?;
        let (_, _schedule) = self.lock_schedules(id, seen, None).await?;

        self.store
            .delete(&id)
            .await
            .context("failed to delete appointment")?;

        info!("Deleted appointment with ID: {}", id);
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>> {
        let all = self
            .store
            .find_all()
            .await
            .context("failed to get all appointments")?;
        Ok(chronological(all))
    }

    pub async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Appointment>> {
        self.list_by_index(
            Appointment::customer_index(customer_id),
            "failed to get appointments by customer",
        )
        .await
    }

    pub async fn list_by_staff(&self, staff_id: StaffId) -> Result<Vec<Appointment>> {
        self.list_by_index(
            Appointment::staff_index(staff_id),
            "failed to get appointments by staff",
        )
        .await
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        self.list_by_index(
            Appointment::date_index(date),
            "failed to get appointments by date",
        )
        .await
    }

    /// Appointments with `start <= date <= end`.
    pub async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        if start > end {
            return Err(Error::InvalidDate);
        }
        let in_range = self
            .list_all()
            .await?
            .into_iter()
            .filter(|a| a.date >= start && a.date <= end)
            .collect();
        Ok(in_range)
    }

    pub async fn list_by_status(&self, status: &str) -> Result<Vec<Appointment>> {
        let status: AppointmentStatus = status.parse()?;
        self.list_by_index(
            Appointment::status_index(status),
            "failed to get appointments by status",
        )
        .await
    }

    async fn list_by_index(&self, key: String, what: &'static str) -> Result<Vec<Appointment>> {
        let rows = self.store.find_by_index(&key).await.context(what)?;
        Ok(chronological(rows))
    }

    /// Steps shared by book and update, in order: customer, staff, service
    /// (capturing its price), date, time.
    async fn validate_references(
        &self,
        customer_id: CustomerId,
        staff_id: StaffId,
        service_id: ServiceId,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> Result<ValidatedBooking> {
        if !self.customers.exists(customer_id).await? {
            return Err(Error::CustomerNotFound);
        }
        debug!("Customer {} exists", customer_id);

        if !self.staff.exists(staff_id).await? {
            return Err(Error::StaffNotFound);
        }
        debug!("Staff {} exists", staff_id);

        let price = self
            .catalog
            .price_of(service_id)
            .await?
            .ok_or(Error::ServiceNotFound)?;
        debug!("Service {} exists, price: {}", service_id, price);

        let date = date.ok_or(Error::InvalidDate)?;
        let time = time.ok_or(Error::InvalidTime)?;

        Ok(ValidatedBooking {
            slot: Slot {
                staff_id,
                date,
                time,
            },
            price,
        })
    }

    /// Lock the schedule the appointment currently sits on (plus `target`,
    /// if given) and return the row as read under those locks.
    ///
    /// Every rewrite of an existing appointment holds its current staff
    /// member's lock, so if the re-read row still names the staff member we
    /// locked, nobody can move it until the guards drop. If it moved in the
    /// meantime, lock the new schedule and try again.
    async fn lock_schedules(
        &self,
        id: AppointmentId,
        mut seen: Appointment,
        target: Option<StaffId>,
    ) -> Result<(Appointment, Vec<OwnedMutexGuard<()>>)> {
        loop {
            let mut staff = vec![seen.staff_id];
            staff.extend(target);
            let guards = self.locks.acquire_all(&staff).await;

            let current = self.get(id).await?;
            if current.staff_id == seen.staff_id {
                return Ok((current, guards));
            }

            debug!(
                "Appointment {} moved to staff {} while waiting, retrying",
                id, current.staff_id
            );
            drop(guards);
            seen = current;
        }
    }

    async fn ensure_slot_free(&self, slot: &Slot) -> Result<()> {
        let booked = self
            .store
            .find_by_index(&Appointment::staff_index(slot.staff_id))
            .await
            .context("failed to check for conflicts")?;

        match find_conflict(&booked, slot) {
            Some(existing) => {
                debug!("Slot {:?} already held by appointment {}", slot, existing.id);
                Err(Error::ConflictingBooking)
            }
            None => Ok(()),
        }
    }
}

/// First active appointment holding `slot`, if any.
pub fn find_conflict<'a>(booked: &'a [Appointment], slot: &Slot) -> Option<&'a Appointment> {
    booked.iter().find(|existing| existing.holds(slot))
}

fn chronological(mut rows: Vec<Appointment>) -> Vec<Appointment> {
    rows.sort_by_key(|a| (a.date, a.time, a.created_at));
    rows
}
