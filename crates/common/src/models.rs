//! Data models for the salon booking backend

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::Error;
use crate::ids::{AppointmentId, CustomerId, ServiceId, StaffId};

/// A row kind that can live in an entity store.
///
/// `KIND` namespaces the rows in the backing store. `index_keys` lists the
/// secondary lookups a row participates in; stores keep those in sync on
/// every write so `find_by_index` never needs a full scan.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Copy + Eq + Hash + fmt::Display + Send + Sync + 'static;

    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    fn created_at(&self) -> DateTime<Utc>;

    fn index_keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Salon customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: String, email: String, phone: String) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new(),
            name,
            email,
            phone,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn email_index(email: &str) -> String {
        format!("email:{}", email.trim().to_lowercase())
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    const KIND: &'static str = "customers";

    fn id(&self) -> CustomerId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn index_keys(&self) -> Vec<String> {
        vec![Self::email_index(&self.email)]
    }
}

/// Staff member who performs services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    pub fn new(name: String, email: String, role: String, phone: String) -> Self {
        let now = Utc::now();
        Self {
            id: StaffId::new(),
            name,
            email,
            role,
            phone,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn email_index(email: &str) -> String {
        format!("email:{}", email.trim().to_lowercase())
    }

    pub fn role_index(role: &str) -> String {
        format!("role:{}", role.trim().to_lowercase())
    }
}

impl Entity for Staff {
    type Id = StaffId;
    const KIND: &'static str = "staff";

    fn id(&self) -> StaffId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn index_keys(&self) -> Vec<String> {
        vec![Self::email_index(&self.email), Self::role_index(&self.role)]
    }
}

/// A service offered by the salon (haircut, manicure, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalonService {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Current list price; appointments copy it at booking time
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalonService {
    pub fn new(name: String, description: String, category: String, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            name,
            description,
            price,
            category,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn category_index(category: &str) -> String {
        format!("category:{}", category.trim().to_lowercase())
    }
}

impl Entity for SalonService {
    type Id = ServiceId;
    const KIND: &'static str = "services";

    fn id(&self) -> ServiceId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn index_keys(&self) -> Vec<String> {
        vec![Self::category_index(&self.category)]
    }
}

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, not yet confirmed
    Scheduled,
    /// Confirmed with the customer
    Confirmed,
    /// Service delivered
    Completed,
    /// Called off; the slot is free again
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidStatus(s.to_string()))
    }
}

/// The (staff, date, time) tuple that at most one active appointment may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// A booked appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Assigned at creation, never changes
    pub id: AppointmentId,

    pub customer_id: CustomerId,

    pub staff_id: StaffId,

    pub service_id: ServiceId,

    /// Calendar day of the booking
    #[serde(rename = "appointment_date")]
    pub date: NaiveDate,

    /// Time of day of the booking
    #[serde(rename = "appointment_time")]
    pub time: NaiveTime,

    pub status: AppointmentStatus,

    #[serde(default)]
    pub notes: String,

    /// Service price captured at the last create/update
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a new scheduled appointment
    pub fn new(
        customer_id: CustomerId,
        staff_id: StaffId,
        service_id: ServiceId,
        date: NaiveDate,
        time: NaiveTime,
        notes: String,
        total_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AppointmentId::new(),
            customer_id,
            staff_id,
            service_id,
            date,
            time,
            status: AppointmentStatus::Scheduled,
            notes,
            total_price,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot {
            staff_id: self.staff_id,
            date: self.date,
            time: self.time,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    /// Whether this appointment currently occupies `slot`.
    pub fn holds(&self, slot: &Slot) -> bool {
        self.is_active() && self.slot() == *slot
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn staff_index(staff_id: StaffId) -> String {
        format!("staff:{}", staff_id)
    }

    pub fn customer_index(customer_id: CustomerId) -> String {
        format!("customer:{}", customer_id)
    }

    pub fn date_index(date: NaiveDate) -> String {
        format!("date:{}", date.format("%Y-%m-%d"))
    }

    pub fn status_index(status: AppointmentStatus) -> String {
        format!("status:{}", status)
    }
}

impl Entity for Appointment {
    type Id = AppointmentId;
    const KIND: &'static str = "appointments";

    fn id(&self) -> AppointmentId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn index_keys(&self) -> Vec<String> {
        vec![
            Self::staff_index(self.staff_id),
            Self::customer_index(self.customer_id),
            Self::date_index(self.date),
            Self::status_index(self.status),
        ]
    }
}
