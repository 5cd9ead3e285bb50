pub mod error;
pub mod ids;
pub mod models;

pub use error::{Error, Result};
pub use ids::{AppointmentId, CustomerId, ServiceId, StaffId};
pub use models::{
    Appointment, AppointmentStatus, Customer, Entity, SalonService, Slot, Staff,
};
