//! Salon Booking Core
//!
//! Entity directories (customers, staff, services) and the appointment
//! booking core: reference validation, double-booking detection, price
//! snapshots and the status state machine. Persistence is reached only
//! through the [`EntityStore`] contract.

pub mod appointments;
pub mod catalog;
pub mod customers;
pub mod locks;
pub mod memory;
pub mod search;
pub mod staff;
pub mod store;

pub use appointments::{AppointmentService, BookingRequest, RescheduleRequest};
pub use catalog::ServiceCatalog;
pub use customers::CustomerDirectory;
pub use memory::MemoryStore;
pub use staff::StaffDirectory;
pub use store::{EntityStore, Repositories};
