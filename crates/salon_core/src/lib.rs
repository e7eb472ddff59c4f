pub mod accounts;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod memory;
pub mod ports;
pub mod scheduling;
pub mod seed;

pub use accounts::Accounts;
pub use catalog::Catalog;
pub use domain::{
    Appointment, AppointmentStatus, AuthSession, NewService, NewUser, Service, ServicePatch,
    TimeSlot, User, UserCredentials, UserRole,
};
pub use error::{CoreError, CoreResult};
pub use memory::{InMemoryStore, SnapshotSink, StoreSnapshot};
pub use ports::{CredentialHasher, PortError, PortResult, RecordStore, StyleAdvisor};
pub use scheduling::{BookingRequest, Scheduler};
