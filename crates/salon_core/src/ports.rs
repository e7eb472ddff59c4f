//! crates/salon_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the salon's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or LLM APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Appointment, AuthSession, Service, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistent mapping of id -> record, scoped by entity type.
///
/// `update_*` of an id that is not stored fails with `PortError::NotFound`;
/// `get_*` returns `Ok(None)` instead.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Services ---
    async fn list_services(&self) -> PortResult<Vec<Service>>;

    async fn get_service(&self, id: Uuid) -> PortResult<Option<Service>>;

    async fn insert_service(&self, service: Service) -> PortResult<()>;

    async fn update_service(&self, service: Service) -> PortResult<()>;

    /// Returns whether a record was removed.
    async fn delete_service(&self, id: Uuid) -> PortResult<bool>;

    async fn delete_all_services(&self) -> PortResult<()>;

    // --- Appointments ---
    async fn list_appointments(&self) -> PortResult<Vec<Appointment>>;

    async fn get_appointment(&self, id: Uuid) -> PortResult<Option<Appointment>>;

    async fn insert_appointment(&self, appointment: Appointment) -> PortResult<()>;

    async fn update_appointment(&self, appointment: Appointment) -> PortResult<()>;

    // --- Users ---
    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn insert_user(&self, credentials: UserCredentials) -> PortResult<()>;

    // --- Auth Sessions ---
    async fn insert_session(&self, session: AuthSession) -> PortResult<()>;

    async fn get_session(&self, token: &str) -> PortResult<Option<AuthSession>>;

    async fn delete_session(&self, token: &str) -> PortResult<()>;

    // --- Bootstrap ---
    /// Whether the default data has been loaded once already.
    async fn is_seeded(&self) -> PortResult<bool>;

    async fn mark_seeded(&self) -> PortResult<()>;
}

/// One-way credential hashing. Implementations salt internally.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> PortResult<String>;

    fn verify(&self, plain: &str, hash: &str) -> PortResult<bool>;
}

#[async_trait]
pub trait StyleAdvisor: Send + Sync {
    /// Suggests which of the offered services best fits a client's request.
    async fn advise(&self, query: &str, services: &[Service]) -> PortResult<String>;
}
