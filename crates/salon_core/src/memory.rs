//! crates/salon_core/src/memory.rs
//!
//! An in-memory `RecordStore`. Used directly by tests, and by the JSON file
//! adapter through a `SnapshotSink` that persists every committed change.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Appointment, AuthSession, Service, User, UserCredentials};
use crate::ports::{PortError, PortResult, RecordStore};

/// The whole store as one serializable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: Vec<UserCredentials>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub sessions: Vec<AuthSession>,
    #[serde(default)]
    pub seeded: bool,
}

/// Receives the complete new state before a mutation is committed.
/// If `persist` fails the mutation is discarded.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn persist(&self, snapshot: &StoreSnapshot) -> PortResult<()>;
}

pub struct InMemoryStore {
    data: RwLock<StoreSnapshot>,
    sink: Option<Box<dyn SnapshotSink>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreSnapshot::default()),
            sink: None,
        }
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
            sink: None,
        }
    }

    pub fn with_sink(snapshot: StoreSnapshot, sink: Box<dyn SnapshotSink>) -> Self {
        Self {
            data: RwLock::new(snapshot),
            sink: Some(sink),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.data.read().await.clone()
    }

    /// Applies `change` to a copy of the data, persists the copy, then swaps it in.
    async fn mutate<T, F>(&self, change: F) -> PortResult<T>
    where
        F: FnOnce(&mut StoreSnapshot) -> PortResult<T> + Send,
        T: Send,
    {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        if let Some(sink) = &self.sink {
            sink.persist(&next).await?;
        }
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_services(&self) -> PortResult<Vec<Service>> {
        Ok(self.data.read().await.services.clone())
    }

    async fn get_service(&self, id: Uuid) -> PortResult<Option<Service>> {
        let data = self.data.read().await;
        Ok(data.services.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_service(&self, service: Service) -> PortResult<()> {
        self.mutate(move |data| {
            data.services.push(service);
            Ok(())
        })
        .await
    }

    async fn update_service(&self, service: Service) -> PortResult<()> {
        self.mutate(move |data| {
            let slot = data
                .services
                .iter_mut()
                .find(|s| s.id == service.id)
                .ok_or_else(|| PortError::NotFound(format!("Service {} not found", service.id)))?;
            *slot = service;
            Ok(())
        })
        .await
    }

    async fn delete_service(&self, id: Uuid) -> PortResult<bool> {
        self.mutate(move |data| {
            let before = data.services.len();
            data.services.retain(|s| s.id != id);
            Ok(data.services.len() != before)
        })
        .await
    }

    async fn delete_all_services(&self) -> PortResult<()> {
        self.mutate(|data| {
            data.services.clear();
            Ok(())
        })
        .await
    }

    async fn list_appointments(&self) -> PortResult<Vec<Appointment>> {
        Ok(self.data.read().await.appointments.clone())
    }

    async fn get_appointment(&self, id: Uuid) -> PortResult<Option<Appointment>> {
        let data = self.data.read().await;
        Ok(data.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> PortResult<()> {
        self.mutate(move |data| {
            data.appointments.push(appointment);
            Ok(())
        })
        .await
    }

    async fn update_appointment(&self, appointment: Appointment) -> PortResult<()> {
        self.mutate(move |data| {
            let slot = data
                .appointments
                .iter_mut()
                .find(|a| a.id == appointment.id)
                .ok_or_else(|| {
                    PortError::NotFound(format!("Appointment {} not found", appointment.id))
                })?;
            *slot = appointment;
            Ok(())
        })
        .await
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().map(|c| c.user.clone()).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|c| c.user.email == email).cloned())
    }

    async fn insert_user(&self, credentials: UserCredentials) -> PortResult<()> {
        self.mutate(move |data| {
            if data.users.iter().any(|c| c.user.email == credentials.user.email) {
                return Err(PortError::Unexpected(format!(
                    "duplicate email {}",
                    credentials.user.email
                )));
            }
            data.users.push(credentials);
            Ok(())
        })
        .await
    }

    async fn insert_session(&self, session: AuthSession) -> PortResult<()> {
        let now = Utc::now();
        self.mutate(move |data| {
            data.sessions
                .retain(|s| s.token != session.token && s.expires_at > now);
            data.sessions.push(session);
            Ok(())
        })
        .await
    }

    async fn get_session(&self, token: &str) -> PortResult<Option<AuthSession>> {
        let data = self.data.read().await;
        Ok(data.sessions.iter().find(|s| s.token == token).cloned())
    }

    async fn delete_session(&self, token: &str) -> PortResult<()> {
        let token = token.to_string();
        self.mutate(move |data| {
            data.sessions.retain(|s| s.token != token);
            Ok(())
        })
        .await
    }

    async fn is_seeded(&self) -> PortResult<bool> {
        Ok(self.data.read().await.seeded)
    }

    async fn mark_seeded(&self) -> PortResult<()> {
        self.mutate(|data| {
            data.seeded = true;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn service(name: &str) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: 10.0,
            duration_minutes: 15,
            image_url: String::new(),
            description: None,
        }
    }

    struct FailingSink {
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SnapshotSink for FailingSink {
        async fn persist(&self, _snapshot: &StoreSnapshot) -> PortResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(PortError::Unexpected("disk full".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.update_service(service("Ghost")).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryStore::new();
        let cut = service("Cut");
        store.insert_service(cut.clone()).await.unwrap();
        assert!(store.delete_service(cut.id).await.unwrap());
        assert!(!store.delete_service(cut.id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_persist_leaves_memory_untouched() {
        let fail = Arc::new(AtomicBool::new(false));
        let store = InMemoryStore::with_sink(
            StoreSnapshot::default(),
            Box::new(FailingSink { fail: fail.clone() }),
        );
        store.insert_service(service("Kept")).await.unwrap();

        fail.store(true, Ordering::SeqCst);
        assert!(store.insert_service(service("Lost")).await.is_err());

        let names: Vec<String> = store
            .list_services()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Kept".to_string()]);
    }
}
