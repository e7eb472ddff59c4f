//! crates/salon_core/src/catalog.rs
//!
//! Catalog management: plain CRUD over services with field validation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::domain::{image_or_placeholder, NewService, Service, ServicePatch, MAX_SERVICE_MINUTES};
use crate::error::{CoreError, CoreResult};
use crate::ports::RecordStore;

pub struct Catalog {
    store: Arc<dyn RecordStore>,
    /// Serialises the read-merge-write of `update`.
    write_lock: Mutex<()>,
}

impl Catalog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> CoreResult<Vec<Service>> {
        Ok(self.store.list_services().await?)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Service> {
        self.store
            .get_service(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, new: NewService) -> CoreResult<Service> {
        let service = Service {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            price: new.price,
            duration_minutes: new.duration_minutes,
            image_url: image_or_placeholder(new.image_url),
            description: new.description,
        };
        validate(&service)?;
        self.store.insert_service(service.clone()).await?;
        info!("Created service {} ({})", service.id, service.name);
        Ok(service)
    }

    pub async fn update(&self, id: Uuid, patch: ServicePatch) -> CoreResult<Service> {
        let _guard = self.write_lock.lock().await;
        let current = self.get(id).await?;
        let mut updated = current.merged(patch);
        updated.name = updated.name.trim().to_string();
        validate(&updated)?;
        self.store.update_service(updated.clone()).await?;
        info!("Updated service {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.store.delete_service(id).await? {
            return Err(not_found(id));
        }
        info!("Deleted service {}", id);
        Ok(())
    }

    /// Empties the catalog. Existing appointments keep their frozen totals.
    pub async fn delete_all(&self) -> CoreResult<()> {
        self.store.delete_all_services().await?;
        info!("Cleared the service catalog");
        Ok(())
    }
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::NotFound(format!("Service {} not found", id))
}

fn validate(service: &Service) -> CoreResult<()> {
    if service.name.is_empty() {
        return Err(CoreError::validation("service name is required"));
    }
    if !service.price.is_finite() || service.price < 0.0 {
        return Err(CoreError::validation("price must be a non-negative number"));
    }
    if service.duration_minutes == 0 {
        return Err(CoreError::validation("duration must be at least one minute"));
    }
    if service.duration_minutes > MAX_SERVICE_MINUTES {
        return Err(CoreError::Validation(format!(
            "duration must not exceed {} minutes",
            MAX_SERVICE_MINUTES
        )));
    }
    Ok(())
}
