//! crates/salon_core/src/scheduling.rs
//!
//! The appointment scheduling core: booking with interval conflict detection,
//! and status updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Appointment, AppointmentStatus, Service, TimeSlot};
use crate::error::{CoreError, CoreResult};
use crate::ports::RecordStore;

/// Everything the caller supplies to book an appointment.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: Uuid,
    pub user_name: String,
    pub service_ids: Vec<Uuid>,
    pub start_time: DateTime<Utc>,
}

/// Books appointments against a single scheduling resource (one barber).
pub struct Scheduler {
    store: Arc<dyn RecordStore>,
    /// Held across the read-check-write of every mutation.
    booking_lock: Mutex<()>,
    strict_status_updates: bool,
}

impl Scheduler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            booking_lock: Mutex::new(()),
            strict_status_updates: true,
        }
    }

    /// When disabled, `update_status` on an unknown id is a silent no-op
    /// instead of a `NotFound` error.
    pub fn strict_status_updates(mut self, strict: bool) -> Self {
        self.strict_status_updates = strict;
        self
    }

    /// Validates, conflict-checks and persists a new appointment.
    ///
    /// Either a complete, non-conflicting appointment is stored and returned,
    /// or nothing is written and an error is returned.
    pub async fn create_appointment(&self, request: BookingRequest) -> CoreResult<Appointment> {
        if request.service_ids.is_empty() {
            return Err(CoreError::validation("no services selected"));
        }

        let _guard = self.booking_lock.lock().await;

        // 1. Resolve the selection against the current catalog.
        let catalog = self.store.list_services().await?;
        let selected = resolve_services(&catalog, &request.service_ids)?;

        // 2. Freeze the totals.
        let total_duration = selected
            .iter()
            .try_fold(0u32, |acc, s| acc.checked_add(s.duration_minutes))
            .ok_or_else(|| CoreError::validation("total duration too long"))?;
        let total_price: f64 = selected.iter().map(|s| s.price).sum();
        if total_duration == 0 {
            return Err(CoreError::validation("selected services have no duration"));
        }

        // 3. Compute the requested interval.
        let slot = TimeSlot::starting_at(request.start_time, total_duration)
            .ok_or_else(|| CoreError::validation("start time out of range"))?;

        // 4. Conflict check against every appointment that still holds its slot.
        let existing = self.store.list_appointments().await?;
        if let Some(clash) = find_conflict(&existing, &slot) {
            info!(
                "Rejected booking for user {} at {}: overlaps appointment {}",
                request.user_id, slot.start, clash.id
            );
            return Err(CoreError::Conflict("time slot unavailable".to_string()));
        }

        // 5. Persist.
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            user_name: request.user_name,
            service_ids: selected.iter().map(|s| s.id).collect(),
            total_price,
            total_duration,
            start_time: slot.start,
            end_time: slot.end,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now(),
        };
        self.store.insert_appointment(appointment.clone()).await?;

        info!(
            "Booked appointment {} for user {} from {} to {}",
            appointment.id, appointment.user_id, appointment.start_time, appointment.end_time
        );
        Ok(appointment)
    }

    /// Overwrites the status of an appointment. Any status may move to any other.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> CoreResult<()> {
        let _guard = self.booking_lock.lock().await;

        let Some(mut appointment) = self.store.get_appointment(appointment_id).await? else {
            if self.strict_status_updates {
                return Err(CoreError::NotFound(format!(
                    "Appointment {} not found",
                    appointment_id
                )));
            }
            warn!("Ignoring status update for unknown appointment {}", appointment_id);
            return Ok(());
        };

        if appointment.status.is_terminal() && appointment.status != new_status {
            debug!(
                "Appointment {} leaves terminal status {}",
                appointment_id, appointment.status
            );
        }

        let previous = appointment.status;
        appointment.status = new_status;
        self.store.update_appointment(appointment).await?;

        info!(
            "Appointment {} status {} -> {}",
            appointment_id, previous, new_status
        );
        Ok(())
    }

    /// All appointments, latest start first, optionally restricted to one user.
    pub async fn list_appointments(&self, user_id: Option<Uuid>) -> CoreResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .store
            .list_appointments()
            .await?
            .into_iter()
            .filter(|a| user_id.map_or(true, |id| a.user_id == id))
            .collect();
        appointments.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(appointments)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> CoreResult<Appointment> {
        self.store
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Appointment {} not found", appointment_id)))
    }
}

/// Maps requested ids onto catalog entries, keeping request order and dropping repeats.
fn resolve_services<'a>(catalog: &'a [Service], ids: &[Uuid]) -> CoreResult<Vec<&'a Service>> {
    let mut selected: Vec<&Service> = Vec::with_capacity(ids.len());
    for id in ids {
        if selected.iter().any(|s| s.id == *id) {
            continue;
        }
        let service = catalog
            .iter()
            .find(|s| s.id == *id)
            .ok_or_else(|| CoreError::Validation(format!("unknown service: {}", id)))?;
        selected.push(service);
    }
    if selected.is_empty() {
        return Err(CoreError::validation("no services selected"));
    }
    Ok(selected)
}

/// The first active appointment whose slot overlaps `slot`, if any.
pub fn find_conflict<'a>(existing: &'a [Appointment], slot: &TimeSlot) -> Option<&'a Appointment> {
    existing
        .iter()
        .filter(|a| a.status.blocks_slot())
        .find(|a| a.slot().overlaps(slot))
}
