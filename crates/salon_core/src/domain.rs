//! crates/salon_core/src/domain.rs
//!
//! Defines the pure, core data structures for the salon.
//! These structs carry serde derives so every store adapter can persist them
//! as JSON-like records, but they know nothing about any particular store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image shown for a service created without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x300?text=No+Image";

/// Longest duration a single service may have: one day.
pub const MAX_SERVICE_MINUTES: u32 = 24 * 60;

//=========================================================================================
// Catalog
//=========================================================================================

/// A bookable offering in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The fields of a service that does not have an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A partial update. Every field that is `Some` replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<u32>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl Service {
    /// Returns a copy of `self` with the patch applied. The id never changes.
    pub fn merged(&self, patch: ServicePatch) -> Service {
        Service {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            price: patch.price.unwrap_or(self.price),
            duration_minutes: patch.duration_minutes.unwrap_or(self.duration_minutes),
            image_url: patch
                .image_url
                .map(|url| image_or_placeholder(Some(url)))
                .unwrap_or_else(|| self.image_url.clone()),
            description: patch.description.or_else(|| self.description.clone()),
        }
    }
}

pub(crate) fn image_or_placeholder(url: Option<String>) -> String {
    match url {
        Some(url) if !url.trim().is_empty() => url,
        _ => PLACEHOLDER_IMAGE_URL.to_string(),
    }
}

//=========================================================================================
// Appointments
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Whether an appointment in this status occupies its time slot.
    pub fn blocks_slot(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    /// Cancelled and completed appointments have no further transitions defined.
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The slot starting at `start` and lasting `minutes`, or `None` when the
    /// end falls outside the representable date range.
    pub fn starting_at(start: DateTime<Utc>, minutes: u32) -> Option<Self> {
        let end = start.checked_add_signed(Duration::minutes(i64::from(minutes)))?;
        Some(Self::new(start, end))
    }

    /// Strict comparison on both sides: a slot ending exactly when another
    /// starts does not overlap it.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A booked interval. Totals and the user name are snapshots taken at booking
/// time and are never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub service_ids: Vec<Uuid>,
    pub total_price: f64,
    pub total_duration: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }
}

//=========================================================================================
// Users & Sessions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Client,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Client => "CLIENT",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "CLIENT" => Ok(UserRole::Client),
            other => Err(format!("unknown user role '{}'", other)),
        }
    }
}

// Represents a user - used throughout the app, never carries a credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Only used internally for login/register - contains sensitive data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Registration input. The password is plain text here and is hashed before
/// anything is stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let slots = [
            TimeSlot::new(at(10, 0), at(10, 30)),
            TimeSlot::new(at(10, 15), at(10, 45)),
            TimeSlot::new(at(10, 30), at(11, 0)),
            TimeSlot::new(at(9, 0), at(12, 0)),
            TimeSlot::new(at(13, 0), at(13, 15)),
        ];
        for a in &slots {
            for b in &slots {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn touching_slots_do_not_overlap() {
        let first = TimeSlot::new(at(10, 0), at(10, 30));
        let second = TimeSlot::new(at(10, 30), at(11, 0));
        assert!(!first.overlaps(&second));
    }

    #[test]
    fn containment_and_partial_overlap() {
        let outer = TimeSlot::new(at(9, 0), at(12, 0));
        let inner = TimeSlot::new(at(10, 0), at(10, 30));
        let partial = TimeSlot::new(at(10, 15), at(10, 45));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&partial));
        assert!(inner.overlaps(&inner));
    }

    #[test]
    fn starting_at_adds_minutes() {
        let slot = TimeSlot::starting_at(at(10, 0), 50).unwrap();
        assert_eq!(slot.end, at(10, 50));
    }

    #[test]
    fn starting_at_the_end_of_time_has_no_slot() {
        let start = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);
        assert_eq!(TimeSlot::starting_at(start, 30), None);
        assert!(TimeSlot::starting_at(start, 10).is_some());
    }

    #[test]
    fn only_cancelled_frees_the_slot() {
        assert!(AppointmentStatus::Pending.blocks_slot());
        assert!(AppointmentStatus::Confirmed.blocks_slot());
        assert!(AppointmentStatus::Completed.blocks_slot());
        assert!(!AppointmentStatus::Cancelled.blocks_slot());
    }

    #[test]
    fn status_uses_upper_case_on_the_wire() {
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        assert_eq!("COMPLETED".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Completed));
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn patch_merges_only_given_fields() {
        let service = Service {
            id: Uuid::new_v4(),
            name: "Classic Cut".to_string(),
            price: 50.0,
            duration_minutes: 30,
            image_url: "https://example.com/cut.jpg".to_string(),
            description: None,
        };
        let merged = service.merged(ServicePatch {
            price: Some(55.0),
            image_url: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(merged.id, service.id);
        assert_eq!(merged.name, "Classic Cut");
        assert_eq!(merged.price, 55.0);
        assert_eq!(merged.duration_minutes, 30);
        assert_eq!(merged.image_url, PLACEHOLDER_IMAGE_URL);
    }
}
