//! services/api/src/adapters/db.rs
//!
//! This module contains the Postgres adapter, a concrete implementation
//! of the `RecordStore` port from the `core` crate. It handles all interactions
//! with the database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salon_core::domain::{
    Appointment, AppointmentStatus, AuthSession, Service, User, UserCredentials, UserRole,
};
use salon_core::ports::{PortError, PortResult, RecordStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const SEEDED_KEY: &str = "seeded";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `RecordStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Minute counts are stored in INTEGER columns.
fn minutes_column(minutes: u32) -> PortResult<i32> {
    i32::try_from(minutes)
        .map_err(|_| PortError::Unexpected(format!("duration of {} minutes is too large", minutes)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ServiceRecord {
    id: Uuid,
    name: String,
    price: f64,
    duration_minutes: i32,
    image_url: String,
    description: Option<String>,
}
impl ServiceRecord {
    fn to_domain(self) -> Service {
        Service {
            id: self.id,
            name: self.name,
            price: self.price,
            duration_minutes: self.duration_minutes.max(0) as u32,
            image_url: self.image_url,
            description: self.description,
        }
    }
}

#[derive(FromRow)]
struct AppointmentRecord {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    service_ids: Vec<Uuid>,
    total_price: f64,
    total_duration: i32,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
}
impl AppointmentRecord {
    fn to_domain(self) -> PortResult<Appointment> {
        let status = self
            .status
            .parse::<AppointmentStatus>()
            .map_err(PortError::Unexpected)?;
        Ok(Appointment {
            id: self.id,
            user_id: self.user_id,
            user_name: self.user_name,
            service_ids: self.service_ids,
            total_price: self.total_price,
            total_duration: self.total_duration.max(0) as u32,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    role: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        let role = self.role.parse::<UserRole>().map_err(PortError::Unexpected)?;
        Ok(UserCredentials {
            user: User {
                id: self.id,
                name: self.name,
                email: self.email,
                phone: self.phone,
                role,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct SessionRecord {
    token: String,
    expires_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: UserRecord,
}
impl SessionRecord {
    fn to_domain(self) -> PortResult<AuthSession> {
        Ok(AuthSession {
            token: self.token,
            user: self.user.to_domain()?.user,
            expires_at: self.expires_at,
        })
    }
}

const SERVICE_COLUMNS: &str = "id, name, price, duration_minutes, image_url, description";
const APPOINTMENT_COLUMNS: &str = "id, user_id, user_name, service_ids, total_price, \
     total_duration, start_time, end_time, status, created_at";
const USER_COLUMNS: &str = "id, name, email, phone, role, password_hash";

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for DbAdapter {
    async fn list_services(&self) -> PortResult<Vec<Service>> {
        let records = sqlx::query_as::<_, ServiceRecord>(&format!(
            "SELECT {} FROM services ORDER BY position ASC",
            SERVICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_service(&self, id: Uuid) -> PortResult<Option<Service>> {
        let record = sqlx::query_as::<_, ServiceRecord>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn insert_service(&self, service: Service) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO services (id, name, price, duration_minutes, image_url, description) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(service.price)
        .bind(minutes_column(service.duration_minutes)?)
        .bind(&service.image_url)
        .bind(&service.description)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_service(&self, service: Service) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE services SET name = $2, price = $3, duration_minutes = $4, \
             image_url = $5, description = $6 WHERE id = $1",
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(service.price)
        .bind(minutes_column(service.duration_minutes)?)
        .bind(&service.image_url)
        .bind(&service.description)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Service {} not found", service.id)));
        }
        Ok(())
    }

    async fn delete_service(&self, id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_services(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM services")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_appointments(&self) -> PortResult<Vec<Appointment>> {
        let records = sqlx::query_as::<_, AppointmentRecord>(&format!(
            "SELECT {} FROM appointments ORDER BY created_at ASC",
            APPOINTMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_appointment(&self, id: Uuid) -> PortResult<Option<Appointment>> {
        let record = sqlx::query_as::<_, AppointmentRecord>(&format!(
            "SELECT {} FROM appointments WHERE id = $1",
            APPOINTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn insert_appointment(&self, appointment: Appointment) -> PortResult<()> {
        sqlx::query(&format!(
            "INSERT INTO appointments ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            APPOINTMENT_COLUMNS
        ))
        .bind(appointment.id)
        .bind(appointment.user_id)
        .bind(&appointment.user_name)
        .bind(&appointment.service_ids)
        .bind(appointment.total_price)
        .bind(minutes_column(appointment.total_duration)?)
        .bind(appointment.start_time)
        .bind(appointment.end_time)
        .bind(appointment.status.as_str())
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_appointment(&self, appointment: Appointment) -> PortResult<()> {
        // Only the status is mutable after creation.
        let result = sqlx::query("UPDATE appointments SET status = $2 WHERE id = $1")
            .bind(appointment.id)
            .bind(appointment.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Appointment {} not found",
                appointment.id
            )));
        }
        Ok(())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(|r| r.to_domain().map(|c| c.user))
            .collect()
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn insert_user(&self, credentials: UserCredentials) -> PortResult<()> {
        let user = &credentials.user;
        sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6)",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&credentials.password_hash)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, expires_at) VALUES ($1, $2, $3) \
             ON CONFLICT (token) DO UPDATE SET user_id = EXCLUDED.user_id, expires_at = EXCLUDED.expires_at",
        )
        .bind(&session.token)
        .bind(session.user.id)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT s.token, s.expires_at, u.id, u.name, u.email, u.phone, u.role, u.password_hash \
             FROM auth_sessions s JOIN users u ON u.id = s.user_id WHERE s.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn delete_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn is_seeded(&self) -> PortResult<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM store_meta WHERE key = $1")
            .bind(SEEDED_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(row.is_some())
    }

    async fn mark_seeded(&self) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO store_meta (key, value) VALUES ($1, 'true') ON CONFLICT (key) DO NOTHING",
        )
        .bind(SEEDED_KEY)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}
