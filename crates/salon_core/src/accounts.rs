//! crates/salon_core/src/accounts.rs
//!
//! Registration, login and session lookup. Credentials only ever exist here
//! as hashes produced by the injected `CredentialHasher`.

use std::sync::{Arc, OnceLock};

use chrono::{Duration, Utc};
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{AuthSession, NewUser, User, UserCredentials, UserRole};
use crate::error::{CoreError, CoreResult};
use crate::ports::{CredentialHasher, PortError, RecordStore};

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}

/// Lower-cased, trimmed form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct Accounts {
    store: Arc<dyn RecordStore>,
    hasher: Arc<dyn CredentialHasher>,
    session_ttl: Duration,
    /// Serialises the duplicate-email check and the insert that follows it.
    register_lock: Mutex<()>,
}

impl Accounts {
    pub fn new(
        store: Arc<dyn RecordStore>,
        hasher: Arc<dyn CredentialHasher>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            session_ttl,
            register_lock: Mutex::new(()),
        }
    }

    /// Creates a CLIENT account and logs it in.
    pub async fn register(&self, new: NewUser) -> CoreResult<AuthSession> {
        let user = self.insert_account(new, UserRole::Client).await?;
        info!("Registered client {} <{}>", user.id, user.email);
        self.open_session(user).await
    }

    /// Creates an account with an explicit role without opening a session.
    pub async fn create_user(&self, new: NewUser, role: UserRole) -> CoreResult<User> {
        let user = self.insert_account(new, role).await?;
        info!("Created {} account {} <{}>", role.as_str(), user.id, user.email);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> CoreResult<AuthSession> {
        let email = normalize_email(email);
        let Some(credentials) = self.store.find_user_by_email(&email).await? else {
            return Err(CoreError::Auth);
        };
        if !self.hasher.verify(password, &credentials.password_hash)? {
            warn!("Failed login attempt for {}", email);
            return Err(CoreError::Auth);
        }
        self.open_session(credentials.user).await
    }

    /// The user behind a session token, if the session exists and has not expired.
    pub async fn current_user(&self, token: &str) -> CoreResult<Option<User>> {
        let Some(session) = self.store.get_session(token).await? else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now() {
            self.store.delete_session(token).await?;
            return Ok(None);
        }
        Ok(Some(session.user))
    }

    pub async fn logout(&self, token: &str) -> CoreResult<()> {
        self.store.delete_session(token).await?;
        Ok(())
    }

    async fn insert_account(&self, new: NewUser, role: UserRole) -> CoreResult<User> {
        let _guard = self.register_lock.lock().await;
        let credentials = self.credentials_for(new, role).await?;
        let user = credentials.user.clone();
        self.store.insert_user(credentials).await?;
        Ok(user)
    }

    async fn credentials_for(&self, new: NewUser, role: UserRole) -> CoreResult<UserCredentials> {
        let name = new.name.trim().to_string();
        let email = normalize_email(&new.email);
        let phone = new.phone.trim().to_string();

        if name.is_empty() {
            return Err(CoreError::validation("name is required"));
        }
        if !email_pattern().is_match(&email) {
            return Err(CoreError::validation("a valid email is required"));
        }
        if phone.is_empty() {
            return Err(CoreError::validation("phone is required"));
        }
        if new.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(CoreError::validation("email already registered"));
        }

        let password_hash = self.hasher.hash(&new.password)?;
        Ok(UserCredentials {
            user: User {
                id: Uuid::new_v4(),
                name,
                email,
                phone,
                role,
            },
            password_hash,
        })
    }

    async fn open_session(&self, user: User) -> CoreResult<AuthSession> {
        let expires_at = Utc::now().checked_add_signed(self.session_ttl).ok_or_else(|| {
            CoreError::Port(PortError::Unexpected(
                "session lifetime is out of range".to_string(),
            ))
        })?;
        let session = AuthSession {
            token: Uuid::new_v4().to_string(),
            user,
            expires_at,
        };
        self.store.insert_session(session.clone()).await?;
        Ok(session)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::ports::PortResult;

    /// Reversible stand-in for a real password hash.
    pub(crate) struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, plain: &str) -> PortResult<String> {
            Ok(format!("hashed:{}", plain))
        }

        fn verify(&self, plain: &str, hash: &str) -> PortResult<bool> {
            Ok(hash == format!("hashed:{}", plain))
        }
    }

    fn accounts_with_ttl(ttl: Duration) -> (Arc<InMemoryStore>, Accounts) {
        let store = Arc::new(InMemoryStore::new());
        let accounts = Accounts::new(store.clone(), Arc::new(PlainHasher), ttl);
        (store, accounts)
    }

    fn accounts() -> (Arc<InMemoryStore>, Accounts) {
        accounts_with_ttl(Duration::days(30))
    }

    fn ana() -> NewUser {
        NewUser {
            name: "Ana Souza".to_string(),
            email: " Ana@Example.com ".to_string(),
            phone: "11988887777".to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_a_logged_in_client() {
        let (store, accounts) = accounts();
        let session = accounts.register(ana()).await.unwrap();
        assert_eq!(session.user.role, UserRole::Client);
        assert_eq!(session.user.email, "ana@example.com");

        let current = accounts.current_user(&session.token).await.unwrap();
        assert_eq!(current, Some(session.user.clone()));

        let stored = store.find_user_by_email("ana@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret123");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (_, accounts) = accounts();
        accounts.register(ana()).await.unwrap();
        let mut again = ana();
        again.email = "ANA@example.com".to_string();
        let err = accounts.register(again).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref m) if m == "email already registered"));
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let (store, accounts) = accounts();
        let mut no_at = ana();
        no_at.email = "ana.example.com".to_string();
        let mut short = ana();
        short.password = "123".to_string();
        let mut nameless = ana();
        nameless.name = String::new();
        for bad in [no_at, short, nameless] {
            assert!(matches!(
                accounts.register(bad).await,
                Err(CoreError::Validation(_))
            ));
        }
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_requires_matching_email_and_password() {
        let (_, accounts) = accounts();
        accounts.register(ana()).await.unwrap();

        let session = accounts.login("ana@example.com", "secret123").await.unwrap();
        assert_eq!(session.user.name, "Ana Souza");

        assert!(matches!(
            accounts.login("ana@example.com", "wrong").await,
            Err(CoreError::Auth)
        ));
        assert!(matches!(
            accounts.login("nobody@example.com", "secret123").await,
            Err(CoreError::Auth)
        ));
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let (_, accounts) = accounts();
        let session = accounts.register(ana()).await.unwrap();
        accounts.logout(&session.token).await.unwrap();
        assert_eq!(accounts.current_user(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let (store, accounts) = accounts_with_ttl(Duration::seconds(-1));
        let session = accounts.register(ana()).await.unwrap();
        assert_eq!(accounts.current_user(&session.token).await.unwrap(), None);
        assert!(store.get_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn a_new_login_prunes_expired_sessions() {
        let (store, short_lived) = accounts_with_ttl(Duration::seconds(-1));
        let stale = short_lived.register(ana()).await.unwrap();
        assert!(store.get_session(&stale.token).await.unwrap().is_some());

        let accounts = Accounts::new(store.clone(), Arc::new(PlainHasher), Duration::days(30));
        let fresh = accounts.login("ana@example.com", "secret123").await.unwrap();

        assert!(store.get_session(&stale.token).await.unwrap().is_none());
        assert!(store.get_session(&fresh.token).await.unwrap().is_some());
        assert_eq!(store.snapshot().await.sessions.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_of_one_email_admit_exactly_one() {
        let (store, accounts) = accounts();
        let accounts = Arc::new(accounts);
        let mut handles = Vec::new();
        for _ in 0..4 {
            let accounts = accounts.clone();
            handles.push(tokio::spawn(async move { accounts.register(ana()).await }));
        }
        let mut registered = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => registered += 1,
                Err(err) => assert!(
                    matches!(err, CoreError::Validation(ref m) if m == "email already registered"),
                    "unexpected error: {:?}",
                    err
                ),
            }
        }
        assert_eq!(registered, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_lifetime_past_the_calendar_is_an_error() {
        let (store, accounts) = accounts_with_ttl(Duration::days(365_000_000));
        assert!(matches!(
            accounts.register(ana()).await,
            Err(CoreError::Port(_))
        ));
        assert!(store.snapshot().await.sessions.is_empty());
    }
}
