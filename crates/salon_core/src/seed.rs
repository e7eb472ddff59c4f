//! crates/salon_core/src/seed.rs
//!
//! First-start data: the default catalog and, optionally, an admin account.

use tracing::info;

use crate::accounts::{normalize_email, Accounts};
use crate::catalog::Catalog;
use crate::domain::{NewService, NewUser, UserRole};
use crate::error::CoreResult;
use crate::ports::RecordStore;

/// The admin account created on first start.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

pub fn default_services() -> Vec<NewService> {
    vec![
        NewService {
            name: "Classic Cut".to_string(),
            price: 50.0,
            duration_minutes: 30,
            image_url: Some("https://picsum.photos/400/300?random=1".to_string()),
            description: Some("Traditional scissor cut finished with a straight razor.".to_string()),
        },
        NewService {
            name: "Beard Therapy".to_string(),
            price: 40.0,
            duration_minutes: 30,
            image_url: Some("https://picsum.photos/400/300?random=2".to_string()),
            description: Some("Beard shaping with hot towel and essential oils.".to_string()),
        },
        NewService {
            name: "Cut + Beard (Combo)".to_string(),
            price: 80.0,
            duration_minutes: 50,
            image_url: Some("https://picsum.photos/400/300?random=3".to_string()),
            description: Some("The complete package.".to_string()),
        },
        NewService {
            name: "Neckline Touch-up".to_string(),
            price: 20.0,
            duration_minutes: 15,
            image_url: Some("https://picsum.photos/400/300?random=4".to_string()),
            description: Some("Quick maintenance of the outlines.".to_string()),
        },
    ]
}

/// Loads the default catalog once per store, and ensures the admin exists.
///
/// A catalog emptied later by the admin stays empty: the defaults are only
/// written the first time a store is seen.
pub async fn seed_defaults(
    store: &dyn RecordStore,
    catalog: &Catalog,
    accounts: &Accounts,
    admin: Option<&AdminSeed>,
) -> CoreResult<()> {
    if !store.is_seeded().await? {
        for service in default_services() {
            catalog.create(service).await?;
        }
        store.mark_seeded().await?;
        info!("Seeded the default service catalog");
    }

    if let Some(admin) = admin {
        let email = normalize_email(&admin.email);
        if store.find_user_by_email(&email).await?.is_none() {
            accounts
                .create_user(
                    NewUser {
                        name: admin.name.clone(),
                        email,
                        phone: admin.phone.clone(),
                        password: admin.password.clone(),
                    },
                    UserRole::Admin,
                )
                .await?;
        }
    }
    Ok(())
}
