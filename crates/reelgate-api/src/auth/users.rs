//! Seeded user directory
//!
//! There is no user management surface in this design; accounts are seeded at
//! startup with bcrypt-hashed passwords and live for the process lifetime.

use crate::auth::models::UserRole;
use reelgate_core::AppError;
use uuid::Uuid;

/// A seeded account.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub tenant_id: String,
    pub role: UserRole,
}

/// In-memory credential store for the seeded accounts.
pub struct UserDirectory {
    users: Vec<UserAccount>,
}

impl UserDirectory {
    /// Build the default account set.
    ///
    /// `bcrypt_cost` is tunable so tests and development servers skip the
    /// production-strength work factor.
    pub fn seeded(bcrypt_cost: u32) -> Result<Self, anyhow::Error> {
        let seeds: &[(&str, &str, &str, UserRole)] = &[
            ("admin", "admin123", "tenant1", UserRole::Admin),
            ("editor1", "editor123", "tenant1", UserRole::Editor),
            ("viewer1", "viewer123", "tenant1", UserRole::Viewer),
            ("editor2", "editor123", "tenant2", UserRole::Editor),
            ("viewer2", "viewer123", "tenant2", UserRole::Viewer),
        ];

        let mut users = Vec::with_capacity(seeds.len());
        for (username, password, tenant_id, role) in seeds {
            users.push(UserAccount {
                id: Uuid::new_v4(),
                username: username.to_string(),
                password_hash: bcrypt::hash(password, bcrypt_cost)?,
                tenant_id: tenant_id.to_string(),
                role: *role,
            });
        }

        tracing::info!(user_count = users.len(), "Seeded user directory");

        Ok(Self { users })
    }

    /// Verify a username/password pair.
    ///
    /// Unknown usernames and wrong passwords produce the same error so the
    /// login endpoint never confirms which usernames exist.
    pub fn verify(&self, username: &str, password: &str) -> Result<&UserAccount, AppError> {
        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

        let account = self
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(invalid)?;

        let matches = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if matches {
            Ok(account)
        } else {
            Err(invalid())
        }
    }
}
