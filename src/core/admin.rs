//! Admin bootstrap - creating the first administrator on a fresh install.
//!
//! The setup endpoint is unauthenticated, so it only ever succeeds once: as soon
//! as one `admin` user exists, further attempts are rejected as conflicts.

use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Credentials submitted for the first administrator.
#[derive(Clone, Deserialize)]
pub struct NewAdmin {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password; hashed before storage
    pub password: String,
}

impl std::fmt::Debug for NewAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public view of a created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUser {
    /// User id
    pub id: i64,
    /// Normalized login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Always `admin` for bootstrap accounts
    pub role: UserRole,
}

impl From<user::Model> for AdminUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
        }
    }
}

/// Whether at least one `admin` user exists.
pub async fn check_admin_exists<C>(db: &C) -> Result<bool>
where
    C: ConnectionTrait,
{
    let admins = User::find()
        .filter(user::Column::Role.eq(UserRole::Admin))
        .count(db)
        .await?;
    Ok(admins > 0)
}

/// Loose `local@domain.tld` check, the same shape as
/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`: no whitespace, exactly one `@`, and some
/// dot in the domain with text on both sides of it.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Hashes a password with Argon2 and a fresh random salt, returning the PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Checks a password against a stored PHC string. Malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn validate(new_admin: &NewAdmin) -> Result<(String, String)> {
    let name = new_admin.name.trim();
    let email = new_admin.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() || new_admin.password.is_empty() {
        return Err(Error::validation("Name, email and password are required"));
    }
    if !is_valid_email(&email) {
        return Err(Error::validation("Invalid email format"));
    }
    if new_admin.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok((name.to_string(), email))
}

/// Creates the first administrator account.
///
/// Once any admin exists every request is a conflict, whatever it contains.
/// Otherwise the input is validated and a registered email is also a conflict.
/// The existence check and the insert share one transaction.
#[instrument(skip(db))]
pub async fn create_first_admin(db: &DatabaseConnection, new_admin: NewAdmin) -> Result<AdminUser> {
    let txn = db.begin().await?;

    if check_admin_exists(&txn).await? {
        return Err(Error::conflict(
            "Admin user already exists. Use the login page instead.",
        ));
    }

    let (name, email) = validate(&new_admin)?;

    let taken = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .count(&txn)
        .await?;
    if taken > 0 {
        return Err(Error::conflict("User with this email already exists"));
    }

    let password_hash = hash_password(&new_admin.password)?;

    let admin = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(UserRole::Admin),
        is_verified: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(user_id = admin.id, email = %admin.email, "First admin created");
    Ok(admin.into())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::test_utils::*;

    fn admin(name: &str, email: &str, password: &str) -> NewAdmin {
        NewAdmin {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("owner@gym.in"));
        assert!(is_valid_email("front.desk@mail.example.com"));
        assert!(!is_valid_email("owner"));
        assert!(!is_valid_email("owner@gym"));
        assert!(!is_valid_email("@gym.in"));
        assert!(!is_valid_email("owner@.in"));
        assert!(!is_valid_email("owner@gym."));
        assert!(!is_valid_email("owner@.in."));
        assert!(!is_valid_email("own er@gym.in"));
        assert!(!is_valid_email("a@b@gym.in"));

        // Any inner dot will do, trailing ones included
        assert!(is_valid_email("a@b.c."));
        assert!(is_valid_email("a@b..c"));
    }

    #[test]
    fn test_hash_and_verify() -> Result<()> {
        let hash = hash_password("correct horse")?;
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));

        // Fresh salt every time
        assert_ne!(hash, hash_password("correct horse")?);
        Ok(())
    }

    #[tokio::test]
    async fn test_validation_on_fresh_install() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_first_admin(&db, admin("Owner", "owner@gym.in", "short12")).await;
        match result {
            Err(Error::Validation { message }) => {
                assert_eq!(message, "Password must be at least 8 characters long");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let result = create_first_admin(&db, admin("  ", "owner@gym.in", "longenough")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_first_admin(&db, admin("Owner", "owner-at-gym", "longenough")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert_eq!(User::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_admin_wins_over_bad_input() -> Result<()> {
        let db = setup_test_db().await?;
        create_first_admin(&db, admin("Owner", "owner@gym.in", "s3cure-pass")).await?;

        for attempt in [
            admin("Second", "second@gym.in", "short"),
            admin("", "", ""),
            admin("Second", "not-an-email", "longenough"),
        ] {
            let result = create_first_admin(&db, attempt).await;
            assert!(matches!(result, Err(Error::Conflict { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_first_admin_then_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(!check_admin_exists(&db).await?);

        let created =
            create_first_admin(&db, admin(" Owner ", "  Owner@Gym.IN ", "s3cure-pass")).await?;
        assert_eq!(created.name, "Owner");
        assert_eq!(created.email, "owner@gym.in");
        assert_eq!(created.role, UserRole::Admin);
        assert!(check_admin_exists(&db).await?);

        let stored = User::find_by_id(created.id).one(&db).await?.unwrap();
        assert!(stored.is_verified);
        assert_ne!(stored.password_hash, "s3cure-pass");
        assert!(verify_password("s3cure-pass", &stored.password_hash));

        let result =
            create_first_admin(&db, admin("Second", "second@gym.in", "another-pass")).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        user::ActiveModel {
            name: Set("Desk".to_string()),
            email: Set("desk@gym.in".to_string()),
            password_hash: Set(hash_password("desk-pass-1")?),
            role: Set(UserRole::Staff),
            is_verified: Set(true),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Staff accounts do not count as an admin
        assert!(!check_admin_exists(&db).await?);

        let result = create_first_admin(&db, admin("Owner", "DESK@gym.in", "longenough")).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }
}
