//! Account management: credential storage and verification.
//!
//! `AccountManager` is the seam between the job-board workflows and whatever
//! owns credentials. Registration, login and profile updates call it for the
//! raw account step and layer their own stages around it.

use async_trait::async_trait;
use email_address::EmailAddress;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{NewUser, UserPatch, UserRow, DEFAULT_ROLE};
use crate::store::{StoreError, UnitOfWork};

const MIN_PASSWORD_LEN: usize = 6;
const TAKEN_MESSAGE: &str = "Email or Username are already taken";
const BAD_CREDENTIALS_MESSAGE: &str = "Invalid identifier or password";

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[async_trait]
pub trait AccountManager: Send + Sync {
    /// Creates an account holding the default role.
    async fn create_account(
        &self,
        uow: &mut dyn UnitOfWork,
        account: &NewAccount,
    ) -> Result<UserRow, AppError>;

    async fn verify_credentials(
        &self,
        uow: &mut dyn UnitOfWork,
        identifier: &str,
        password: &str,
    ) -> Result<UserRow, AppError>;

    async fn update_account(
        &self,
        uow: &mut dyn UnitOfWork,
        id: Uuid,
        changes: &AccountChanges,
    ) -> Result<UserRow, AppError>;
}

/// Local username/email + password accounts, argon2-hashed.
pub struct PasswordAccounts;

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().len() < 3 {
        return Err(AppError::Validation(
            "username must be at least 3 characters".to_string(),
        ));
    }
    // Login accepts either identifier, so usernames must never look like an email.
    if username.contains('@') {
        return Err(AppError::Validation("username cannot contain '@'".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if !EmailAddress::is_valid(email) {
        return Err(AppError::Validation("Invalid email".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn taken_or_store(e: StoreError) -> AppError {
    match e {
        StoreError::Conflict(_) => AppError::Validation(TAKEN_MESSAGE.to_string()),
        other => AppError::Store(other),
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || password_auth::generate_hash(password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing task failed: {e}")))
}

async fn password_matches(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || password_auth::verify_password(password, &hash).is_ok())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password check task failed: {e}")))
}

#[async_trait]
impl AccountManager for PasswordAccounts {
    async fn create_account(
        &self,
        uow: &mut dyn UnitOfWork,
        account: &NewAccount,
    ) -> Result<UserRow, AppError> {
        validate_username(&account.username)?;
        validate_email(&account.email)?;
        validate_password(&account.password)?;

        let default_role = uow
            .find_role_by_name(DEFAULT_ROLE)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("role '{DEFAULT_ROLE}'")))?;

        let password_hash = hash_password(&account.password).await?;

        uow.insert_user(&NewUser {
            username: account.username.trim().to_string(),
            email: account.email.trim().to_lowercase(),
            password_hash,
            role_id: default_role.id,
        })
        .await
        .map_err(taken_or_store)
    }

    async fn verify_credentials(
        &self,
        uow: &mut dyn UnitOfWork,
        identifier: &str,
        password: &str,
    ) -> Result<UserRow, AppError> {
        let Some(user) = uow.find_user_by_identifier(identifier.trim()).await? else {
            return Err(AppError::Validation(BAD_CREDENTIALS_MESSAGE.to_string()));
        };

        if !password_matches(password, &user.password_hash).await? {
            warn!("Failed login for user {}", user.id);
            return Err(AppError::Validation(BAD_CREDENTIALS_MESSAGE.to_string()));
        }

        if user.blocked {
            return Err(AppError::Validation(
                "Your account has been blocked by an administrator".to_string(),
            ));
        }

        Ok(user)
    }

    async fn update_account(
        &self,
        uow: &mut dyn UnitOfWork,
        id: Uuid,
        changes: &AccountChanges,
    ) -> Result<UserRow, AppError> {
        if let Some(username) = &changes.username {
            validate_username(username)?;
        }
        if let Some(email) = &changes.email {
            validate_email(email)?;
        }
        let password_hash = match &changes.password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password).await?)
            }
            None => None,
        };

        let patch = UserPatch {
            username: changes.username.as_ref().map(|u| u.trim().to_string()),
            email: changes.email.as_ref().map(|e| e.trim().to_lowercase()),
            password_hash,
            role_id: None,
        };

        uow.update_user(id, &patch)
            .await
            .map_err(taken_or_store)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
