//! Login gate: organizations cannot sign in until an admin has accepted them.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::accounts::manager::AccountManager;
use crate::accounts::session::TokenIssuer;
use crate::accounts::views::{load_account, AccountView};
use crate::errors::AppError;
use crate::models::organization::{OrganizationRow, OrganizationStatus};
use crate::models::user::{UserRow, DEFAULT_ROLE};
use crate::store::{Records, UnitOfWork};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// A signed-in account. Only ever built after the gate has passed.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub jwt: String,
    pub user: AccountView,
}

pub fn is_admitted(organization: Option<&OrganizationRow>) -> bool {
    organization.map_or(true, |org| org.status == OrganizationStatus::Accepted)
}

/// Returns the enriched account view, or `NotVerified` when the account
/// belongs to an organization that has not been accepted.
pub async fn admit<R: Records + ?Sized>(
    records: &mut R,
    user: &UserRow,
) -> Result<AccountView, AppError> {
    let view = load_account(records, user.id).await?;
    if !is_admitted(view.organization.as_ref()) {
        warn!("Login refused for unverified organization user {}", user.id);
        return Err(AppError::NotVerified);
    }
    Ok(view)
}

/// Signs a token for an account view that has already been admitted.
pub fn issue_for(tokens: &TokenIssuer, view: &AccountView) -> Result<String, AppError> {
    tokens.issue(view.id, view.role_name().unwrap_or(DEFAULT_ROLE))
}

pub async fn login(
    accounts: &dyn AccountManager,
    uow: &mut dyn UnitOfWork,
    tokens: &TokenIssuer,
    request: &LoginRequest,
) -> Result<Session, AppError> {
    let user = accounts
        .verify_credentials(uow, &request.identifier, &request.password)
        .await?;
    let view = admit(uow, &user).await?;
    let jwt = issue_for(tokens, &view)?;

    info!("User {} signed in", view.id);
    Ok(Session { jwt, user: view })
}
