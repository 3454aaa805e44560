use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::accounts::gate::{self, LoginRequest, Session};
use crate::accounts::profile_sync::{update_account_cascade, AccountUpdateRequest};
use crate::accounts::provisioning::{provision_account, RegistrationRequest};
use crate::accounts::session::AuthUser;
use crate::accounts::views::{load_account, AccountView};
use crate::errors::AppError;
use crate::models::user::ADMIN_ROLE;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegistrationResponse {
    /// Absent while the account still awaits organization approval.
    pub jwt: Option<String>,
    pub user: AccountView,
}

/// POST /api/auth/local/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let mut uow = state.store.begin().await?;
    let user = provision_account(state.accounts.as_ref(), uow.as_mut(), &req).await?;
    uow.commit().await?;

    let jwt = if gate::is_admitted(user.organization.as_ref()) {
        Some(gate::issue_for(&state.tokens, &user)?)
    } else {
        None
    };
    Ok(Json(RegistrationResponse { jwt, user }))
}

/// POST /api/auth/local
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let mut uow = state.store.begin().await?;
    let session = gate::login(state.accounts.as_ref(), uow.as_mut(), &state.tokens, &req).await?;
    uow.commit().await?;
    Ok(Json(session))
}

/// GET /api/users/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AccountView>, AppError> {
    let mut uow = state.store.begin().await?;
    Ok(Json(load_account(uow.as_mut(), auth.id).await?))
}

/// PUT /api/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AccountUpdateRequest>,
) -> Result<Json<AccountView>, AppError> {
    if auth.id != id && !auth.has_role(ADMIN_ROLE) {
        return Err(AppError::Forbidden);
    }

    let mut uow = state.store.begin().await?;
    let view = update_account_cascade(state.accounts.as_ref(), uow.as_mut(), id, &req).await?;
    uow.commit().await?;
    Ok(Json(view))
}
