use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::accounts::session::AuthUser;
use crate::errors::AppError;
use crate::jobs::views::OrganizationCard;
use crate::models::user::ADMIN_ROLE;
use crate::organizations::service::{apply_organization_update, OrganizationInput, Sender};
use crate::routes::Envelope;
use crate::state::AppState;

/// PUT /api/organizations/:id
pub async fn handle_update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<Envelope<OrganizationInput>>,
) -> Result<Json<Envelope<OrganizationCard>>, AppError> {
    auth.require_any(&[ADMIN_ROLE])?;

    let sender = Sender {
        from: &state.config.email_from,
        reply_to: &state.config.email_reply_to,
    };
    let card = apply_organization_update(
        state.store.as_ref(),
        state.mailer.as_ref(),
        sender,
        id,
        &req.data,
    )
    .await?;
    Ok(Json(Envelope { data: card }))
}
