//! Classification nomenclature endpoints

use axum::{extract::State, Json};

use crate::{models::equipment::MessageResponse, AppState};

use super::BearerToken;

/// Drop the cached classification index
///
/// The next lookup rebuilds it from the stored nomenclature.
#[utoipa::path(
    post,
    path = "/classification/reload",
    tag = "classification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Classification index invalidated", body = MessageResponse),
        (status = 401, description = "Missing bearer token", body = crate::error::ErrorResponse)
    )
)]
pub async fn reload_classification(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
) -> Json<MessageResponse> {
    state.services.classification.reload().await;
    Json(MessageResponse::new("Classification index invalidated", None))
}
