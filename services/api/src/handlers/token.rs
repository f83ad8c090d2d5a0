//! `/api-token-auth/`: exchange a username and password for an API token

use axum::{Json, Router, extract::State, routing::post};

use super::method_not_allowed;
use crate::{
    error::{ApiResult, ValidationErrors},
    extract::Payload,
    serializers::{LoginDraft, TokenRecord},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api-token-auth/",
        post(obtain_token).fallback(method_not_allowed),
    )
}

async fn obtain_token(
    State(state): State<AppState>,
    payload: Payload,
) -> ApiResult<Json<TokenRecord>> {
    let login = LoginDraft::from_wire(&payload.into_map()?)?;

    match state
        .credentials
        .obtain_token(&login.username, &login.password)
        .await?
    {
        Some(token) => Ok(Json(TokenRecord { token })),
        None => Err(ValidationErrors::non_field(INVALID_CREDENTIALS).into()),
    }
}
