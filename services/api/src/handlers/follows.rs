//! `/follow/` handlers
//!
//! A requester only ever sees and creates edges where they are the follower.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use common::error::DatabaseError;
use serde::Deserialize;
use tracing::info;

use super::method_not_allowed;
use crate::{
    error::{ApiError, ApiResult, ValidationErrors},
    extract::Payload,
    policy::{self, Operation, Requester, ResourceKind},
    serializers::{
        DUPLICATE_FOLLOW, FollowDraft, FollowRecord, SELF_FOLLOW, unknown_username,
        validate_follow,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/follow/",
        get(list).post(create).fallback(method_not_allowed),
    )
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    search: Option<String>,
}

/// Search terms separated by whitespace or commas
fn search_terms(search: Option<&str>) -> Vec<String> {
    search
        .unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

async fn list(
    requester: Requester,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<FollowRecord>>> {
    let user = policy::authorize(&requester, ResourceKind::Follow, Operation::List, None)?;

    let terms = search_terms(params.search.as_deref());
    let follows = state.follows.list_for_user(user.id, &terms).await?;

    Ok(Json(follows.into_iter().map(FollowRecord::from).collect()))
}

async fn create(
    requester: Requester,
    State(state): State<AppState>,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<FollowRecord>)> {
    let user = policy::authorize(&requester, ResourceKind::Follow, Operation::Create, None)?;

    let draft = FollowDraft::from_wire(&payload.into_map()?)?;
    let following = state
        .credentials
        .users()
        .find_by_username(&draft.following)
        .await?
        .ok_or_else(|| ValidationErrors::single("following", unknown_username(&draft.following)))?;

    let already_following = state.follows.exists(user.id, following.id).await?;
    validate_follow(user, &following, already_following)?;

    // The store constraints catch a concurrent duplicate
    let follow = state
        .follows
        .create(user, &following)
        .await
        .map_err(|e| match e {
            DatabaseError::CheckViolation { .. } => {
                ApiError::from(ValidationErrors::single("following", SELF_FOLLOW))
            }
            DatabaseError::UniqueViolation { .. } => {
                ApiError::from(ValidationErrors::non_field(DUPLICATE_FOLLOW))
            }
            e => ApiError::from(e),
        })?;

    info!("{} now follows {}", follow.user, follow.following);
    Ok((StatusCode::CREATED, Json(follow.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_terms() {
        assert!(search_terms(None).is_empty());
        assert!(search_terms(Some(" , ")).is_empty());
        assert_eq!(search_terms(Some("bob")), vec!["bob"]);
        assert_eq!(search_terms(Some("bob, smith  x")), vec!["bob", "smith", "x"]);
    }
}
