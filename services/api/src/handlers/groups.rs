//! `/groups/` handlers; groups are read-only over HTTP

use axum::{Json, Router, extract::State, routing::get};

use super::method_not_allowed;
use crate::{
    error::{ApiError, ApiResult},
    extract::Ids,
    models::GroupId,
    policy::{self, Operation, Requester, ResourceKind},
    serializers::GroupRecord,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups/", get(list).fallback(method_not_allowed))
        .route("/groups/:group_id/", get(retrieve).fallback(method_not_allowed))
}

async fn list(requester: Requester, State(state): State<AppState>) -> ApiResult<Json<Vec<GroupRecord>>> {
    policy::authorize(&requester, ResourceKind::Group, Operation::List, None)?;

    let groups = state.groups.list().await?;
    Ok(Json(groups.into_iter().map(GroupRecord::from).collect()))
}

async fn retrieve(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<GroupId>,
) -> ApiResult<Json<GroupRecord>> {
    policy::authorize(&requester, ResourceKind::Group, Operation::Retrieve, None)?;

    let group = state
        .groups
        .find_by_id(ids.resolve()?)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(group.into()))
}
