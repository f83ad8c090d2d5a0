//! `/posts/` handlers

use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    routing::get,
};
use common::error::DatabaseError;
use tracing::info;

use super::method_not_allowed;
use crate::{
    error::{ApiError, ApiResult, ValidationErrors},
    extract::{Ids, Payload},
    models::{GroupId, NewPost, PostChanges, PostId},
    pagination::{Listing, PageParams},
    policy::{self, Operation, Requester, ResourceKind},
    serializers::{Mode, PostDraft, PostRecord, unknown_pk},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/posts/:post_id/",
            get(retrieve)
                .put(update)
                .patch(partial_update)
                .delete(destroy)
                .fallback(method_not_allowed),
        )
}

/// List posts; paginated only when `limit` or `offset` is given
async fn list(
    requester: Requester,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Listing<PostRecord>>> {
    policy::authorize(&requester, ResourceKind::Post, Operation::List, None)?;

    let listing = match state.pagination.request(&params) {
        None => Listing::Full(state.posts.list().await?),
        Some(window) => {
            let (posts, count) = state.posts.list_page(window.limit, window.offset).await?;
            Listing::Page(window.page(uri.path(), count, posts))
        }
    };

    Ok(Json(listing.map(PostRecord::from)))
}

async fn create(
    requester: Requester,
    State(state): State<AppState>,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<PostRecord>)> {
    let author = policy::authorize(&requester, ResourceKind::Post, Operation::Create, None)?;

    let draft = PostDraft::from_wire(&payload.into_map()?, Mode::Full)?;
    let group_id = draft.group_id();
    ensure_group_exists(&state, group_id).await?;

    let new_post = NewPost {
        text: draft.text.unwrap_or_default(),
        image: draft.image.flatten(),
        group_id,
    };
    let post = state
        .posts
        .create(author, &new_post)
        .await
        .map_err(|e| missing_group(e, new_post.group_id))?;

    info!("Post {} created by {}", post.id, author.username);
    Ok((StatusCode::CREATED, Json(post.into())))
}

async fn retrieve(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<PostId>,
) -> ApiResult<Json<PostRecord>> {
    policy::authorize(&requester, ResourceKind::Post, Operation::Retrieve, None)?;

    let post = state
        .posts
        .find_by_id(ids.resolve()?)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(post.into()))
}

async fn update(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<PostId>,
    payload: Payload,
) -> ApiResult<Json<PostRecord>> {
    save(&requester, &state, ids, payload, Mode::Full).await
}

async fn partial_update(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<PostId>,
    payload: Payload,
) -> ApiResult<Json<PostRecord>> {
    save(&requester, &state, ids, payload, Mode::Partial).await
}

async fn save(
    requester: &Requester,
    state: &AppState,
    ids: Ids<PostId>,
    payload: Payload,
    mode: Mode,
) -> ApiResult<Json<PostRecord>> {
    policy::authenticated(requester)?;

    let id = ids.resolve()?;
    let post = state.posts.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    policy::authorize_owner(requester, ResourceKind::Post, Operation::Update, &post)?;

    let draft = PostDraft::from_wire(&payload.into_map()?, mode)?;
    let group_id = draft.group_id();
    ensure_group_exists(state, group_id).await?;

    let changes = PostChanges {
        text: draft.text,
        image: draft.image,
        group_id: draft.group,
    };
    let post = state
        .posts
        .update(id, &changes)
        .await
        .map_err(|e| missing_group(e, group_id))?
        .ok_or(ApiError::NotFound)?;

    info!("Post {} updated", post.id);
    Ok(Json(post.into()))
}

async fn destroy(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<PostId>,
) -> ApiResult<StatusCode> {
    policy::authenticated(&requester)?;

    let id = ids.resolve()?;
    let post = state.posts.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    policy::authorize_owner(&requester, ResourceKind::Post, Operation::Delete, &post)?;

    if !state.posts.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Post {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_group_exists(state: &AppState, group_id: Option<GroupId>) -> ApiResult<()> {
    let Some(group_id) = group_id else {
        return Ok(());
    };

    match state.groups.find_by_id(group_id).await? {
        Some(_) => Ok(()),
        None => Err(ValidationErrors::single("group", unknown_pk(group_id)).into()),
    }
}

/// A group removed between validation and write surfaces as a field error
fn missing_group(error: DatabaseError, group_id: Option<GroupId>) -> ApiError {
    match (error, group_id) {
        (DatabaseError::ForeignKeyViolation { .. }, Some(group_id)) => {
            ValidationErrors::single("group", unknown_pk(group_id)).into()
        }
        (error, _) => error.into(),
    }
}
