//! `/posts/{post_id}/comments/` handlers
//!
//! Every operation is scoped to the post in the path: a comment id that
//! belongs to a different post is not found.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use common::error::DatabaseError;
use tracing::info;

use super::method_not_allowed;
use crate::{
    error::{ApiError, ApiResult},
    extract::{Ids, Payload},
    models::{CommentChanges, CommentId, NewComment, PostId},
    policy::{self, Operation, Requester, ResourceKind},
    serializers::{CommentDraft, CommentRecord, Mode},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/:post_id/comments/",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/posts/:post_id/comments/:comment_id/",
            get(retrieve)
                .put(update)
                .patch(partial_update)
                .delete(destroy)
                .fallback(method_not_allowed),
        )
}

async fn ensure_post_exists(state: &AppState, post_id: PostId) -> ApiResult<()> {
    match state.posts.find_by_id(post_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound),
    }
}

async fn list(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<PostId>,
) -> ApiResult<Json<Vec<CommentRecord>>> {
    policy::authorize(&requester, ResourceKind::Comment, Operation::List, None)?;

    let post_id = ids.resolve()?;
    ensure_post_exists(&state, post_id).await?;

    let comments = state.comments.list_for_post(post_id).await?;
    Ok(Json(comments.into_iter().map(CommentRecord::from).collect()))
}

async fn create(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<PostId>,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<CommentRecord>)> {
    let author = policy::authorize(&requester, ResourceKind::Comment, Operation::Create, None)?;

    let post_id = ids.resolve()?;
    ensure_post_exists(&state, post_id).await?;

    let draft = CommentDraft::from_wire(&payload.into_map()?, Mode::Full)?;
    let new_comment = NewComment {
        text: draft.text.unwrap_or_default(),
    };

    let comment = state
        .comments
        .create(author, post_id, &new_comment)
        .await
        .map_err(|e| match e {
            DatabaseError::ForeignKeyViolation { .. } => ApiError::NotFound,
            e => e.into(),
        })?;

    info!("Comment {} on post {} created by {}", comment.id, post_id, author.username);
    Ok((StatusCode::CREATED, Json(comment.into())))
}

async fn retrieve(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<(PostId, CommentId)>,
) -> ApiResult<Json<CommentRecord>> {
    policy::authorize(&requester, ResourceKind::Comment, Operation::Retrieve, None)?;

    let (post_id, id) = ids.resolve()?;
    let comment = state
        .comments
        .find_for_post(post_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(comment.into()))
}

async fn update(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<(PostId, CommentId)>,
    payload: Payload,
) -> ApiResult<Json<CommentRecord>> {
    save(&requester, &state, ids, payload, Mode::Full).await
}

async fn partial_update(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<(PostId, CommentId)>,
    payload: Payload,
) -> ApiResult<Json<CommentRecord>> {
    save(&requester, &state, ids, payload, Mode::Partial).await
}

async fn save(
    requester: &Requester,
    state: &AppState,
    ids: Ids<(PostId, CommentId)>,
    payload: Payload,
    mode: Mode,
) -> ApiResult<Json<CommentRecord>> {
    policy::authenticated(requester)?;

    let (post_id, id) = ids.resolve()?;
    let comment = state
        .comments
        .find_for_post(post_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    policy::authorize_owner(requester, ResourceKind::Comment, Operation::Update, &comment)?;

    let draft = CommentDraft::from_wire(&payload.into_map()?, mode)?;
    let comment = state
        .comments
        .update(id, &CommentChanges { text: draft.text })
        .await?
        .ok_or(ApiError::NotFound)?;

    info!("Comment {} updated", comment.id);
    Ok(Json(comment.into()))
}

async fn destroy(
    requester: Requester,
    State(state): State<AppState>,
    ids: Ids<(PostId, CommentId)>,
) -> ApiResult<StatusCode> {
    policy::authenticated(&requester)?;

    let (post_id, id) = ids.resolve()?;
    let comment = state
        .comments
        .find_for_post(post_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    policy::authorize_owner(&requester, ResourceKind::Comment, Operation::Delete, &comment)?;

    if !state.comments.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Comment {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}
