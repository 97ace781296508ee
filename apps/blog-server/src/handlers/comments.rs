//! Comment handlers. Comments live under the post they belong to.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::domain::Comment;
use blogicum_core::error::DomainError;
use blogicum_core::policy;
use blogicum_shared::dto::CommentForm;

use super::posts::current_user;
use super::{Submitted, ownership_redirect, redirect, urls};
use crate::forms;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The comment named by the path; it must belong to the post in the path.
async fn find_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| DomainError::not_found("Comment", comment_id).into())
}

/// POST /posts/{post_id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    form: Submitted<CommentForm>,
) -> actix_web::Result<HttpResponse> {
    let post_id = path.into_inner();
    let author = current_user(&state, &identity).await?;

    let visible = state
        .posts
        .find_entry(post_id)
        .await
        .map_err(AppError::from)?
        .is_some_and(|entry| entry.is_visible_to(Some(author.id), Utc::now()));
    if !visible {
        return Err(AppError::from(DomainError::not_found("Post", post_id)).into());
    }

    let text = forms::clean_comment(&*form?)?;
    let comment = state
        .comments
        .create(Comment::new(post_id, author.id, text))
        .await
        .map_err(AppError::from)?;
    tracing::info!(comment_id = %comment.id, %post_id, "Comment added");

    Ok(redirect(urls::post_detail(post_id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    let access = policy::access(comment.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post_id)) {
        return Ok(response);
    }

    Ok(HttpResponse::Ok().json(CommentForm { text: comment.text }))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    viewer: OptionalIdentity,
    form: Submitted<CommentForm>,
) -> actix_web::Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = find_comment(&state, post_id, comment_id).await?;
    let access = policy::access(comment.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post_id)) {
        return Ok(response);
    }

    comment.text = forms::clean_comment(&*form?)?;
    state.comments.update(comment).await.map_err(AppError::from)?;
    tracing::info!(%comment_id, %post_id, "Comment updated");

    Ok(redirect(urls::post_detail(post_id)))
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    let access = policy::access(comment.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post_id)) {
        return Ok(response);
    }

    Ok(HttpResponse::Ok().json(CommentForm { text: comment.text }))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = find_comment(&state, post_id, comment_id).await?;
    let access = policy::access(comment.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post_id)) {
        return Ok(response);
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(%comment_id, %post_id, "Comment deleted");

    Ok(redirect(urls::post_detail(post_id)))
}
