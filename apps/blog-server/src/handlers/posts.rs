//! Post pages: home listing, detail, create, edit and delete.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::domain::{Post, User};
use blogicum_core::error::DomainError;
use blogicum_core::listing::PostFilter;
use blogicum_core::policy;
use blogicum_shared::dto::{CommentForm, PageQuery, PostDetailResponse, PostForm, PostFormResponse};

use super::{Submitted, list_posts, ownership_redirect, present, redirect, urls};
use crate::forms;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = list_posts(&state, &PostFilter::public(Utc::now()), query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{post_id}/
///
/// Hidden posts answer 404 to everyone but their author.
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let entry = state
        .posts
        .find_entry(post_id)
        .await?
        .filter(|entry| entry.is_visible_to(viewer.user_id(), Utc::now()))
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let comments = state.comments.list_for_post(post_id).await?;
    let is_owner = viewer.user_id() == Some(entry.post.author_id);

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: present::post(entry),
        comments: comments.into_iter().map(present::comment).collect(),
        comment_form: viewer.0.as_ref().map(|_| CommentForm::default()),
        is_owner,
    }))
}

/// The form document with the available categories and locations.
async fn form_response(state: &AppState, form: PostForm) -> AppResult<HttpResponse> {
    let categories = state.categories.list_all().await?;
    let locations = state.locations.list_all().await?;

    Ok(HttpResponse::Ok().json(PostFormResponse {
        form,
        categories: categories.iter().map(present::category).collect(),
        locations: locations.iter().map(present::location).collect(),
    }))
}

/// The stored account behind a token.
pub(crate) async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %identity.username, "Token for an unknown account");
            DomainError::UnknownAccount.into()
        })
}

async fn find_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id).into())
}

/// GET /posts/create/
pub async fn create_form(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    form_response(&state, present::blank_post_form()).await
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: Submitted<PostForm>,
) -> actix_web::Result<HttpResponse> {
    let form = form?;
    let author = current_user(&state, &identity).await?;
    let content = forms::clean_post(&state, &form).await?;

    let post = state.posts.create(Post::new(author.id, content)).await.map_err(AppError::from)?;
    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    Ok(redirect(urls::profile(&author.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let access = policy::access(post.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post.id)) {
        return Ok(response);
    }

    form_response(&state, present::post_form(&post)).await
}

/// POST /posts/{post_id}/edit/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
    form: Submitted<PostForm>,
) -> actix_web::Result<HttpResponse> {
    let mut post = find_post(&state, path.into_inner()).await?;
    let access = policy::access(post.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post.id)) {
        return Ok(response);
    }

    let content = forms::clean_post(&state, &*form?).await?;
    post.apply(content);
    let post = state.posts.update(post).await.map_err(AppError::from)?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(redirect(urls::post_detail(post.id)))
}

/// GET /posts/{post_id}/delete/
pub async fn delete_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let access = policy::access(post.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post.id)) {
        return Ok(response);
    }

    form_response(&state, present::post_form(&post)).await
}

/// POST /posts/{post_id}/delete/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let access = policy::access(post.author_id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::post_detail(post.id)) {
        return Ok(response);
    }

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(redirect(urls::INDEX))
}
