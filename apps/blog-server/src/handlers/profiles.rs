//! Profile page and profile editing.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;

use blogicum_core::domain::User;
use blogicum_core::error::DomainError;
use blogicum_core::listing::PostFilter;
use blogicum_core::policy;
use blogicum_shared::dto::{PageQuery, ProfileForm, ProfilePageResponse};

use super::{Submitted, list_posts, ownership_redirect, present, redirect, urls};
use crate::forms;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", username).into())
}

/// GET /profile/{username}/
///
/// Owners see all of their posts, everyone else only the public ones.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let user = find_user(&state, &path).await?;
    let is_owner = viewer.user_id() == Some(user.id);

    let filter = if is_owner {
        PostFilter::all().by_author(user.id)
    } else {
        PostFilter::public(Utc::now()).by_author(user.id)
    };
    let posts = list_posts(&state, &filter, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(ProfilePageResponse {
        profile: present::profile(&user),
        is_owner,
        posts,
    }))
}

/// GET /profile/{username}/edit/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let user = find_user(&state, &path).await?;
    let access = policy::access(user.id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::profile(&user.username)) {
        return Ok(response);
    }

    Ok(HttpResponse::Ok().json(present::profile_form(&user)))
}

/// POST /profile/{username}/edit/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    viewer: OptionalIdentity,
    form: Submitted<ProfileForm>,
) -> actix_web::Result<HttpResponse> {
    let mut user = find_user(&state, &path).await?;
    let access = policy::access(user.id, viewer.user_id());
    if let Some(response) = ownership_redirect(access, &req, || urls::profile(&user.username)) {
        return Ok(response);
    }

    let changes = forms::clean_profile(&state, user.id, &*form?).await?;
    user.apply_profile(changes);
    let user = state.users.update(user).await.map_err(AppError::from)?;
    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    Ok(redirect(urls::edit_profile(&user.username)))
}
