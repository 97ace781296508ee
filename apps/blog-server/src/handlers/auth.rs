//! Account handlers: registration, login and logout.
//!
//! Login stores the JWT in an HttpOnly cookie so that browsers authenticate
//! subsequent page requests; API clients may send it as a Bearer token.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, http::header, web};

use blogicum_core::domain::User;
use blogicum_core::ports::AuthError;
use blogicum_shared::dto::{LoginForm, LoginPromptResponse, LoginQuery, RegisterForm};

use super::{redirect, urls};
use crate::forms;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /auth/registration/
pub async fn registration_form() -> HttpResponse {
    HttpResponse::Ok().json(LoginPromptResponse {
        fields: vec!["username".into(), "email".into(), "password".into()],
        next: None,
    })
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let (username, email) = forms::clean_registration(&state, &form).await?;
    let password_hash = state.passwords.hash(&form.password)?;

    let is_staff = state.accounts.is_staff_username(&username);
    let user = User::new(username, email, password_hash).with_staff(is_staff);
    let user = state.users.create(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, is_staff, "User registered");

    Ok(redirect(urls::LOGIN))
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<LoginQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginPromptResponse {
        fields: vec!["username".into(), "password".into()],
        next: query.into_inner().next,
    })
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_username(form.username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&form.password, &user.password_hash)? {
        tracing::info!(username = %user.username, "Login failed");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.accounts.cookie_secure)
        .max_age(Duration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    let location = urls::safe_next(form.next.as_deref()).unwrap_or(urls::INDEX);

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish())
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, urls::INDEX))
        .cookie(cookie)
        .finish()
}

