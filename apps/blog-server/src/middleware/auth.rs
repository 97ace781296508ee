//! Authentication extractors.
//!
//! The access token is read from `Authorization: Bearer <jwt>` or, for
//! browsers, from the `access_token` cookie set at login.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use blogicum_core::ports::{AuthError, TokenClaims};
use blogicum_shared::ErrorResponse;

use crate::handlers::urls;
use crate::state::AppState;

/// Name of the cookie holding the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication; anonymous requests are
/// redirected to the login page:
/// ```ignore
/// async fn create_post(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Authentication failure, answered by sending the client to the login page.
#[derive(Debug)]
pub struct AuthenticationError {
    pub error: AuthError,
    /// Where to come back to after logging in.
    pub next: String,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.error {
            AuthError::MissingAuth | AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                actix_web::http::StatusCode::FOUND
            }
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.error {
            AuthError::MissingAuth | AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                HttpResponse::Found()
                    .insert_header((header::LOCATION, urls::login(Some(&self.next))))
                    .finish()
            }
            _ => HttpResponse::InternalServerError().json(ErrorResponse::internal_error()),
        }
    }
}

/// The raw token carried by the request, if any.
fn request_token(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(|t| Some(t.trim().to_string()))
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    Ok(req
        .cookie(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::Unavailable("Server configuration error".to_string()));
    };

    let token = request_token(req)?.ok_or(AuthError::MissingAuth)?;
    state.tokens.validate_token(&token).map(Identity::from)
}

/// Path and query of the request, used as the post-login destination.
pub(crate) fn requested_location(req: &HttpRequest) -> String {
    match req.uri().path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => req.path().to_string(),
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|error| {
            tracing::debug!(%error, path = req.path(), "Authentication required");
            AuthenticationError {
                error,
                next: requested_location(req),
            }
        }))
    }
}

/// Optional identity extractor - anonymous visitors get `None`.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|i| i.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
