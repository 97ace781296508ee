//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod present;
mod profiles;
pub mod urls;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use blogicum_core::error::RepoError;
use blogicum_core::listing::{PageRequest, PostFilter};
use blogicum_core::policy::Access;
use blogicum_shared::dto::PostResponse;
use blogicum_shared::{ErrorResponse, PageResponse};

use crate::middleware::auth::requested_location;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// A form body extracted without failing the request, so that login and
/// ownership checks answer before the form is looked at.
pub(crate) type Submitted<T> = Result<web::Form<T>, actix_web::Error>;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::invalid(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::not_found(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .route("/", web::get().to(posts::index))
    // Posts; `create/` must come before the `{post_id}` routes
    .service(
        web::resource("/posts/create/")
            .route(web::get().to(posts::create_form))
            .route(web::post().to(posts::create)),
    )
    .route("/posts/{post_id}/", web::get().to(posts::detail))
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::edit_form))
            .route(web::post().to(posts::edit)),
    )
    .service(
        web::resource("/posts/{post_id}/delete/")
            .route(web::get().to(posts::delete_form))
            .route(web::post().to(posts::delete)),
    )
    // Comments
    .route("/posts/{post_id}/comment/", web::post().to(comments::add))
    .service(
        web::resource("/posts/{post_id}/edit_comment/{comment_id}/")
            .route(web::get().to(comments::edit_form))
            .route(web::post().to(comments::edit)),
    )
    .service(
        web::resource("/posts/{post_id}/delete_comment/{comment_id}/")
            .route(web::get().to(comments::delete_form))
            .route(web::post().to(comments::delete)),
    )
    // Listings
    .route(
        "/category/{category_slug}/",
        web::get().to(categories::category_posts),
    )
    .route("/profile/{username}/", web::get().to(profiles::profile))
    .service(
        web::resource("/profile/{username}/edit/")
            .route(web::get().to(profiles::edit_form))
            .route(web::post().to(profiles::edit)),
    )
    // Accounts
    .service(
        web::scope("/auth")
            .service(
                web::resource("/registration/")
                    .route(web::get().to(auth::registration_form))
                    .route(web::post().to(auth::register)),
            )
            .service(
                web::resource("/login/")
                    .route(web::get().to(auth::login_form))
                    .route(web::post().to(auth::login)),
            )
            .route("/logout/", web::post().to(auth::logout)),
    )
    // Administration
    .service(
        web::scope("/admin")
            .route("/posts/", web::get().to(admin::posts))
            .route("/posts/{post_id}/", web::post().to(admin::update_post))
            .route("/categories/", web::post().to(admin::create_category))
            .route(
                "/categories/{category_id}/",
                web::post().to(admin::update_category),
            )
            .route(
                "/categories/{category_id}/posts/",
                web::get().to(admin::category_posts),
            )
            .route("/locations/", web::post().to(admin::create_location))
            .route(
                "/locations/{location_id}/",
                web::post().to(admin::update_location),
            )
            .route(
                "/locations/{location_id}/posts/",
                web::get().to(admin::location_posts),
            ),
    )
    .default_service(web::to(not_found));
}

async fn not_found(request_id: RequestId) -> HttpResponse {
    HttpResponse::NotFound().json(
        ErrorResponse::not_found("The requested page does not exist")
            .with_request_id(request_id.as_str()),
    )
}

/// A `302 Found` to `location`.
pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Where a viewer who may not change something is sent instead: the login
/// page when anonymous, `fallback` when logged in as someone else. `None`
/// lets the owner through.
pub(crate) fn ownership_redirect(
    access: Access,
    req: &HttpRequest,
    fallback: impl FnOnce() -> String,
) -> Option<HttpResponse> {
    match access {
        Access::Owner => None,
        Access::Anonymous => Some(redirect(urls::login(Some(&requested_location(req))))),
        Access::NotOwner => {
            tracing::debug!(path = req.path(), "Change refused to non-owner");
            Some(redirect(fallback()))
        }
    }
}

/// One page of the posts matching `filter`; a bad or out-of-range page is a 404.
pub(crate) async fn list_posts(
    state: &AppState,
    filter: &PostFilter,
    page: Option<&str>,
) -> AppResult<PageResponse<PostResponse>> {
    let request = PageRequest::parse(page).ok_or_else(|| AppError::not_found("Invalid page"))?;
    let page = state
        .posts
        .list(filter, request)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AppError::not_found("Invalid page"),
            other => other.into(),
        })?;

    Ok(present::page(page, present::post))
}
