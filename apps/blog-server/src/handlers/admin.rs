//! Staff-only data operations behind the admin site: the post list with
//! search and filters, quick edits, and category/location maintenance.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::{Category, Location, User};
use blogicum_core::error::DomainError;
use blogicum_core::listing::PostFilter;
use blogicum_shared::dto::{AdminPostForm, AdminPostQuery, CategoryForm, LocationForm, PageQuery};

use super::posts::current_user;
use super::{Submitted, list_posts, present};
use crate::forms::{self, CategoryFields};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The logged-in user if they are staff, else 403.
async fn require_staff(state: &AppState, identity: &Identity) -> AppResult<User> {
    let user = current_user(state, identity).await?;
    if !user.is_staff {
        tracing::debug!(username = %user.username, "Admin access refused");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

/// GET /admin/posts/
pub async fn posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<AdminPostQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&state, &identity).await?;
    let query = query.into_inner();

    let mut filter = PostFilter::all();
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        filter = filter.title_contains(q);
    }
    if let Some(category_id) = query.category {
        filter = filter.in_category(category_id);
    }
    if let Some(location_id) = query.location {
        filter = filter.at_location(location_id);
    }
    if let Some(author_id) = query.author {
        filter = filter.by_author(author_id);
    }

    let posts = list_posts(&state, &filter, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /admin/posts/{post_id}/
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: Submitted<AdminPostForm>,
) -> actix_web::Result<HttpResponse> {
    require_staff(&state, &identity).await?;
    let post_id = path.into_inner();
    let mut post = state
        .posts
        .find_by_id(post_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::from(DomainError::not_found("Post", post_id)))?;

    let (category_id, location_id, is_published) = forms::clean_admin_post(&state, &*form?).await?;
    post.category_id = category_id;
    post.location_id = location_id;
    post.is_published = is_published;
    state.posts.update(post).await.map_err(AppError::from)?;
    tracing::info!(%post_id, "Post updated by staff");

    let entry = state
        .posts
        .find_entry(post_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::from(DomainError::not_found("Post", post_id)))?;
    Ok(HttpResponse::Ok().json(present::post(entry)))
}

fn apply_category(category: &mut Category, fields: CategoryFields) {
    category.title = fields.title;
    category.description = fields.description;
    category.slug = fields.slug;
    category.is_published = fields.is_published;
}

/// POST /admin/categories/
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    form: Submitted<CategoryForm>,
) -> actix_web::Result<HttpResponse> {
    require_staff(&state, &identity).await?;
    let fields = forms::clean_category(&state, None, &*form?).await?;

    let mut category = Category::new(fields.title, fields.description, fields.slug);
    category.is_published = fields.is_published;
    let category = state.categories.create(category).await.map_err(AppError::from)?;
    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");

    Ok(HttpResponse::Ok().json(present::category(&category)))
}

/// POST /admin/categories/{category_id}/
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: Submitted<CategoryForm>,
) -> actix_web::Result<HttpResponse> {
    require_staff(&state, &identity).await?;
    let mut category = find_category(&state, path.into_inner()).await?;

    let fields = forms::clean_category(&state, Some(category.id), &*form?).await?;
    apply_category(&mut category, fields);
    let category = state.categories.update(category).await.map_err(AppError::from)?;
    tracing::info!(category_id = %category.id, "Category updated");

    Ok(HttpResponse::Ok().json(present::category(&category)))
}

/// POST /admin/locations/
pub async fn create_location(
    state: web::Data<AppState>,
    identity: Identity,
    form: Submitted<LocationForm>,
) -> actix_web::Result<HttpResponse> {
    require_staff(&state, &identity).await?;
    let (name, is_published) = forms::clean_location(&*form?)?;

    let mut location = Location::new(name);
    location.is_published = is_published;
    let location = state.locations.create(location).await.map_err(AppError::from)?;
    tracing::info!(location_id = %location.id, "Location created");

    Ok(HttpResponse::Ok().json(present::location(&location)))
}

/// POST /admin/locations/{location_id}/
pub async fn update_location(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: Submitted<LocationForm>,
) -> actix_web::Result<HttpResponse> {
    require_staff(&state, &identity).await?;
    let mut location = find_location(&state, path.into_inner()).await?;

    let (name, is_published) = forms::clean_location(&*form?)?;
    location.name = name;
    location.is_published = is_published;
    let location = state.locations.update(location).await.map_err(AppError::from)?;
    tracing::info!(location_id = %location.id, "Location updated");

    Ok(HttpResponse::Ok().json(present::location(&location)))
}

/// GET /admin/categories/{category_id}/posts/
pub async fn category_posts(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&state, &identity).await?;
    let category = find_category(&state, path.into_inner()).await?;

    let filter = PostFilter::all().in_category(category.id);
    let posts = list_posts(&state, &filter, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /admin/locations/{location_id}/posts/
pub async fn location_posts(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&state, &identity).await?;
    let location = find_location(&state, path.into_inner()).await?;

    let filter = PostFilter::all().at_location(location.id);
    let posts = list_posts(&state, &filter, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

async fn find_category(state: &AppState, id: Uuid) -> AppResult<Category> {
    state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Category", id).into())
}

async fn find_location(state: &AppState, id: Uuid) -> AppResult<Location> {
    state
        .locations
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Location", id).into())
}
