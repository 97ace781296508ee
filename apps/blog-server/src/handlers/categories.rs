//! Category listing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::error::DomainError;
use blogicum_core::listing::PostFilter;
use blogicum_shared::dto::{CategoryPageResponse, PageQuery};

use super::{list_posts, present};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /category/{category_slug}/
///
/// Unpublished categories do not exist for visitors.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .find_by_slug(&path)
        .await?
        .filter(|category| category.is_published)
        .ok_or_else(|| DomainError::not_found("Category", path.as_str()))?;

    let filter = PostFilter::public(Utc::now()).in_category(category.id);
    let posts = list_posts(&state, &filter, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(CategoryPageResponse {
        category: present::category(&category),
        posts,
    }))
}
