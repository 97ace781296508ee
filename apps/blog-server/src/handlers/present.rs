//! Conversions from domain values to response documents.

use blogicum_core::domain::{Category, Location, Post, User};
use blogicum_core::listing::{CommentEntry, Page, PostEntry};
use blogicum_shared::PageResponse;
use blogicum_shared::dto::{
    AuthorSummary, CategoryResponse, CommentResponse, LocationResponse, PostForm, PostResponse,
    ProfileForm, ProfileResponse,
};

/// Format used to prefill `datetime-local` inputs.
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

pub fn author(user: &User) -> AuthorSummary {
    AuthorSummary {
        id: user.id,
        username: user.username.clone(),
        full_name: user.display_name(),
    }
}

pub fn profile(user: &User) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.display_name(),
        date_joined: user.date_joined,
    }
}

pub fn profile_form(user: &User) -> ProfileForm {
    ProfileForm {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
        is_published: category.is_published,
    }
}

pub fn location(location: &Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name.clone(),
        is_published: location.is_published,
    }
}

pub fn post(entry: PostEntry) -> PostResponse {
    let PostEntry {
        post,
        author: post_author,
        category: post_category,
        location: post_location,
        comment_count,
    } = entry;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        author: author(&post_author),
        category: category(&post_category),
        location: post_location.as_ref().map(location),
        comment_count,
        created_at: post.created_at,
    }
}

/// The post form prefilled with a stored post.
pub fn post_form(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date.format(DATETIME_LOCAL).to_string(),
        category: post.category_id.to_string(),
        location: post.location_id.map(|id| id.to_string()),
        is_published: post.is_published.then(|| "on".to_string()),
    }
}

/// An empty post form with the publication date set to now.
pub fn blank_post_form() -> PostForm {
    PostForm {
        pub_date: chrono::Utc::now().format(DATETIME_LOCAL).to_string(),
        is_published: Some("on".to_string()),
        ..PostForm::default()
    }
}

pub fn comment(entry: CommentEntry) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        post_id: entry.comment.post_id,
        text: entry.comment.text,
        author: author(&entry.author),
        created_at: entry.comment.created_at,
    }
}

pub fn page<T, U>(page: Page<T>, convert: impl FnMut(T) -> U) -> PageResponse<U> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(convert);

    PageResponse {
        items: page.items,
        page: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next,
        has_previous,
    }
}
