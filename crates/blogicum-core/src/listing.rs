//! Listing filters and pagination.
//!
//! Every post listing (home page, category page, profile page, admin list) is
//! a [`PostFilter`] plus a [`PageRequest`]. Repositories order results by
//! publication date, newest first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};

/// Which posts a listing contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub title_contains: Option<String>,
    /// When set, only posts publicly visible at this instant are listed.
    pub public_at: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Every post, visible or not.
    pub fn all() -> Self {
        Self::default()
    }

    /// Posts publicly visible at `now`.
    pub fn public(now: DateTime<Utc>) -> Self {
        Self {
            public_at: Some(now),
            ..Self::default()
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn at_location(mut self, location_id: Uuid) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.title_contains = (!needle.trim().is_empty()).then(|| needle.trim().to_string());
        self
    }

    /// In-memory evaluation of the filter, mirroring the SQL the database
    /// backend generates.
    pub fn matches(&self, post: &Post, category: &Category) -> bool {
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.category_id.is_some_and(|id| id != post.category_id) {
            return false;
        }
        if self.location_id.is_some() && self.location_id != post.location_id {
            return false;
        }
        if let Some(needle) = &self.title_contains
            && !post.title.to_lowercase().contains(&needle.to_lowercase())
        {
            return false;
        }
        match self.public_at {
            Some(now) => crate::policy::is_publicly_visible(post, category, now),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageSelector {
    Number(u64),
    Last,
}

/// A requested page of a listing. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    selector: PageSelector,
    size: u64,
}

impl PageRequest {
    pub const PAGE_SIZE: u64 = 10;

    pub fn first() -> Self {
        Self::number(1)
    }

    pub fn number(number: u64) -> Self {
        Self {
            selector: PageSelector::Number(number),
            size: Self::PAGE_SIZE,
        }
    }

    pub fn last() -> Self {
        Self {
            selector: PageSelector::Last,
            size: Self::PAGE_SIZE,
        }
    }

    /// Parse the `page` query parameter. `None` means the value is not a
    /// page number (callers answer 404).
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") => Some(Self::first()),
            Some("last") => Some(Self::last()),
            Some(value) => match value.parse::<u64>() {
                Ok(0) | Err(_) => None,
                Ok(number) => Some(Self::number(number)),
            },
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of pages for `total` items. An empty listing still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.size).max(1)
    }

    /// The 1-based page number this request selects out of `total` items,
    /// or `None` when it is out of range.
    pub fn resolve(&self, total: u64) -> Option<u64> {
        let num_pages = self.num_pages(total);
        match self.selector {
            PageSelector::Last => Some(num_pages),
            PageSelector::Number(n) if (1..=num_pages).contains(&n) => Some(n),
            PageSelector::Number(_) => None,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// A post joined with its author, category and location, annotated with the
/// number of comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub post: Post,
    pub author: User,
    pub category: Category,
    pub location: Option<Location>,
    pub comment_count: u64,
}

impl PostEntry {
    pub fn is_visible_to(&self, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
        crate::policy::is_visible_to(&self.post, &self.category, viewer, now)
    }
}

/// A comment joined with its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: User,
}
