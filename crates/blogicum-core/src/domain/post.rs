use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog entry, possibly scheduled for the future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The author-editable part of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
}

impl Post {
    /// Create a new post authored by `author_id`.
    pub fn new(author_id: Uuid, content: PostContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: content.title,
            text: content.text,
            pub_date: content.pub_date,
            is_published: content.is_published,
            author_id,
            category_id: content.category_id,
            location_id: content.location_id,
            created_at: Utc::now(),
        }
    }

    /// Replace the editable fields; author and creation time are kept.
    pub fn apply(&mut self, content: PostContent) {
        self.title = content.title;
        self.text = content.text;
        self.pub_date = content.pub_date;
        self.is_published = content.is_published;
        self.category_id = content.category_id;
        self.location_id = content.location_id;
    }

    pub fn content(&self) -> PostContent {
        PostContent {
            title: self.title.clone(),
            text: self.text.clone(),
            pub_date: self.pub_date,
            is_published: self.is_published,
            category_id: self.category_id,
            location_id: self.location_id,
        }
    }
}
