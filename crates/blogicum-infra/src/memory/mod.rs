//! In-memory repositories - used when no database is configured and in tests.
//!
//! All repositories share one [`MemoryStore`] so relations, cascades and
//! constraints behave like the PostgreSQL schema. Data is lost on restart.

mod repositories;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::error::RepoError;
use blogicum_core::listing::PostEntry;

pub use repositories::{
    InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryUserRepository,
};

#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) users: HashMap<Uuid, User>,
    pub(crate) categories: HashMap<Uuid, Category>,
    pub(crate) locations: HashMap<Uuid, Location>,
    pub(crate) posts: HashMap<Uuid, Post>,
    pub(crate) comments: HashMap<Uuid, Comment>,
}

impl Tables {
    /// Join `post` with its relations, like the database backend does.
    pub(crate) fn entry(&self, post: &Post) -> Result<PostEntry, RepoError> {
        let author = self.users.get(&post.author_id).cloned().ok_or_else(|| {
            RepoError::Query(format!("post {} references a missing author", post.id))
        })?;
        let category = self.categories.get(&post.category_id).cloned().ok_or_else(|| {
            RepoError::Query(format!("post {} references a missing category", post.id))
        })?;
        let location = post
            .location_id
            .and_then(|id| self.locations.get(&id).cloned());
        let comment_count = self
            .comments
            .values()
            .filter(|c| c.post_id == post.id)
            .count() as u64;

        Ok(PostEntry {
            post: post.clone(),
            author,
            category,
            location,
            comment_count,
        })
    }

    pub(crate) fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".into()));
        }
        if !self.categories.contains_key(&post.category_id) {
            return Err(RepoError::Constraint("post category does not exist".into()));
        }
        if let Some(location_id) = post.location_id
            && !self.locations.contains_key(&location_id)
        {
            return Err(RepoError::Constraint("post location does not exist".into()));
        }
        Ok(())
    }

    pub(crate) fn check_comment_references(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".into()));
        }
        if !self.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".into()));
        }
        Ok(())
    }

    /// Remove a post and, by cascade, its comments.
    pub(crate) fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }
}

/// Shared storage behind the in-memory repositories.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}
