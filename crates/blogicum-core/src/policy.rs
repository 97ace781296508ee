//! Visibility and ownership rules for posts and comments.
//!
//! A post is publicly visible when it is published, its publication date has
//! passed and its category is published. The author always sees their own
//! posts. Only the author of a post or comment may change it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post};

/// Whether anybody may see `post` at instant `now`.
pub fn is_publicly_visible(post: &Post, category: &Category, now: DateTime<Utc>) -> bool {
    debug_assert_eq!(post.category_id, category.id);
    post.is_published && post.pub_date <= now && category.is_published
}

/// Whether `viewer` (`None` for anonymous) may see `post` at instant `now`.
pub fn is_visible_to(
    post: &Post,
    category: &Category,
    viewer: Option<Uuid>,
    now: DateTime<Utc>,
) -> bool {
    viewer == Some(post.author_id) || is_publicly_visible(post, category, now)
}

/// How a viewer relates to the owner of something they want to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    NotOwner,
    Owner,
}

impl Access {
    pub fn is_owner(self) -> bool {
        matches!(self, Access::Owner)
    }
}

/// Classify `viewer` against `owner_id`.
pub fn access(owner_id: Uuid, viewer: Option<Uuid>) -> Access {
    match viewer {
        None => Access::Anonymous,
        Some(id) if id == owner_id => Access::Owner,
        Some(_) => Access::NotOwner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostContent;
    use chrono::TimeDelta;

    fn fixture(is_published: bool, offset: TimeDelta, category_published: bool) -> (Post, Category) {
        let mut category = Category::new("Travel".into(), String::new(), "travel".into());
        category.is_published = category_published;
        let post = Post::new(
            Uuid::new_v4(),
            PostContent {
                title: "Trip".into(),
                text: "Went places".into(),
                pub_date: Utc::now() + offset,
                is_published,
                category_id: category.id,
                location_id: None,
            },
        );
        (post, category)
    }

    #[test]
    fn test_published_past_post_is_public() {
        let (post, category) = fixture(true, TimeDelta::hours(-1), true);
        assert!(is_publicly_visible(&post, &category, Utc::now()));
        assert!(is_visible_to(&post, &category, None, Utc::now()));
    }

    #[test]
    fn test_unpublished_post_only_visible_to_author() {
        let (post, category) = fixture(false, TimeDelta::hours(-1), true);
        let now = Utc::now();

        assert!(!is_publicly_visible(&post, &category, now));
        assert!(!is_visible_to(&post, &category, None, now));
        assert!(!is_visible_to(&post, &category, Some(Uuid::new_v4()), now));
        assert!(is_visible_to(&post, &category, Some(post.author_id), now));
    }

    #[test]
    fn test_future_post_hidden_until_pub_date() {
        let (post, category) = fixture(true, TimeDelta::days(1), true);

        assert!(!is_publicly_visible(&post, &category, Utc::now()));
        assert!(is_publicly_visible(&post, &category, post.pub_date));
        assert!(is_visible_to(&post, &category, Some(post.author_id), Utc::now()));
    }

    #[test]
    fn test_unpublished_category_hides_post() {
        let (post, category) = fixture(true, TimeDelta::hours(-1), false);
        assert!(!is_publicly_visible(&post, &category, Utc::now()));
        assert!(is_visible_to(&post, &category, Some(post.author_id), Utc::now()));
    }

    #[test]
    fn test_access_classification() {
        let owner = Uuid::new_v4();
        assert_eq!(access(owner, None), Access::Anonymous);
        assert_eq!(access(owner, Some(Uuid::new_v4())), Access::NotOwner);
        assert_eq!(access(owner, Some(owner)), Access::Owner);
        assert!(access(owner, Some(owner)).is_owner());
    }
}
