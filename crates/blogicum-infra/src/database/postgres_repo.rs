//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, User};
use blogicum_core::error::RepoError;
use blogicum_core::listing::{CommentEntry, Page, PageRequest, PostEntry, PostFilter};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Escape `%`, `_` and `\` so a search term matches literally inside LIKE.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Restrict a post query to the rows `filter` selects.
fn filtered(filter: &PostFilter) -> Select<PostEntity> {
    let mut select = PostEntity::find().join(JoinType::InnerJoin, post::Relation::Category.def());

    if let Some(author_id) = filter.author_id {
        select = select.filter(post::Column::AuthorId.eq(author_id));
    }
    if let Some(category_id) = filter.category_id {
        select = select.filter(post::Column::CategoryId.eq(category_id));
    }
    if let Some(location_id) = filter.location_id {
        select = select.filter(post::Column::LocationId.eq(location_id));
    }
    if let Some(needle) = &filter.title_contains {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Title)))).like(pattern),
        );
    }
    if let Some(now) = filter.public_at {
        select = select
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now.fixed_offset()))
            .filter(category::Column::IsPublished.eq(true));
    }

    select
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::CreatedAt)
}

/// Row of the grouped comment count query.
#[derive(Debug, FromQueryResult)]
struct CommentCount {
    post_id: Uuid,
    comment_count: i64,
}

/// Join fetched posts with their author, category, location and comment count.
async fn attach_relations(
    db: &DbConn,
    posts: Vec<post::Model>,
) -> Result<Vec<PostEntry>, RepoError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let author_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
    let category_ids: HashSet<Uuid> = posts.iter().map(|p| p.category_id).collect();
    let location_ids: HashSet<Uuid> = posts.iter().filter_map(|p| p.location_id).collect();

    let authors: HashMap<Uuid, User> = UserEntity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();

    let categories: HashMap<Uuid, Category> = CategoryEntity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();

    let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        LocationEntity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect()
    };

    let comment_counts: HashMap<Uuid, i64> = CommentEntity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(comment::Column::Id.count(), "comment_count")
        .filter(comment::Column::PostId.is_in(post_ids))
        .group_by(comment::Column::PostId)
        .into_model::<CommentCount>()
        .all(db)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|row| (row.post_id, row.comment_count))
        .collect();

    posts
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                RepoError::Query(format!("post {} references a missing author", model.id))
            })?;
            let category = categories.get(&model.category_id).cloned().ok_or_else(|| {
                RepoError::Query(format!("post {} references a missing category", model.id))
            })?;
            let location = model
                .location_id
                .and_then(|id| locations.get(&id).cloned());
            let comment_count = comment_counts.get(&model.id).copied().unwrap_or(0);

            Ok(PostEntry {
                post: model.into(),
                author,
                category,
                location,
                comment_count: u64::try_from(comment_count).unwrap_or(0),
            })
        })
        .collect()
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(attach_relations(&self.db, vec![model]).await?.pop())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        tracing::debug!(?filter, ?page, "Listing posts");

        let paginator = filtered(filter).paginate(&self.db, page.size());
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let number = page.resolve(total).ok_or(RepoError::NotFound)?;

        let models = paginator
            .fetch_page(number - 1)
            .await
            .map_err(map_db_err)?;

        Ok(Page {
            items: attach_relations(&self.db, models).await?,
            number,
            num_pages: page.num_pages(total),
            total,
        })
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author = author.ok_or_else(|| {
                    RepoError::Query(format!("comment {} references a missing author", comment.id))
                })?;
                Ok(CommentEntry {
                    comment: Comment::from(comment),
                    author: author.into(),
                })
            })
            .collect()
    }
}
