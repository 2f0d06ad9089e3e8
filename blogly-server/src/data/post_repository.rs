use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostChanges};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn recent(&self, limit: i64) -> Result<Vec<Post>, DomainError>;
    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Post>, DomainError>;
    async fn list_by_tag(&self, tag_id: i32) -> Result<Vec<Post>, DomainError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, DomainError>;
    /// Inserts the post, then tags it with every existing id in `tag_ids`.
    async fn create(&self, post: NewPost, tag_ids: &[i32]) -> Result<Post, DomainError>;
    /// Applies `changes` and adds `tag_ids` to the tags already attached.
    async fn update(
        &self,
        id: i32,
        changes: PostChanges,
        tag_ids: &[i32],
    ) -> Result<Option<Post>, DomainError>;
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Unknown tag ids are skipped, repeated ones collapse onto the composite key.
async fn attach_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i32,
    tag_ids: &[i32],
) -> Result<(), sqlx::Error> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO posts_tags (post_id, tag_id)
        SELECT $1, id FROM tags WHERE id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn recent(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at, user_id
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching recent posts: {}", e);
            DomainError::from(e)
        })
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at, user_id
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching posts of user {}: {}", user_id, e);
            DomainError::from(e)
        })
    }

    async fn list_by_tag(&self, tag_id: i32) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.content, p.created_at, p.user_id
            FROM posts p
            JOIN posts_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = $1
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching posts of tag {}: {}", tag_id, e);
            DomainError::from(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at, user_id
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn create(&self, post: NewPost, tag_ids: &[i32]) -> Result<Post, DomainError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, created_at, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, created_at, user_id
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        attach_tags(&mut tx, post.id, tag_ids).await.map_err(|e| {
            error!("failed to tag post {}: {}", post.id, e);
            DomainError::from(e)
        })?;
        tx.commit().await?;

        info!(post_id = post.id, user_id = post.user_id, tags = tag_ids.len(), "post created");
        Ok(post)
    }

    async fn update(
        &self,
        id: i32,
        changes: PostChanges,
        tag_ids: &[i32],
    ) -> Result<Option<Post>, DomainError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($1, title),
                content = COALESCE($2, content)
            WHERE id = $3
            RETURNING id, title, content, created_at, user_id
            "#,
        )
        .bind(changes.title)
        .bind(changes.content)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", id, e);
            DomainError::from(e)
        })?;

        let Some(post) = post else {
            return Ok(None);
        };

        attach_tags(&mut tx, post.id, tag_ids).await.map_err(|e| {
            error!("failed to tag post {}: {}", post.id, e);
            DomainError::from(e)
        })?;
        tx.commit().await?;

        info!(post_id = id, "post updated");
        Ok(Some(post))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete post {}: {}", id, e);
                DomainError::from(e)
            })?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(post_id = id, "post deleted");
        }
        Ok(removed)
    }
}
