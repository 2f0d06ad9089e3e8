use crate::domain::error::DomainError;
use crate::domain::tag::Tag;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Tag>, DomainError>;
    async fn list_by_post(&self, post_id: i32) -> Result<Vec<Tag>, DomainError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DomainError>;
    async fn create(&self, name: String) -> Result<Tag, DomainError>;
    async fn update(&self, id: i32, name: Option<String>) -> Result<Option<Tag>, DomainError>;
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, DomainError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while listing tags: {}", e);
                DomainError::from(e)
            })
    }

    async fn list_by_post(&self, post_id: i32) -> Result<Vec<Tag>, DomainError> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN posts_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching tags of post {}: {}", post_id, e);
            DomainError::from(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, DomainError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to find tag by id {}: {}", id, e);
                DomainError::from(e)
            })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DomainError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to find tag by name {}: {}", name, e);
                DomainError::from(e)
            })
    }

    async fn create(&self, name: String) -> Result<Tag, DomainError> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create tag: {}", e);
            if e.as_database_error()
                .and_then(|db| db.constraint())
                .map(|c| c.contains("tags_name"))
                == Some(true)
            {
                DomainError::invalid("A tag already exists by that name")
            } else {
                DomainError::from(e)
            }
        })?;

        info!(tag_id = tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }

    async fn update(&self, id: i32, name: Option<String>) -> Result<Option<Tag>, DomainError> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = COALESCE($1, name)
            WHERE id = $2
            RETURNING id, name
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update tag {}: {}", id, e);
            DomainError::from(e)
        })?;

        if tag.is_some() {
            info!(tag_id = id, "tag updated");
        }
        Ok(tag)
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete tag {}: {}", id, e);
                DomainError::from(e)
            })?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(tag_id = id, "tag deleted");
        }
        Ok(removed)
    }
}
