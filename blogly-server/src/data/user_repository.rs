use crate::domain::error::DomainError;
use crate::domain::user::{NewUser, User, UserChanges};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;
    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<User>, DomainError>;
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;
    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, DomainError>;
    /// Returns whether a row was removed. Posts go with the user.
    async fn delete(&self, id: i32) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list(&self) -> Result<Vec<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, image_url
            FROM users
            ORDER BY first_name, last_name NULLS FIRST, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while listing users: {}", e);
            DomainError::from(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, image_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find user by id {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, image_url
            FROM users
            WHERE first_name = $1 AND last_name IS NOT DISTINCT FROM $2
            LIMIT 1
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find user by name {}: {}", first_name, e);
            DomainError::from(e)
        })
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, image_url)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, image_url
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create user: {}", e);
            DomainError::from(e)
        })?;

        info!(user_id = user.id, name = %user.full_name(), "user created");
        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, DomainError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                image_url = COALESCE($3, image_url)
            WHERE id = $4
            RETURNING id, first_name, last_name, image_url
            "#,
        )
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update user {}: {}", id, e);
            DomainError::from(e)
        })?;

        if user.is_some() {
            info!(user_id = id, "user updated");
        }

        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete user {}: {}", id, e);
                DomainError::from(e)
            })?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(user_id = id, "user deleted");
        }
        Ok(removed)
    }
}
