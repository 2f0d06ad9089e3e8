pub mod memory;
pub mod post_repository;
pub mod tag_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use memory::MemoryStore;
use post_repository::{PostRepository, PostgresPostRepository};
use tag_repository::{PostgresTagRepository, TagRepository};
use user_repository::{PostgresUserRepository, UserRepository};

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            tags: Arc::new(PostgresTagRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            tags: store,
        }
    }
}
