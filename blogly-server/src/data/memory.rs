use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::info;

use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostChanges};
use crate::domain::tag::Tag;
use crate::domain::user::{NewUser, User, UserChanges};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    tags: BTreeMap<i32, Tag>,
    posts_tags: BTreeSet<(i32, i32)>,
    next_user_id: i32,
    next_post_id: i32,
    next_tag_id: i32,
}

impl Tables {
    fn attach_tags(&mut self, post_id: i32, tag_ids: &[i32]) {
        for tag_id in tag_ids {
            if self.tags.contains_key(tag_id) {
                self.posts_tags.insert((post_id, *tag_id));
            }
        }
    }

    fn remove_post(&mut self, post_id: i32) -> bool {
        self.posts_tags.retain(|(p, _)| *p != post_id);
        self.posts.remove(&post_id).is_some()
    }
}

fn oldest_first<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<Post> {
    let mut posts: Vec<Post> = posts.cloned().collect();
    posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    posts
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        self.tables
            .read()
            .map_err(|_| DomainError::Internal("memory store poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        self.tables
            .write()
            .map_err(|_| DomainError::Internal("memory store poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let tables = self.read()?;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.has_name(first_name, last_name))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tables = self.write()?;
        let user = User {
            id: next_id(&mut tables.next_user_id),
            first_name: user.first_name,
            last_name: user.last_name,
            image_url: user.image_url,
        };
        tables.users.insert(user.id, user.clone());
        info!(user_id = user.id, name = %user.full_name(), "user created");
        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, DomainError> {
        let mut tables = self.write()?;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(user);
        info!(user_id = id, "user updated");
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut tables = self.write()?;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i32> = tables
            .posts
            .values()
            .filter(|post| post.user_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        info!(user_id = id, "user deleted");
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn recent(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        let tables = self.read()?;
        let mut posts = oldest_first(tables.posts.values());
        posts.reverse();
        posts.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(posts)
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Post>, DomainError> {
        let tables = self.read()?;
        Ok(oldest_first(tables.posts.values().filter(|post| post.user_id == user_id)))
    }

    async fn list_by_tag(&self, tag_id: i32) -> Result<Vec<Post>, DomainError> {
        let tables = self.read()?;
        let tagged = tables
            .posts_tags
            .iter()
            .filter(|(_, t)| *t == tag_id)
            .filter_map(|(p, _)| tables.posts.get(p));
        Ok(oldest_first(tagged))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, DomainError> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    async fn create(&self, post: NewPost, tag_ids: &[i32]) -> Result<Post, DomainError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&post.user_id) {
            return Err(DomainError::Internal(format!(
                "posts.user_id references missing user {}",
                post.user_id
            )));
        }
        let post = Post {
            id: next_id(&mut tables.next_post_id),
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            user_id: post.user_id,
        };
        tables.posts.insert(post.id, post.clone());
        tables.attach_tags(post.id, tag_ids);
        info!(post_id = post.id, user_id = post.user_id, tags = tag_ids.len(), "post created");
        Ok(post)
    }

    async fn update(
        &self,
        id: i32,
        changes: PostChanges,
        tag_ids: &[i32],
    ) -> Result<Option<Post>, DomainError> {
        let mut tables = self.write()?;
        let Some(post) = tables.posts.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(post);
        let post = post.clone();
        tables.attach_tags(id, tag_ids);
        info!(post_id = id, "post updated");
        Ok(Some(post))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let removed = self.write()?.remove_post(id);
        if removed {
            info!(post_id = id, "post deleted");
        }
        Ok(removed)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Tag>, DomainError> {
        let mut tags: Vec<Tag> = self.read()?.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_by_post(&self, post_id: i32) -> Result<Vec<Tag>, DomainError> {
        let tables = self.read()?;
        let mut tags: Vec<Tag> = tables
            .posts_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| tables.tags.get(t).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, DomainError> {
        Ok(self.read()?.tags.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DomainError> {
        Ok(self.read()?.tags.values().find(|tag| tag.name == name).cloned())
    }

    async fn create(&self, name: String) -> Result<Tag, DomainError> {
        let mut tables = self.write()?;
        if tables.tags.values().any(|tag| tag.name == name) {
            return Err(DomainError::invalid("A tag already exists by that name"));
        }
        let tag = Tag {
            id: next_id(&mut tables.next_tag_id),
            name,
        };
        tables.tags.insert(tag.id, tag.clone());
        info!(tag_id = tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }

    async fn update(&self, id: i32, name: Option<String>) -> Result<Option<Tag>, DomainError> {
        let mut tables = self.write()?;
        if let Some(name) = name.as_deref() {
            // Mirrors the UNIQUE constraint on tags.name.
            if tables.tags.values().any(|tag| tag.id != id && tag.name == name) {
                return Err(DomainError::Internal(format!(
                    "duplicate key value violates unique constraint tags_name_key: {}",
                    name
                )));
            }
        }
        let Some(tag) = tables.tags.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            tag.name = name;
        }
        info!(tag_id = id, "tag updated");
        Ok(Some(tag.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut tables = self.write()?;
        if tables.tags.remove(&id).is_none() {
            return Ok(false);
        }
        tables.posts_tags.retain(|(_, t)| *t != id);
        info!(tag_id = id, "tag deleted");
        Ok(true)
    }
}
