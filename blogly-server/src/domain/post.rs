use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tag::Tag;
use super::user::User;

pub const TITLE_MAX_LEN: usize = 50;

const DISPLAY_FORMAT: &str = "%a %b %-d %Y, %-I:%M %p";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i32,
}

impl Post {
    pub fn display_created_at(&self) -> String {
        self.created_at.format(DISPLAY_FORMAT).to_string()
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(user_id: i32, title: String, content: String) -> Self {
        Self {
            user_id,
            title,
            content,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostChanges {
    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub user: User,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub post: Post,
    pub user: User,
}
