use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostSummary};
use crate::domain::user::User;

// ======================= USERS =======================

/// Fields missing from the submission deserialize as blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

// ======================= POSTS =======================

#[derive(Debug, Default, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub tag_ids: Vec<i32>,
}

impl PostForm {
    /// Decodes an urlencoded body where `tag_ids` may repeat.
    pub fn parse(body: &[u8]) -> Result<Self, DomainError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| DomainError::MalformedForm(e.to_string()))?;

        let mut form = PostForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => form.title = value,
                "content" => form.content = value,
                "tag_ids" => {
                    let id = value.trim().parse().map_err(|_| {
                        DomainError::MalformedForm(format!("invalid tag id: {}", value))
                    })?;
                    form.tag_ids.push(id);
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

#[derive(Debug, Serialize)]
pub struct PostCard<'a> {
    pub post: &'a Post,
    pub user: &'a User,
    pub created: String,
}

impl<'a> From<&'a PostSummary> for PostCard<'a> {
    fn from(summary: &'a PostSummary) -> Self {
        Self {
            post: &summary.post,
            user: &summary.user,
            created: summary.post.display_created_at(),
        }
    }
}

// ======================= TAGS =======================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagForm {
    pub name: String,
}
