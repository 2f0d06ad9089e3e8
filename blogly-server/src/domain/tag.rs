use serde::{Deserialize, Serialize};

use super::post::Post;

pub const TAG_NAME_MAX_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagDetail {
    pub tag: Tag,
    pub posts: Vec<Post>,
}
