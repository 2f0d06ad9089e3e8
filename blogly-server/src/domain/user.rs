use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";
pub const NAME_MAX_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub image_url: String,
}

impl User {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    pub fn has_name(&self, first_name: &str, last_name: Option<&str>) -> bool {
        self.first_name == first_name && self.last_name.as_deref() == last_name
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub image_url: String,
}

/// Fields to overwrite on an existing user. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(image_url) = self.image_url {
            user.image_url = image_url;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub user: User,
    pub posts: Vec<super::post::Post>,
}
