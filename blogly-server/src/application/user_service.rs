use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{non_blank, required, within_limit};
use crate::data::Repositories;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{
    NAME_MAX_LEN, NewUser, PLACEHOLDER_IMAGE_URL, User, UserChanges, UserDetail,
};

pub const FIRST_NAME_REQUIRED: &str = "Please enter a first name";
pub const USER_EXISTS: &str = "A user already exists by that name";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl UserService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: Arc::clone(&repos.users),
            posts: Arc::clone(&repos.posts),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list().await
    }

    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    pub async fn get_user_detail(&self, id: i32) -> Result<UserDetail, DomainError> {
        let user = self.get_user(id).await?;
        let posts = self.posts.list_by_user(id).await?;
        Ok(UserDetail { user, posts })
    }

    #[instrument(skip(self))]
    pub async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        image_url: &str,
    ) -> Result<User, DomainError> {
        let first_name = required(first_name, FIRST_NAME_REQUIRED)?;
        let last_name = non_blank(Some(last_name));
        within_limit(&first_name, NAME_MAX_LEN, "First name")?;
        if let Some(last_name) = last_name.as_deref() {
            within_limit(last_name, NAME_MAX_LEN, "Last name")?;
        }

        if self
            .users
            .find_by_name(&first_name, last_name.as_deref())
            .await?
            .is_some()
        {
            info!(first_name = %first_name, "duplicate user rejected");
            return Err(DomainError::invalid(USER_EXISTS));
        }

        let image_url =
            non_blank(Some(image_url)).unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

        self.users
            .create(NewUser {
                first_name,
                last_name,
                image_url,
            })
            .await
    }

    /// Overwrites every non-blank field. The duplicate-name rule is not applied here.
    #[instrument(skip(self))]
    pub async fn update_user(
        &self,
        id: i32,
        first_name: Option<&str>,
        last_name: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<User, DomainError> {
        let changes = UserChanges {
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
            image_url: non_blank(image_url),
        };
        if let Some(first_name) = changes.first_name.as_deref() {
            within_limit(first_name, NAME_MAX_LEN, "First name")?;
        }
        if let Some(last_name) = changes.last_name.as_deref() {
            within_limit(last_name, NAME_MAX_LEN, "Last name")?;
        }

        self.users
            .update(id, changes)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        if !self.users.delete(id).await? {
            info!(user_id = id, "delete of unknown user ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::NewPost;

    fn service() -> (UserService, Repositories) {
        let repos = Repositories::in_memory();
        (UserService::new(&repos), repos)
    }

    #[tokio::test]
    async fn created_user_reads_back() {
        let (users, _) = service();
        let user = users
            .create_user("Ribbot", "the Frog", "https://dodo.ac/ribbot.png")
            .await
            .unwrap();

        let found = users.get_user(user.id).await.unwrap();
        assert_eq!(found.first_name, "Ribbot");
        assert_eq!(found.last_name.as_deref(), Some("the Frog"));
        assert_eq!(found.image_url, "https://dodo.ac/ribbot.png");
    }

    #[tokio::test]
    async fn blank_image_url_gets_placeholder() {
        let (users, _) = service();
        let user = users.create_user("Del", "the Alligator", "  ").await.unwrap();
        assert_eq!(user.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[tokio::test]
    async fn blank_last_name_is_stored_as_absent() {
        let (users, _) = service();
        let user = users.create_user("Sprocket", "", "").await.unwrap();
        assert_eq!(user.last_name, None);
        assert_eq!(user.full_name(), "Sprocket");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_writing() {
        let (users, _) = service();
        users.create_user("Sprocket", "the Ostritch", "").await.unwrap();

        let err = users
            .create_user("Sprocket", "the Ostritch", "https://other.png")
            .await
            .unwrap_err();

        assert_eq!(err.notice(), Some(USER_EXISTS));
        assert_eq!(users.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_first_name_with_other_last_name_is_allowed() {
        let (users, _) = service();
        users.create_user("Sprocket", "the Ostritch", "").await.unwrap();
        users.create_user("Sprocket", "the Second", "").await.unwrap();
        assert_eq!(users.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_first_name_is_rejected() {
        let (users, _) = service();
        let err = users.create_user(" ", "the Frog", "").await.unwrap_err();
        assert_eq!(err.notice(), Some(FIRST_NAME_REQUIRED));
    }

    #[tokio::test]
    async fn overlong_first_name_is_rejected() {
        let (users, _) = service();
        let err = users
            .create_user(&"x".repeat(51), "", "")
            .await
            .unwrap_err();
        assert_eq!(err.notice(), Some("First name must be at most 50 characters"));
    }

    #[tokio::test]
    async fn users_are_listed_by_first_name() {
        let (users, _) = service();
        users.create_user("Sprocket", "the Ostritch", "").await.unwrap();
        users.create_user("Cephalobot", "the Octopus", "").await.unwrap();
        users.create_user("Ribbot", "the Frog", "").await.unwrap();

        let names: Vec<String> = users
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.first_name)
            .collect();
        assert_eq!(names, vec!["Cephalobot", "Ribbot", "Sprocket"]);
    }

    #[tokio::test]
    async fn update_keeps_fields_submitted_blank() {
        let (users, _) = service();
        let user = users
            .create_user("Ribbot", "the Frog", "https://dodo.ac/ribbot.png")
            .await
            .unwrap();

        let updated = users
            .update_user(user.id, Some(""), Some("the Toad"), Some("   "))
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Ribbot");
        assert_eq!(updated.last_name.as_deref(), Some("the Toad"));
        assert_eq!(updated.image_url, "https://dodo.ac/ribbot.png");
    }

    #[tokio::test]
    async fn update_may_create_a_duplicate_name() {
        let (users, _) = service();
        users.create_user("Ribbot", "the Frog", "").await.unwrap();
        let other = users.create_user("Del", "the Alligator", "").await.unwrap();

        let updated = users
            .update_user(other.id, Some("Ribbot"), Some("the Frog"), None)
            .await
            .unwrap();
        assert_eq!(updated.full_name(), "Ribbot the Frog");
    }

    #[tokio::test]
    async fn update_of_unknown_user_is_not_found() {
        let (users, _) = service();
        let err = users.update_user(42, Some("x"), None, None).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(42)));
    }

    #[tokio::test]
    async fn delete_removes_user_and_posts() {
        let (users, repos) = service();
        let user = users.create_user("Ribbot", "the Frog", "").await.unwrap();
        let post = repos
            .posts
            .create(NewPost::new(user.id, "First Post!".into(), "Oh, hai.".into()), &[])
            .await
            .unwrap();

        users.delete_user(user.id).await.unwrap();

        assert!(matches!(
            users.get_user(user.id).await,
            Err(DomainError::UserNotFound(_))
        ));
        assert!(repos.posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_unknown_user_is_a_no_op() {
        let (users, _) = service();
        assert!(users.delete_user(7).await.is_ok());
    }
}
