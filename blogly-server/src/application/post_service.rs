use std::sync::Arc;

use tracing::instrument;

use crate::application::{non_blank, required, within_limit};
use crate::data::Repositories;
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{NewPost, Post, PostChanges, PostDetail, PostSummary, TITLE_MAX_LEN};

pub const TITLE_REQUIRED: &str = "Please enter a title for your post";
pub const CONTENT_REQUIRED: &str = "Please enter the content for your post";

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    tags: Arc<dyn TagRepository>,
}

impl PostService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            posts: Arc::clone(&repos.posts),
            users: Arc::clone(&repos.users),
            tags: Arc::clone(&repos.tags),
        }
    }

    pub async fn get_post(&self, id: i32) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn get_post_detail(&self, id: i32) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        let user = self
            .users
            .find_by_id(post.user_id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("post {} has no author", id)))?;
        let tags = self.tags.list_by_post(id).await?;
        Ok(PostDetail { post, user, tags })
    }

    pub async fn recent_posts(&self, limit: i64) -> Result<Vec<PostSummary>, DomainError> {
        let posts = self.posts.recent(limit).await?;
        let mut summaries = Vec::with_capacity(posts.len());
        for post in posts {
            if let Some(user) = self.users.find_by_id(post.user_id).await? {
                summaries.push(PostSummary { post, user });
            }
        }
        Ok(summaries)
    }

    /// The title is checked before the content; a blank title alone decides the notice.
    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        user_id: i32,
        title: &str,
        content: &str,
        tag_ids: &[i32],
    ) -> Result<Post, DomainError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(user_id));
        }

        let title = required(title, TITLE_REQUIRED)?;
        let content = required(content, CONTENT_REQUIRED)?;
        within_limit(&title, TITLE_MAX_LEN, "Title")?;

        self.posts
            .create(NewPost::new(user_id, title, content), tag_ids)
            .await
    }

    /// Blank fields keep their stored value. `tag_ids` are added to the post's
    /// current tags; tags not submitted are left attached.
    #[instrument(skip(self, content))]
    pub async fn update_post(
        &self,
        id: i32,
        title: Option<&str>,
        content: Option<&str>,
        tag_ids: &[i32],
    ) -> Result<Post, DomainError> {
        let changes = PostChanges {
            title: non_blank(title),
            content: non_blank(content),
        };
        if let Some(title) = changes.title.as_deref() {
            within_limit(title, TITLE_MAX_LEN, "Title")?;
        }

        self.posts
            .update(id, changes, tag_ids)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: i32) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        self.posts.delete(id).await?;
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::NewUser;

    struct Fixture {
        posts: PostService,
        repos: Repositories,
        user_id: i32,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let user = repos
            .users
            .create(NewUser {
                first_name: "Ribbot".into(),
                last_name: Some("the Frog".into()),
                image_url: "https://dodo.ac/ribbot.png".into(),
            })
            .await
            .unwrap();
        Fixture {
            posts: PostService::new(&repos),
            repos,
            user_id: user.id,
        }
    }

    #[tokio::test]
    async fn created_post_is_stamped_and_tagged() {
        let f = fixture().await;
        let fun = f.repos.tags.create("fun".into()).await.unwrap();
        let zope = f.repos.tags.create("zope".into()).await.unwrap();

        let post = f
            .posts
            .create_post(f.user_id, "First Post!", "Oh, hai.", &[zope.id, fun.id])
            .await
            .unwrap();

        let detail = f.posts.get_post_detail(post.id).await.unwrap();
        assert_eq!(detail.post.content, "Oh, hai.");
        assert_eq!(detail.user.full_name(), "Ribbot the Frog");
        let names: Vec<&str> = detail.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["fun", "zope"]);
        assert!(detail.post.created_at <= chrono::Utc::now());
    }

    #[tokio::test]
    async fn blank_title_is_reported_before_blank_content() {
        let f = fixture().await;
        let err = f.posts.create_post(f.user_id, "", "", &[]).await.unwrap_err();
        assert_eq!(err.notice(), Some(TITLE_REQUIRED));
        assert!(f.repos.posts.list_by_user(f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let f = fixture().await;
        let err = f
            .posts
            .create_post(f.user_id, "First Post!", "  ", &[])
            .await
            .unwrap_err();
        assert_eq!(err.notice(), Some(CONTENT_REQUIRED));
        assert!(f.repos.posts.list_by_user(f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_for_unknown_user_is_not_found() {
        let f = fixture().await;
        let err = f.posts.create_post(99, "t", "c", &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(99)));
    }

    #[tokio::test]
    async fn update_keeps_blank_fields_and_adds_tags() {
        let f = fixture().await;
        let fun = f.repos.tags.create("fun".into()).await.unwrap();
        let bloop = f.repos.tags.create("bloop".into()).await.unwrap();
        let post = f
            .posts
            .create_post(f.user_id, "First Post!", "Oh, hai.", &[fun.id])
            .await
            .unwrap();

        let updated = f
            .posts
            .update_post(post.id, Some(""), Some("Oh, bye."), &[bloop.id])
            .await
            .unwrap();

        assert_eq!(updated.title, "First Post!");
        assert_eq!(updated.content, "Oh, bye.");
        assert_eq!(updated.created_at, post.created_at);
        let tags = f.repos.tags.list_by_post(post.id).await.unwrap();
        assert_eq!(tags, vec![bloop, fun]);
    }

    #[tokio::test]
    async fn delete_returns_post_and_keeps_tags() {
        let f = fixture().await;
        let fun = f.repos.tags.create("fun".into()).await.unwrap();
        let post = f
            .posts
            .create_post(f.user_id, "First Post!", "Oh, hai.", &[fun.id])
            .await
            .unwrap();

        let deleted = f.posts.delete_post(post.id).await.unwrap();

        assert_eq!(deleted.user_id, f.user_id);
        assert!(matches!(
            f.posts.get_post(post.id).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert!(f.repos.posts.list_by_tag(fun.id).await.unwrap().is_empty());
        assert!(f.repos.tags.find_by_id(fun.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn recent_posts_are_newest_first() {
        let f = fixture().await;
        for title in ["one", "two", "three"] {
            f.posts.create_post(f.user_id, title, "body", &[]).await.unwrap();
        }

        let recent = f.posts.recent_posts(2).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|s| s.post.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);
    }
}
