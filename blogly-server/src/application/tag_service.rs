use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{non_blank, required, within_limit};
use crate::data::Repositories;
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::domain::error::DomainError;
use crate::domain::tag::{TAG_NAME_MAX_LEN, Tag, TagDetail};

pub const NAME_REQUIRED: &str = "Please enter a name for the tag";
pub const TAG_EXISTS: &str = "A tag already exists by that name";

#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagRepository>,
    posts: Arc<dyn PostRepository>,
}

impl TagService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            tags: Arc::clone(&repos.tags),
            posts: Arc::clone(&repos.posts),
        }
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        self.tags.list().await
    }

    pub async fn get_tag(&self, id: i32) -> Result<Tag, DomainError> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TagNotFound(id))
    }

    pub async fn get_tag_detail(&self, id: i32) -> Result<TagDetail, DomainError> {
        let tag = self.get_tag(id).await?;
        let posts = self.posts.list_by_tag(id).await?;
        Ok(TagDetail { tag, posts })
    }

    #[instrument(skip(self))]
    pub async fn create_tag(&self, name: &str) -> Result<Tag, DomainError> {
        let name = required(name, NAME_REQUIRED)?;
        within_limit(&name, TAG_NAME_MAX_LEN, "Tag name")?;

        if self.tags.find_by_name(&name).await?.is_some() {
            info!(name = %name, "duplicate tag rejected");
            return Err(DomainError::invalid(TAG_EXISTS));
        }

        self.tags.create(name).await
    }

    /// A blank name keeps the stored one. No duplicate check is made.
    #[instrument(skip(self))]
    pub async fn update_tag(&self, id: i32, name: Option<&str>) -> Result<Tag, DomainError> {
        let name = non_blank(name);
        if let Some(name) = name.as_deref() {
            within_limit(name, TAG_NAME_MAX_LEN, "Tag name")?;
        }

        self.tags
            .update(id, name)
            .await?
            .ok_or(DomainError::TagNotFound(id))
    }

    /// Detaches the tag from its posts and removes it. Unknown ids are a no-op.
    #[instrument(skip(self))]
    pub async fn delete_tag(&self, id: i32) -> Result<(), DomainError> {
        if !self.tags.delete(id).await? {
            info!(tag_id = id, "delete of unknown tag ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::NewPost;
    use crate::domain::user::NewUser;

    fn service() -> (TagService, Repositories) {
        let repos = Repositories::in_memory();
        (TagService::new(&repos), repos)
    }

    #[tokio::test]
    async fn tags_are_listed_by_name() {
        let (tags, _) = service();
        for name in ["zope", "fun", "even more", "bloop"] {
            tags.create_tag(name).await.unwrap();
        }
        let names: Vec<String> = tags
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["bloop", "even more", "fun", "zope"]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (tags, _) = service();
        let err = tags.create_tag("").await.unwrap_err();
        assert_eq!(err.notice(), Some(NAME_REQUIRED));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_case_sensitively() {
        let (tags, _) = service();
        tags.create_tag("fun").await.unwrap();

        let err = tags.create_tag("fun").await.unwrap_err();
        assert_eq!(err.notice(), Some(TAG_EXISTS));

        tags.create_tag("Fun").await.unwrap();
        assert_eq!(tags.list_tags().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn overlong_name_is_rejected() {
        let (tags, _) = service();
        let err = tags.create_tag(&"t".repeat(31)).await.unwrap_err();
        assert_eq!(err.notice(), Some("Tag name must be at most 30 characters"));
    }

    #[tokio::test]
    async fn update_with_blank_name_keeps_it() {
        let (tags, _) = service();
        let tag = tags.create_tag("fun").await.unwrap();

        assert_eq!(tags.update_tag(tag.id, Some(" ")).await.unwrap().name, "fun");
        assert_eq!(tags.update_tag(tag.id, Some("funner")).await.unwrap().name, "funner");
    }

    #[tokio::test]
    async fn delete_detaches_posts_but_keeps_them() {
        let (tags, repos) = service();
        let user = repos
            .users
            .create(NewUser {
                first_name: "Ribbot".into(),
                last_name: None,
                image_url: "x".into(),
            })
            .await
            .unwrap();
        let tag = tags.create_tag("fun").await.unwrap();
        let post = repos
            .posts
            .create(NewPost::new(user.id, "t".into(), "c".into()), &[tag.id])
            .await
            .unwrap();

        tags.delete_tag(tag.id).await.unwrap();

        assert!(matches!(
            tags.get_tag(tag.id).await,
            Err(DomainError::TagNotFound(_))
        ));
        assert!(repos.posts.find_by_id(post.id).await.unwrap().is_some());
        assert!(repos.tags.list_by_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_lists_tagged_posts() {
        let (tags, repos) = service();
        let user = repos
            .users
            .create(NewUser {
                first_name: "Ribbot".into(),
                last_name: None,
                image_url: "x".into(),
            })
            .await
            .unwrap();
        let tag = tags.create_tag("fun").await.unwrap();
        let tagged = repos
            .posts
            .create(NewPost::new(user.id, "tagged".into(), "c".into()), &[tag.id])
            .await
            .unwrap();
        repos
            .posts
            .create(NewPost::new(user.id, "plain".into(), "c".into()), &[])
            .await
            .unwrap();

        let detail = tags.get_tag_detail(tag.id).await.unwrap();
        assert_eq!(detail.posts, vec![tagged]);
    }
}
