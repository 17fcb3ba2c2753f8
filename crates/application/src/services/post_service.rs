use std::sync::Arc;

use domain::{
    DomainError, LikeOutcome, LikeRepository, Post, PostId, PostRepository, PostTitle,
    RowCreationResult, User,
};

use crate::error::ApplicationError;

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}

/// 点赞结果。重复点赞不是错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeStatus {
    Liked,
    AlreadyLiked,
}

impl LikeStatus {
    pub fn message(&self) -> &'static str {
        match self {
            LikeStatus::Liked => "OK",
            LikeStatus::AlreadyLiked => "Already liked",
        }
    }
}

/// 取消点赞结果。取消不存在的点赞也不是错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlikeStatus {
    Removed,
    NotFound,
}

impl UnlikeStatus {
    pub fn message(&self) -> &'static str {
        match self {
            UnlikeStatus::Removed => "OK",
            UnlikeStatus::NotFound => "Like not found",
        }
    }
}

pub struct PostServiceDependencies {
    pub post_repository: Arc<dyn PostRepository>,
    pub like_repository: Arc<dyn LikeRepository>,
}

pub struct PostService {
    deps: PostServiceDependencies,
}

impl PostService {
    pub fn new(deps: PostServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create_post(
        &self,
        author: &User,
        request: CreatePostRequest,
    ) -> Result<PostId, ApplicationError> {
        let title = PostTitle::parse(request.title)?;

        match self
            .deps
            .post_repository
            .insert(author.id, title.clone(), request.body)
            .await?
        {
            RowCreationResult::Created(id) => {
                tracing::info!(post_id = %id, author_id = %author.id, "post created");
                Ok(id)
            }
            RowCreationResult::AlreadyExists => {
                Err(DomainError::TitleTaken(title.as_str().to_owned()).into())
            }
            // 作者总是已认证用户，只有在请求期间被删除才会走到这里
            RowCreationResult::MissingReference => {
                Err(DomainError::UserNotFound(author.username.as_str().to_owned()).into())
            }
        }
    }

    /// 单个帖子，点赞数在返回前重新读取一次。
    pub async fn get_post(&self, id: PostId) -> Result<Post, ApplicationError> {
        let mut post = self
            .deps
            .post_repository
            .select(Some(vec![id]))
            .await?
            .into_iter()
            .next()
            .ok_or(DomainError::PostNotFound(id))?;

        post.like_count = self.deps.post_repository.like_count(id).await?;
        Ok(post)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApplicationError> {
        Ok(self.deps.post_repository.select(None).await?)
    }

    pub async fn like_post(
        &self,
        user: &User,
        post_id: PostId,
    ) -> Result<LikeStatus, ApplicationError> {
        match self.deps.like_repository.create(user.id, post_id).await? {
            LikeOutcome::Created => Ok(LikeStatus::Liked),
            LikeOutcome::AlreadyLiked => Ok(LikeStatus::AlreadyLiked),
            LikeOutcome::NoSuchUserOrPost => Err(DomainError::PostNotFound(post_id).into()),
        }
    }

    pub async fn unlike_post(
        &self,
        user: &User,
        post_id: PostId,
    ) -> Result<UnlikeStatus, ApplicationError> {
        let removed = self.deps.like_repository.delete(user.id, post_id).await?;
        Ok(if removed {
            UnlikeStatus::Removed
        } else {
            UnlikeStatus::NotFound
        })
    }
}
