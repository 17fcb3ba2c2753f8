use domain::{Post, Timestamp, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub last_visit: Option<Timestamp>,
    pub last_login: Option<Timestamp>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into(),
            username: user.username.as_str().to_owned(),
            last_visit: user.last_visit,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub author: UserDto,
    pub like_count: i64,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.into(),
            title: post.title.as_str().to_owned(),
            body: post.body.clone(),
            author: UserDto::from(&post.author),
            like_count: post.like_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupDto {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPostDto {
    pub id: i32,
}
