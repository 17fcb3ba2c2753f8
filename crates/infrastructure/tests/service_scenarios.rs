use std::sync::{Arc, Mutex};

use application::{
    ApplicationError, AuthFailure, Clock, CreatePostRequest, LikeStatus, LoginRequest,
    SignupRequest, UnlikeStatus,
};
use chrono::{NaiveDate, NaiveDateTime};
use config::AppConfig;
use domain::{DomainError, PostId, Timestamp};
use infrastructure::Infrastructure;

struct ManualClock(Mutex<NaiveDateTime>);

impl ManualClock {
    fn new(at: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(at)))
    }

    fn set(&self, at: NaiveDateTime) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret-with-enough-length".to_string();
    config.auth.bcrypt_cost = Some(4);
    config
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn signup(username: &str, password: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn alice_posts_likes_and_unlikes() {
    let infra = Infrastructure::in_memory(&test_config());
    let users = infra.user_service();
    let posts = infra.post_service();

    users.signup(signup("alice", "pw1")).await.unwrap();
    let token = users.login(login("alice", "pw1")).await.unwrap();
    assert_eq!(token.token_type, "bearer");

    let alice = users.current_user(&token.access_token).await.unwrap();
    assert_eq!(alice.username.as_str(), "alice");
    assert!(alice.last_login.is_some());

    let id = posts
        .create_post(
            &alice,
            CreatePostRequest {
                title: "T".to_string(),
                body: "B".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(posts.like_post(&alice, id).await.unwrap(), LikeStatus::Liked);
    assert_eq!(posts.get_post(id).await.unwrap().like_count, 1);
    assert_eq!(
        posts.like_post(&alice, id).await.unwrap().message(),
        "Already liked"
    );

    assert_eq!(
        posts.unlike_post(&alice, id).await.unwrap(),
        UnlikeStatus::Removed
    );
    assert_eq!(posts.get_post(id).await.unwrap().like_count, 0);
    assert_eq!(
        posts.unlike_post(&alice, id).await.unwrap().message(),
        "Like not found"
    );
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let infra = Infrastructure::in_memory(&test_config());
    let users = infra.user_service();
    users.signup(signup("alice", "pw1")).await.unwrap();

    for attempt in [login("alice", "pw2"), login("nobody", "pw1")] {
        let err = users.login(attempt).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Authentication(AuthFailure::IncorrectCredentials)
        ));
    }
}

#[tokio::test]
async fn concurrent_identical_signups_create_one_user() {
    let infra = Infrastructure::in_memory(&test_config());
    let users = Arc::new(infra.user_service());

    let attempts = (0..8).map(|_| {
        let users = users.clone();
        tokio::spawn(async move { users.signup(signup("bob", "pw")).await })
    });
    let results = futures::future::join_all(attempts).await;

    let mut created = 0;
    let mut taken = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => created += 1,
            Err(ApplicationError::Domain(DomainError::UsernameTaken(_))) => taken += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(taken, 7);
    assert_eq!(users.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_likes_by_one_user_count_once() {
    let infra = Infrastructure::in_memory(&test_config());
    let users = infra.user_service();
    let posts = Arc::new(infra.post_service());

    let erin = users.signup(signup("erin", "pw")).await.unwrap();
    let id = posts
        .create_post(
            &erin,
            CreatePostRequest {
                title: "popular".to_string(),
                body: String::new(),
            },
        )
        .await
        .unwrap();

    let attempts = (0..8).map(|_| {
        let posts = posts.clone();
        let erin = erin.clone();
        tokio::spawn(async move { posts.like_post(&erin, id).await })
    });
    let results = futures::future::join_all(attempts).await;

    let mut liked = 0;
    let mut already = 0;
    for result in results {
        match result.unwrap().unwrap() {
            LikeStatus::Liked => liked += 1,
            LikeStatus::AlreadyLiked => already += 1,
        }
    }
    assert_eq!(liked, 1);
    assert_eq!(already, 7);
    assert_eq!(posts.get_post(id).await.unwrap().like_count, 1);
}

#[tokio::test]
async fn reserved_and_duplicate_names_are_rejected() {
    let infra = Infrastructure::in_memory(&test_config());
    let users = infra.user_service();

    assert!(matches!(
        users.signup(signup("me", "pw")).await,
        Err(ApplicationError::Domain(DomainError::ReservedUsername(_)))
    ));

    users.signup(signup("carol", "pw")).await.unwrap();
    assert!(matches!(
        users.signup(signup("carol", "other")).await,
        Err(ApplicationError::Domain(DomainError::UsernameTaken(_)))
    ));
}

#[tokio::test]
async fn empty_store_lists_nothing_and_missing_post_is_not_found() {
    let infra = Infrastructure::in_memory(&test_config());
    let users = infra.user_service();
    let posts = infra.post_service();

    assert!(posts.list_posts().await.unwrap().is_empty());

    let dave = users.signup(signup("dave", "pw")).await.unwrap();
    assert!(matches!(
        posts.like_post(&dave, PostId(404)).await,
        Err(ApplicationError::Domain(DomainError::PostNotFound(PostId(404))))
    ));
    assert!(matches!(
        posts.get_post(PostId(404)).await,
        Err(ApplicationError::Domain(DomainError::PostNotFound(_)))
    ));
}

#[tokio::test]
async fn analytics_cover_every_day_in_range() {
    let clock = ManualClock::new(noon(2023, 1, 1));
    let infra = Infrastructure::in_memory_with_clock(&test_config(), clock.clone());
    let users = infra.user_service();
    let posts = infra.post_service();
    let analytics = infra.analytics_service();

    let alice = users.signup(signup("alice", "pw")).await.unwrap();
    let bob = users.signup(signup("bob", "pw")).await.unwrap();
    let post = posts
        .create_post(
            &alice,
            CreatePostRequest {
                title: "hello".to_string(),
                body: String::new(),
            },
        )
        .await
        .unwrap();

    posts.like_post(&alice, post).await.unwrap();
    clock.set(noon(2023, 1, 3));
    posts.like_post(&bob, post).await.unwrap();

    let from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
    let stats = analytics.like_analytics(from, to).await.unwrap();
    assert_eq!(stats.day_count(), 3);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "2023-01-01": { post.to_string(): 1, "total": 1 },
            "2023-01-02": { "total": 0 },
            "2023-01-03": { post.to_string(): 1, "total": 1 },
        })
    );

    let quiet = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let single = analytics.like_analytics(quiet, quiet).await.unwrap();
    assert_eq!(
        serde_json::to_value(&single).unwrap(),
        serde_json::json!({ "2023-01-02": { "total": 0 } })
    );

    assert!(matches!(
        analytics.like_analytics(to, from).await,
        Err(ApplicationError::Domain(DomainError::InvalidDateRange { .. }))
    ));
}
