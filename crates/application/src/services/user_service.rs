use std::sync::Arc;

use chrono::Duration;
use domain::{
    ensure_not_reserved, DomainError, RepositoryError, RowCreationResult, User, UserRepository,
    Username,
};

use crate::{
    error::{ApplicationError, AuthFailure},
    password::PasswordHasher,
    session::SessionTracker,
    token::TokenService,
};

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录成功后签发的 bearer 令牌。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
    pub session_tracker: SessionTracker,
    pub access_token_lifetime: Duration,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    /// 注册。用户名是否已存在由存储层的唯一约束判定。
    pub async fn signup(&self, request: SignupRequest) -> Result<User, ApplicationError> {
        let username = Username::parse(request.username)?;
        ensure_not_reserved(&username)?;

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;

        match self
            .deps
            .user_repository
            .insert(username.clone(), password_hash)
            .await?
        {
            RowCreationResult::Created(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "user signed up");
                Ok(user)
            }
            RowCreationResult::AlreadyExists => {
                Err(DomainError::UsernameTaken(username.as_str().to_owned()).into())
            }
            RowCreationResult::MissingReference => Err(RepositoryError::storage(
                "app_user insert reported a foreign key violation",
            )
            .into()),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApplicationError> {
        Ok(self.deps.user_repository.list().await?)
    }

    pub async fn get_user(&self, username: &str) -> Result<User, ApplicationError> {
        let not_found = || DomainError::UserNotFound(username.to_owned());
        let parsed = Username::parse(username).map_err(|_| not_found())?;
        self.deps
            .user_repository
            .find_by_username(parsed)
            .await?
            .map(|credentials| credentials.user)
            .ok_or_else(|| not_found().into())
    }

    /// 用户名密码换取访问令牌，并记录最近登录时间。
    pub async fn login(&self, request: LoginRequest) -> Result<AccessToken, ApplicationError> {
        let rejected = || ApplicationError::Authentication(AuthFailure::IncorrectCredentials);

        let username = Username::parse(request.username).map_err(|_| rejected())?;
        let credentials = self
            .deps
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or_else(rejected)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &credentials.password_hash)
            .await?;
        if !password_ok {
            tracing::debug!(username = %credentials.user.username, "password mismatch");
            return Err(rejected());
        }

        self.deps
            .session_tracker
            .record_login(credentials.user.id)
            .await;

        let access_token = self.deps.token_service.create_access_token(
            &credentials.user.username,
            self.deps.access_token_lifetime,
        )?;

        Ok(AccessToken {
            access_token,
            token_type: "bearer",
        })
    }

    /// 解析 bearer 令牌得到当前用户，并记录最近访问时间。
    pub async fn current_user(&self, token: &str) -> Result<User, ApplicationError> {
        let username = self.deps.token_service.validate(token)?;
        let credentials = self
            .deps
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or(ApplicationError::Authentication(
                AuthFailure::CouldNotValidate,
            ))?;

        self.deps
            .session_tracker
            .record_visit(credentials.user.id)
            .await;

        Ok(credentials.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::SystemClock,
        password::PasswordHasherError,
        token::TokenError,
    };
    use async_trait::async_trait;
    use domain::{MockUserRepository, PasswordHash, UserCredentials, UserId};

    /// 明文比对的哈希器，只用于测试。
    struct PlainHasher;

    #[async_trait]
    impl PasswordHasher for PlainHasher {
        async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
            PasswordHash::new(format!("plain:{plaintext}"))
                .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
        }

        async fn verify(
            &self,
            plaintext: &str,
            hashed: &PasswordHash,
        ) -> Result<bool, PasswordHasherError> {
            Ok(hashed.as_str() == format!("plain:{plaintext}"))
        }
    }

    /// 令牌就是用户名本身。
    struct EchoTokens;

    impl TokenService for EchoTokens {
        fn create_access_token(
            &self,
            subject: &Username,
            _expires_in: Duration,
        ) -> Result<String, TokenError> {
            Ok(subject.as_str().to_owned())
        }

        fn validate(&self, token: &str) -> Result<Username, TokenError> {
            match token {
                "expired" => Err(TokenError::Expired),
                "" => Err(TokenError::Invalid),
                other => Username::parse(other).map_err(|_| TokenError::Invalid),
            }
        }
    }

    fn alice() -> UserCredentials {
        UserCredentials {
            user: User::registered(UserId(1), Username::parse("alice").unwrap()),
            password_hash: PasswordHash::new("plain:pw1").unwrap(),
        }
    }

    fn service(users: MockUserRepository) -> UserService {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        UserService::new(UserServiceDependencies {
            user_repository: users.clone(),
            password_hasher: Arc::new(PlainHasher),
            token_service: Arc::new(EchoTokens),
            session_tracker: SessionTracker::new(users, Arc::new(SystemClock)),
            access_token_lifetime: Duration::minutes(crate::token::DEFAULT_ACCESS_TOKEN_MINUTES),
        })
    }

    #[tokio::test]
    async fn reserved_username_never_reaches_the_store() {
        let mut users = MockUserRepository::new();
        users.expect_insert().never();

        let err = service(users)
            .signup(SignupRequest {
                username: "me".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::ReservedUsername(_))
        ));
    }

    #[tokio::test]
    async fn unique_violation_becomes_username_taken() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .returning(|_, _| Box::pin(async { Ok(RowCreationResult::AlreadyExists) }));

        let err = service(users)
            .signup(SignupRequest {
                username: "alice".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::UsernameTaken(name)) if name == "alice"
        ));
    }

    #[tokio::test]
    async fn login_survives_bookkeeping_failure() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Box::pin(async { Ok(Some(alice())) }));
        users
            .expect_touch_last_login()
            .times(1)
            .returning(|_, _| Box::pin(async { Err(RepositoryError::storage("db down")) }));

        let token = service(users)
            .login(LoginRequest {
                username: "alice".into(),
                password: "pw1".into(),
            })
            .await
            .expect("login still succeeds");

        assert_eq!(token.access_token, "alice");
        assert_eq!(token.token_type, "bearer");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_without_touching_last_login() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Box::pin(async { Ok(Some(alice())) }));
        users.expect_touch_last_login().never();

        let err = service(users)
            .login(LoginRequest {
                username: "alice".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Authentication(AuthFailure::IncorrectCredentials)
        ));
    }

    #[tokio::test]
    async fn expired_token_maps_to_token_expired() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().never();

        let err = service(users).current_user("expired").await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Authentication(AuthFailure::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn token_for_vanished_user_is_rejected() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Box::pin(async { Ok(None) }));
        users.expect_touch_last_visit().never();

        let err = service(users).current_user("ghost").await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Authentication(AuthFailure::CouldNotValidate)
        ));
    }

    #[tokio::test]
    async fn current_user_records_visit() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Box::pin(async { Ok(Some(alice())) }));
        users
            .expect_touch_last_visit()
            .withf(|id, _| *id == UserId(1))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let user = service(users).current_user("alice").await.unwrap();
        assert_eq!(user.username.as_str(), "alice");
    }
}
