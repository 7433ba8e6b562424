use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::info;
use rustrict::CensorStr;

use crate::{ServiceError, ServiceResult, jwt::ArcJwtService, util::validate_email};

pub type UserId = i64;
pub type Username = String;

const NON_UNIQUE_USERNAME: &str =
    "Username already exists. Please try again with a different one";
const NON_UNIQUE_EMAIL: &str = "Email already exists. Please try again with a different one";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewUser {
    pub username: Username,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub type ArcUserRepository = Arc<Box<dyn UserRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>>;
    async fn get_user_by_name(&self, name: &str) -> ServiceResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>>;
    async fn create_user(&self, user: &NewUser) -> ServiceResult<UserId>;
    async fn get_users(&self) -> ServiceResult<Vec<User>>;
    async fn get_usernames(&self) -> ServiceResult<Vec<Username>>;
}

pub type ArcUserService = Arc<Box<dyn UserService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserService {
    async fn load_taken_usernames(&self) -> ServiceResult<()>;
    async fn register(&self, username: &Username, email: &str, password: &str)
    -> ServiceResult<UserId>;
    async fn try_login(&self, username: &Username, password: &str) -> ServiceResult<Username>;
    async fn try_login_jwt(&self, token: &str) -> ServiceResult<Username>;
    async fn fetch_user(&self, username: &str) -> ServiceResult<User>;
}

pub struct UserServiceImpl {
    jwt_service: ArcJwtService,
    user_repository: ArcUserRepository,
    user_cache: Arc<moka::sync::Cache<Username, User>>,
    taken_usernames: Arc<DashMap<Username, ()>>,
}

impl UserServiceImpl {
    pub fn new(jwt_service: ArcJwtService, user_repository: ArcUserRepository) -> Self {
        Self {
            jwt_service,
            user_repository,
            user_cache: Arc::new(moka::sync::Cache::builder().max_capacity(1000).build()),
            taken_usernames: Arc::new(DashMap::new()),
        }
    }

    fn validate_username(username: &Username) -> ServiceResult<()> {
        if username.len() < 3 || username.len() > 20 {
            return ServiceError::bad_request("Username must be between 3 and 20 characters");
        }
        if username
            .chars()
            .next()
            .is_none_or(|c| !c.is_ascii_alphabetic())
        {
            return ServiceError::bad_request("Username must start with a letter");
        }
        if username
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && c != '_')
        {
            return ServiceError::bad_request("Username must be alphanumeric");
        }
        if username.is_inappropriate() {
            return ServiceError::bad_request("Username contains inappropriate content");
        }
        Ok(())
    }

    fn try_take_username(&self, username: &Username) -> ServiceResult<()> {
        if self.taken_usernames.contains_key(username) {
            return ServiceError::not_possible(NON_UNIQUE_USERNAME);
        }
        self.taken_usernames.insert(username.clone(), ());
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserService for UserServiceImpl {
    async fn load_taken_usernames(&self) -> ServiceResult<()> {
        let usernames = self.user_repository.get_usernames().await?;
        for username in usernames {
            self.taken_usernames.insert(username, ());
        }
        Ok(())
    }

    async fn register(
        &self,
        username: &Username,
        email: &str,
        password: &str,
    ) -> ServiceResult<UserId> {
        Self::validate_username(username)?;
        let email = validate_email(email)?;

        if self.taken_usernames.contains_key(username) {
            return ServiceError::not_possible(NON_UNIQUE_USERNAME);
        }
        if self.user_repository.get_user_by_email(&email).await?.is_some() {
            return ServiceError::not_possible(NON_UNIQUE_EMAIL);
        }
        self.try_take_username(username)?;

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))?;
        let id = self
            .user_repository
            .create_user(&NewUser {
                username: username.clone(),
                email,
                password_hash,
                created_at: Utc::now(),
            })
            .await?;
        info!("Registered user {} with id {}", username, id);
        Ok(id)
    }

    async fn try_login(&self, username: &Username, password: &str) -> ServiceResult<Username> {
        let user = match self.fetch_user(username).await {
            Ok(user) => user,
            Err(ServiceError::NotFound(_)) => {
                return ServiceError::unauthorized(INVALID_CREDENTIALS);
            }
            Err(e) => return Err(e),
        };
        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(format!("Failed to verify password: {}", e)))?;
        info!(
            "Login attempt for user {}: {}",
            username,
            if valid { "success" } else { "failure" }
        );
        if !valid {
            return ServiceError::unauthorized(INVALID_CREDENTIALS);
        }
        Ok(user.username)
    }

    async fn try_login_jwt(&self, token: &str) -> ServiceResult<Username> {
        let username = self.jwt_service.validate_jwt(token)?;
        self.fetch_user(&username).await?;
        Ok(username)
    }

    async fn fetch_user(&self, username: &str) -> ServiceResult<User> {
        let username = username.to_string();
        if let Some(user) = self.user_cache.get(&username) {
            return Ok(user);
        }
        let user = self.user_repository.get_user_by_name(&username).await?;
        match user {
            Some(user) => {
                self.user_cache.insert(username, user.clone());
                Ok(user)
            }
            None => ServiceError::not_found("User not found"),
        }
    }
}

#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<std::sync::Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn with_users(usernames: &[&str]) -> Self {
        let repo = Self::default();
        let mut users = repo.users.lock().expect("Failed to lock mock users");
        for (i, name) in usernames.iter().enumerate() {
            users.push(User {
                id: i as UserId + 1,
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: String::new(),
                created_at: DateTime::UNIX_EPOCH,
            });
        }
        drop(users);
        repo
    }
}

#[async_trait::async_trait]
impl UserRepository for MockUserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let users = self.users.lock().expect("Failed to lock mock users");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_name(&self, name: &str) -> ServiceResult<Option<User>> {
        let users = self.users.lock().expect("Failed to lock mock users");
        Ok(users.iter().find(|u| u.username == name).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let users = self.users.lock().expect("Failed to lock mock users");
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> ServiceResult<UserId> {
        let mut users = self.users.lock().expect("Failed to lock mock users");
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
        });
        Ok(id)
    }

    async fn get_users(&self) -> ServiceResult<Vec<User>> {
        let users = self.users.lock().expect("Failed to lock mock users");
        Ok(users.clone())
    }

    async fn get_usernames(&self) -> ServiceResult<Vec<Username>> {
        let users = self.users.lock().expect("Failed to lock mock users");
        Ok(users.iter().map(|u| u.username.clone()).collect())
    }
}
