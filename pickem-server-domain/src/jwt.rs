use std::sync::Arc;

use crate::{ServiceError, ServiceResult, user::Username};

pub type ArcJwtService = Arc<Box<dyn JwtService + Send + Sync>>;

pub trait JwtService {
    fn generate_jwt(&self, username: &Username) -> String;
    fn validate_jwt(&self, token: &str) -> ServiceResult<Username>;
}

/// Treats the token as the username itself. Test use only.
#[derive(Default, Clone)]
pub struct MockJwtService;

impl JwtService for MockJwtService {
    fn generate_jwt(&self, username: &Username) -> String {
        username.clone()
    }

    fn validate_jwt(&self, token: &str) -> ServiceResult<Username> {
        if token.is_empty() {
            return Err(ServiceError::Unauthorized("Invalid token".to_string()));
        }
        Ok(token.to_string())
    }
}
