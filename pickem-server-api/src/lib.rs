mod error;
pub mod http;
mod jwt;

pub use error::ApiError;
pub use jwt::JwtServiceImpl;
