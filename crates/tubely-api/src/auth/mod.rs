//! Bearer token authentication

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtKeys;
pub use middleware::auth_middleware;
pub use models::{JwtClaims, UserContext};
