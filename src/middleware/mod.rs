pub mod auth;
pub mod rate_limit;

pub use auth::{AuthenticatedUser, jwt_auth_middleware};
pub use rate_limit::{RateLimiter, ip_rate_limit_middleware, user_rate_limit_middleware};
