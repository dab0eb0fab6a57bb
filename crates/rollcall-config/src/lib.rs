//! # Rollcall Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and validity window
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP settings for password-reset codes
//! - [`rate_limit`]: request budgets for public auth endpoints
//! - [`server`]: bind address and storage backend selection
//!
//! # Example
//!
//! ```ignore
//! use rollcall_config::{JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server = ServerConfig::from_env();
//! println!("listening on {}", server.bind_address());
//! ```

pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads and parses an environment variable, falling back to `default` when
/// it is unset or unparseable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
