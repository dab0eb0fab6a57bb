//! Rate limiting configuration for the public authentication endpoints.
//!
//! Login, password-reset and bootstrap registration are reachable without a
//! token, so each client IP gets its own token bucket:
//!
//! - `RATE_LIMIT_ENABLED`: turn limiting on or off (default: on)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: bucket replenishment rate (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket capacity (default: 5)
//! - `RATE_LIMIT_TRUST_PROXY`: key on the first `X-Forwarded-For` hop instead
//!   of the socket peer (default: off). Only enable behind a reverse proxy that
//!   overwrites the header.

use std::num::NonZeroU32;

use governor::Quota;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests per second replenished for each client.
    pub auth_per_second: u32,
    /// Maximum requests a client may burst before being throttled.
    pub auth_burst_size: u32,
    /// Whether `X-Forwarded-For` identifies the client.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_second: 10,
            auth_burst_size: 5,
            trust_proxy: false,
        }
    }
}

impl RateLimitConfig {
    /// A configuration that never throttles.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
            trust_proxy: env_or("RATE_LIMIT_TRUST_PROXY", defaults.trust_proxy),
        }
    }

    /// Quota for auth endpoints. Zero values are clamped to one.
    #[must_use]
    pub fn auth_quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.auth_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.auth_burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_disabled_keeps_limits() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_zero_burst_is_clamped() {
        let config = RateLimitConfig {
            enabled: true,
            auth_per_second: 0,
            auth_burst_size: 0,
            trust_proxy: false,
        };
        assert_eq!(config.auth_quota().burst_size().get(), 1);
    }
}
