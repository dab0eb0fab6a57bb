use std::fmt;
use std::sync::Arc;

use rollcall_config::{CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, ServerConfig};
use rollcall_db::{MemoryStore, PgStore, Store, StoreError};
use tracing::{info, warn};

use crate::middleware::rate_limit::{AuthRateLimiter, auth_rate_limiter};
use crate::utils::email::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub auth_limiter: Arc<AuthRateLimiter>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        jwt_config: JwtConfig,
        email_config: EmailConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Self {
        let auth_limiter = Arc::new(auth_rate_limiter(&rate_limit_config));
        Self {
            store,
            jwt_config,
            email_config,
            cors_config,
            rate_limit_config,
            auth_limiter,
        }
    }

    pub fn email_service(&self) -> EmailService {
        EmailService::new(self.email_config.clone())
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend_name())
            .field("email_enabled", &self.email_config.enabled)
            .field("rate_limit_config", &self.rate_limit_config)
            .finish_non_exhaustive()
    }
}

/// Builds state from the environment. Without `DATABASE_URL` the API runs on
/// the in-memory store.
pub async fn init_app_state(server: &ServerConfig) -> Result<AppState, StoreError> {
    let store: Arc<dyn Store> = match &server.database_url {
        Some(url) => {
            let pg = PgStore::connect(url).await?;
            pg.migrate().await?;
            info!("Connected to PostgreSQL and applied migrations");
            Arc::new(pg)
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(AppState::new(
        store,
        JwtConfig::from_env(),
        EmailConfig::from_env(),
        CorsConfig::from_env(),
        RateLimitConfig::from_env(),
    ))
}
