use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::error::AppError;
use crate::repository::{
    postgres, InMemoryTaskRepository, InMemoryUserRepository, PgTaskRepository, PgUserRepository,
    TaskRepository, UserRepository,
};

/// Shared handles injected into every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub tokens: TokenService,
}

impl AppState {
    /// Builds the state from a loaded config, connecting to Postgres when a
    /// database URL is configured.
    pub async fn init(config: &Config) -> Result<Self, AppError> {
        let tokens = TokenService::new(&config.jwt_secret);

        match &config.database_url {
            Some(url) => {
                let pool = postgres::connect(url, config.storage_timeout).await?;
                postgres::run_migrations(&pool).await?;
                log::info!("Using PostgreSQL task store");
                Ok(Self::from_parts(
                    Arc::new(PgUserRepository::new(pool.clone(), config.storage_timeout)),
                    Arc::new(PgTaskRepository::new(pool, config.storage_timeout)),
                    tokens,
                ))
            }
            None => {
                log::warn!("DATABASE_URL not set; tasks are kept in memory and lost on restart");
                Ok(Self::in_memory(tokens))
            }
        }
    }

    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens,
        }
    }

    pub fn in_memory(tokens: TokenService) -> Self {
        Self::from_parts(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
            tokens,
        )
    }
}
