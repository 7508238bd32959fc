use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

use crate::auth::{Credentials, PasswordHasher, TokenService};
use crate::config::Config;
use crate::routes::tasks::service::TaskService;
use crate::store::{MemoryStore, TaskStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub credentials: Credentials,
    pub tokens: TokenService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(
        config: &Config,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let hasher = PasswordHasher::new(config.password_hash)?;
        let ttl = Duration::try_seconds(config.token_ttl_secs)
            .context("TOKEN_TTL_SECS is out of range")?;

        Ok(Self {
            credentials: Credentials::new(users, hasher),
            tokens: TokenService::new(config.jwt_secret.as_bytes(), ttl),
            tasks: TaskService::new(tasks),
        })
    }

    pub fn in_memory(config: &Config) -> anyhow::Result<Self> {
        let store = MemoryStore::new();
        Self::new(config, Arc::new(store.clone()), Arc::new(store))
    }
}
