use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::domain::notification::mailer::Mailer;
use crate::utils::action_token::ActionTokenSigner;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub mailer: Arc<dyn Mailer>,
    pub action_tokens: ActionTokenSigner,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let action_tokens =
            ActionTokenSigner::new(&config.action_token_secret, config.action_token_ttl);
        Self {
            db,
            config,
            mailer,
            action_tokens,
        }
    }
}
