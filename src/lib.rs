pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use std::sync::Arc;

use crate::{adapters::signature::WebhookVerifier, domain::notify::SignupNotifier};

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub verifier: WebhookVerifier,
    pub notifier: Arc<dyn SignupNotifier>,
}
