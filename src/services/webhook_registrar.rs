use {
    crate::domain::{
        error::SyncError,
        id::EndpointId,
        provider::{BillingApi, ProviderError, WebhookEndpoint},
    },
    crate::infra::postgres::settings_repo,
    sqlx::PgPool,
    std::sync::Arc,
};

/// Event types delivered to the registered endpoint.
pub const WEBHOOK_EVENTS: &[&str] = &[
    "customer.subscription.created",
    "customer.subscription.updated",
    "customer.subscription.deleted",
    "invoice.paid",
    "invoice.payment_succeeded",
    "invoice.payment_failed",
    "checkout.session.completed",
];

/// Owns the registered webhook endpoint lifecycle: the same
/// create-or-update-or-recreate convergence as the portal configuration,
/// applied to a webhook-endpoint resource. The signing secret is returned
/// by Stripe only at creation, so it is cached alongside the endpoint id.
pub struct WebhookRegistrar {
    api: Arc<dyn BillingApi>,
    pool: PgPool,
    handler_url: String,
}

impl WebhookRegistrar {
    pub fn new(api: Arc<dyn BillingApi>, pool: PgPool, handler_url: impl Into<String>) -> Self {
        Self {
            api,
            pool,
            handler_url: handler_url.into(),
        }
    }

    /// Idempotent: converges to exactly one live registration for the
    /// handler url and returns it.
    pub async fn start(&self) -> Result<WebhookEndpoint, SyncError> {
        let cached_id = settings_repo::get(&self.pool, settings_repo::WEBHOOK_ENDPOINT_ID).await?;
        let cached_secret =
            settings_repo::get(&self.pool, settings_repo::WEBHOOK_ENDPOINT_SECRET).await?;

        let (Some(cached_id), Some(secret)) = (cached_id, cached_secret) else {
            // Nothing cached, or the secret was lost — a registration
            // without its secret cannot verify anything, start over.
            return self.register().await;
        };

        let id = EndpointId::new(cached_id)?;
        match self
            .api
            .update_webhook_endpoint(&id, &self.handler_url, WEBHOOK_EVENTS)
            .await
        {
            Ok(id) => Ok(WebhookEndpoint { id, secret }),
            Err(ProviderError::ResourceMissing(msg)) => {
                tracing::warn!(endpoint_id = %id, "remote endpoint missing ({msg}), recreating");
                self.register().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Idempotent: removes the registration if one is cached, tolerating a
    /// remote side that already forgot it.
    pub async fn stop(&self) -> Result<(), SyncError> {
        let Some(cached_id) =
            settings_repo::get(&self.pool, settings_repo::WEBHOOK_ENDPOINT_ID).await?
        else {
            return Ok(());
        };

        let id = EndpointId::new(cached_id)?;
        match self.api.delete_webhook_endpoint(&id).await {
            Ok(()) => {
                tracing::info!(endpoint_id = %id, "webhook endpoint removed");
            }
            Err(ProviderError::ResourceMissing(_)) => {
                tracing::info!(endpoint_id = %id, "webhook endpoint already gone");
            }
            Err(e) => return Err(e.into()),
        }

        settings_repo::delete_many(
            &self.pool,
            &[
                settings_repo::WEBHOOK_ENDPOINT_ID,
                settings_repo::WEBHOOK_ENDPOINT_SECRET,
            ],
        )
        .await?;
        Ok(())
    }

    async fn register(&self) -> Result<WebhookEndpoint, SyncError> {
        let endpoint = self
            .api
            .create_webhook_endpoint(&self.handler_url, WEBHOOK_EVENTS)
            .await?;

        settings_repo::set_many(
            &self.pool,
            &[
                (settings_repo::WEBHOOK_ENDPOINT_ID, endpoint.id.as_str()),
                (settings_repo::WEBHOOK_ENDPOINT_SECRET, &endpoint.secret),
            ],
        )
        .await?;

        tracing::info!(endpoint_id = %endpoint.id, url = %self.handler_url, "webhook endpoint registered");
        Ok(endpoint)
    }
}
