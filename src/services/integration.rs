use {
    crate::domain::{
        error::SyncError,
        event::IntegrationEvent,
        provider::{BillingApi, WebhookEndpoint},
    },
    crate::infra::postgres::{member_repo, product_repo, settings_repo},
    crate::services::{portal_reconciler::PortalReconciler, webhook_registrar::WebhookRegistrar},
    sqlx::PgPool,
    std::sync::Arc,
    tokio::sync::{Mutex, broadcast},
};

struct LiveStripe {
    api: Arc<dyn BillingApi>,
}

/// Two modes: disconnected (initial) and connected. Holding the facade
/// inside the live state means disconnecting drops the credentials with it.
pub struct StripeIntegration {
    pool: PgPool,
    handler_url: String,
    live: Mutex<Option<LiveStripe>>,
    events: broadcast::Sender<IntegrationEvent>,
}

impl StripeIntegration {
    pub fn new(pool: PgPool, handler_url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            pool,
            handler_url: handler_url.into(),
            live: Mutex::new(None),
            events,
        }
    }

    /// Observers register explicitly; lifecycle events are fire-and-forget.
    pub fn subscribe(&self) -> broadcast::Receiver<IntegrationEvent> {
        self.events.subscribe()
    }

    pub async fn is_connected(&self) -> bool {
        self.live.lock().await.is_some()
    }

    /// Bring the integration live: register the webhook sink, converge the
    /// billing portal configuration, then announce. Remote failures
    /// propagate — a half-connected integration must be visible.
    pub async fn connect(&self, api: Arc<dyn BillingApi>) -> Result<WebhookEndpoint, SyncError> {
        let mut live = self.live.lock().await;
        if live.is_some() {
            return Err(SyncError::Validation(
                "stripe integration already connected".into(),
            ));
        }

        let registrar =
            WebhookRegistrar::new(api.clone(), self.pool.clone(), self.handler_url.clone());
        let endpoint = registrar.start().await?;

        let reconciler = PortalReconciler::new(api.clone(), self.pool.clone());
        reconciler.start().await?;

        *live = Some(LiveStripe { api });

        let _ = self.events.send(IntegrationEvent::LiveEnabled {
            message: "Stripe live mode enabled".into(),
        });
        tracing::info!(endpoint_id = %endpoint.id, "stripe integration connected");
        Ok(endpoint)
    }

    /// Teardown in a fixed order: stop the webhook sink first so no
    /// in-flight event races the wipe, then clear every cached remote
    /// identifier, then drop the facade credentials. Each step tolerates
    /// failure of the previous one — partial teardown must never leave
    /// stale linkage to resurrect on the next connect.
    pub async fn disconnect(&self) -> Result<(), SyncError> {
        let mut live = self.live.lock().await;
        let Some(state) = live.take() else {
            return Ok(()); // already disconnected
        };

        let registrar =
            WebhookRegistrar::new(state.api.clone(), self.pool.clone(), self.handler_url.clone());
        if let Err(e) = registrar.stop().await {
            tracing::error!(error = %e, "webhook deregistration failed, continuing teardown");
        }

        if let Err(e) = settings_repo::delete_many(
            &self.pool,
            &[
                settings_repo::BILLING_PORTAL_CONFIGURATION_ID,
                settings_repo::WEBHOOK_ENDPOINT_ID,
                settings_repo::WEBHOOK_ENDPOINT_SECRET,
            ],
        )
        .await
        {
            tracing::error!(error = %e, "failed to clear cached remote identifiers");
        }

        match product_repo::clear_price_links(&self.pool).await {
            Ok(n) if n > 0 => tracing::info!(count = n, "product price links cleared"),
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "failed to clear product price links"),
        }

        match member_repo::clear_customer_links(&self.pool).await {
            Ok(n) if n > 0 => tracing::info!(count = n, "member customer links cleared"),
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "failed to clear member customer links"),
        }

        // Credentials go with the dropped live state.
        drop(state);

        let _ = self.events.send(IntegrationEvent::LiveDisabled {
            message: "Stripe live mode disabled".into(),
        });
        tracing::info!("stripe integration disconnected");
        Ok(())
    }
}
