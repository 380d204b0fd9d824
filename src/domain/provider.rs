use {
    super::id::{ConfigurationId, EndpointId},
    super::portal::{PortalBusinessProfile, PortalConfigurationOptions},
    async_trait::async_trait,
    thiserror::Error,
};

/// Remote API failures, discriminated where it matters: a missing resource
/// is an expected condition that triggers recreation, everything else is
/// fatal to the current reconciliation.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("resource missing: {0}")]
    ResourceMissing(String),

    #[error("api: {0}")]
    Api(String),

    #[error("network: {0}")]
    Network(String),
}

/// Registered webhook sink. Stripe returns the signing secret only at
/// creation time, so it is persisted alongside the id.
#[derive(Debug, Clone)]
pub struct WebhookEndpoint {
    pub id: EndpointId,
    pub secret: String,
}

/// Thin facade over the payment provider's REST API. The sync layer treats
/// it as an opaque RPC client; implementations live in the adapters layer.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn create_portal_configuration(
        &self,
        options: &PortalConfigurationOptions,
    ) -> Result<ConfigurationId, ProviderError>;

    async fn update_portal_configuration(
        &self,
        id: &ConfigurationId,
        profile: &PortalBusinessProfile,
    ) -> Result<ConfigurationId, ProviderError>;

    async fn create_webhook_endpoint(
        &self,
        url: &str,
        events: &[&str],
    ) -> Result<WebhookEndpoint, ProviderError>;

    async fn update_webhook_endpoint(
        &self,
        id: &EndpointId,
        url: &str,
        events: &[&str],
    ) -> Result<EndpointId, ProviderError>;

    async fn delete_webhook_endpoint(&self, id: &EndpointId) -> Result<(), ProviderError>;
}
