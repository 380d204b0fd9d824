use {
    crate::domain::{
        id::{ConfigurationId, EndpointId},
        portal::{PortalBusinessProfile, PortalConfigurationOptions},
        provider::{BillingApi, ProviderError, WebhookEndpoint},
    },
    async_trait::async_trait,
    serde::{Deserialize, de::DeserializeOwned},
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Form-encoded client for the parts of the Stripe REST surface the sync
/// layer owns: billing portal configurations and webhook endpoints.
pub struct StripeApi {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigurationResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EndpointResponse {
    id: String,
    #[serde(default)]
    secret: Option<String>,
}

impl StripeApi {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: STRIPE_API_BASE.to_string(),
        }
    }

    /// Point at a different base URL (stripe-mock or a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_error(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Api(format!("invalid response body: {e}")))
    }

    async fn delete(&self, path: &str) -> Result<(), ProviderError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_error(response).await);
        }
        Ok(())
    }
}

/// Maps Stripe error bodies onto the typed error, so callers branch on a
/// variant instead of inspecting error-code strings.
async fn classify_error(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(parsed) = serde_json::from_str::<StripeErrorBody>(&body) {
        let message = parsed.error.message.unwrap_or_else(|| status.to_string());
        if parsed.error.code.as_deref() == Some("resource_missing") {
            return ProviderError::ResourceMissing(message);
        }
        return ProviderError::Api(message);
    }

    ProviderError::Api(format!("{status}: {body}"))
}

#[async_trait]
impl BillingApi for StripeApi {
    async fn create_portal_configuration(
        &self,
        options: &PortalConfigurationOptions,
    ) -> Result<ConfigurationId, ProviderError> {
        let response: ConfigurationResponse = self
            .post_form("billing_portal/configurations", &options.to_form())
            .await?;
        ConfigurationId::new(response.id)
            .map_err(|e| ProviderError::Api(format!("unexpected configuration id: {e}")))
    }

    async fn update_portal_configuration(
        &self,
        id: &ConfigurationId,
        profile: &PortalBusinessProfile,
    ) -> Result<ConfigurationId, ProviderError> {
        let path = format!("billing_portal/configurations/{}", id.as_str());
        let response: ConfigurationResponse = self.post_form(&path, &profile.to_form()).await?;
        ConfigurationId::new(response.id)
            .map_err(|e| ProviderError::Api(format!("unexpected configuration id: {e}")))
    }

    async fn create_webhook_endpoint(
        &self,
        url: &str,
        events: &[&str],
    ) -> Result<WebhookEndpoint, ProviderError> {
        let mut params = vec![("url".to_string(), url.to_string())];
        for (i, event) in events.iter().enumerate() {
            params.push((format!("enabled_events[{i}]"), (*event).to_string()));
        }

        let response: EndpointResponse = self.post_form("webhook_endpoints", &params).await?;
        let secret = response
            .secret
            .ok_or_else(|| ProviderError::Api("endpoint created without signing secret".into()))?;
        let id = EndpointId::new(response.id)
            .map_err(|e| ProviderError::Api(format!("unexpected endpoint id: {e}")))?;

        Ok(WebhookEndpoint { id, secret })
    }

    async fn update_webhook_endpoint(
        &self,
        id: &EndpointId,
        url: &str,
        events: &[&str],
    ) -> Result<EndpointId, ProviderError> {
        let mut params = vec![("url".to_string(), url.to_string())];
        for (i, event) in events.iter().enumerate() {
            params.push((format!("enabled_events[{i}]"), (*event).to_string()));
        }

        let path = format!("webhook_endpoints/{}", id.as_str());
        let response: EndpointResponse = self.post_form(&path, &params).await?;
        EndpointId::new(response.id)
            .map_err(|e| ProviderError::Api(format!("unexpected endpoint id: {e}")))
    }

    async fn delete_webhook_endpoint(&self, id: &EndpointId) -> Result<(), ProviderError> {
        self.delete(&format!("webhook_endpoints/{}", id.as_str()))
            .await
    }
}
