use {
    crate::domain::{
        error::SyncError, id::ConfigurationId, portal::PortalConfigurationOptions,
        provider::{BillingApi, ProviderError},
    },
    crate::infra::postgres::settings_repo,
    sqlx::PgPool,
    std::sync::Arc,
};

#[derive(Debug)]
pub enum ReconcileOutcome {
    /// No cached id — configuration created remotely.
    Created(ConfigurationId),
    /// Cached id still live — business profile pushed, id unchanged.
    Updated(ConfigurationId),
    /// Cached id was gone remotely (deleted out-of-band) — recreated.
    Recreated {
        stale: ConfigurationId,
        current: ConfigurationId,
    },
    /// Site settings absent — nothing to converge toward yet.
    Skipped,
}

impl ReconcileOutcome {
    pub fn current_id(&self) -> Option<&ConfigurationId> {
        match self {
            Self::Created(id) | Self::Updated(id) => Some(id),
            Self::Recreated { current, .. } => Some(current),
            Self::Skipped => None,
        }
    }
}

/// Converges the remote billing portal configuration toward the site
/// settings: create when absent, update when live, recreate when the
/// remote side lost it. Create calls are rate-limit sensitive, so the
/// common path is update-only.
pub struct PortalReconciler {
    api: Arc<dyn BillingApi>,
    pool: PgPool,
}

impl PortalReconciler {
    pub fn new(api: Arc<dyn BillingApi>, pool: PgPool) -> Self {
        Self { api, pool }
    }

    pub async fn start(&self) -> Result<ReconcileOutcome, SyncError> {
        // Desired state is derived fresh every run — the site title may
        // have changed since the configuration was last pushed.
        let Some(title) = settings_repo::get(&self.pool, settings_repo::SITE_TITLE).await? else {
            tracing::info!("site title not set, skipping portal reconciliation");
            return Ok(ReconcileOutcome::Skipped);
        };
        let Some(site_url) = settings_repo::get(&self.pool, settings_repo::SITE_URL).await? else {
            tracing::info!("site url not set, skipping portal reconciliation");
            return Ok(ReconcileOutcome::Skipped);
        };

        let options = PortalConfigurationOptions::new(&title, &site_url);
        let cached =
            settings_repo::get(&self.pool, settings_repo::BILLING_PORTAL_CONFIGURATION_ID).await?;

        let outcome = self.create_or_update(cached.as_deref(), &options).await?;

        // Persist only when the current id differs from the cached one.
        if let Some(current) = outcome.current_id() {
            if cached.as_deref() != Some(current.as_str()) {
                settings_repo::set(
                    &self.pool,
                    settings_repo::BILLING_PORTAL_CONFIGURATION_ID,
                    current.as_str(),
                )
                .await?;
            }
        }

        Ok(outcome)
    }

    async fn create_or_update(
        &self,
        cached: Option<&str>,
        options: &PortalConfigurationOptions,
    ) -> Result<ReconcileOutcome, SyncError> {
        let Some(cached) = cached else {
            let id = self.api.create_portal_configuration(options).await?;
            tracing::info!(configuration_id = %id, "billing portal configuration created");
            return Ok(ReconcileOutcome::Created(id));
        };

        let id = ConfigurationId::new(cached)?;
        match self
            .api
            .update_portal_configuration(&id, options.profile())
            .await
        {
            Ok(current) => Ok(ReconcileOutcome::Updated(current)),
            Err(ProviderError::ResourceMissing(msg)) => {
                // Deleted out-of-band (e.g. via the provider dashboard).
                tracing::warn!(
                    configuration_id = %id,
                    "remote configuration missing ({msg}), recreating"
                );
                let current = self.api.create_portal_configuration(options).await?;
                Ok(ReconcileOutcome::Recreated { stale: id, current })
            }
            Err(e) => Err(e.into()),
        }
    }
}
