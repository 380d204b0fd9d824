use {
    crate::domain::{error::SyncError, notify::SignupNotifier},
    async_trait::async_trait,
};

/// Placeholder sink until a real mailer is wired in. The at-most-once
/// guarantee lives in the checkout translator, not here.
pub struct LogNotifier;

#[async_trait]
impl SignupNotifier for LogNotifier {
    async fn notify_signup(&self, email: &str) -> Result<(), SyncError> {
        tracing::info!(email = %email, "signup notification");
        Ok(())
    }
}
