use {super::error::SyncError, async_trait::async_trait};

/// Outbound signup notification port. Delivery itself (email, magic link)
/// is owned elsewhere — the sync layer only guarantees at-most-once firing
/// per completed checkout.
#[async_trait]
pub trait SignupNotifier: Send + Sync {
    async fn notify_signup(&self, email: &str) -> Result<(), SyncError>;
}
