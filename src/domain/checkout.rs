use {super::event::NewMemberEvent, super::id::EventId, uuid::Uuid};

/// One completed checkout, as applied by the translator: create or link the
/// member and fire the one-time signup notification.
#[derive(Debug, Clone)]
pub struct CheckoutCompletion {
    pub session_id: String,
    pub customer_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub mode: Option<String>,
    pub subscription_id: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub event_id: EventId,
    pub event_type: String,
    pub provider_ts: i64,
    pub raw_event: serde_json::Value,
}

impl CheckoutCompletion {
    /// Advisory-lock key: serialize per customer so two sessions for the
    /// same person can't race a member insert. Falls back to email, then
    /// the session itself.
    pub fn lock_key(&self) -> &str {
        self.customer_id
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.session_id)
    }

    pub fn member_event(&self, actor: &str, action: &str) -> NewMemberEvent {
        NewMemberEvent {
            id: Uuid::now_v7(),
            member_id: None,
            external_id: Some(self.session_id.clone()),
            event_id: self.event_id.as_str().to_string(),
            action: action.to_string(),
            actor: actor.to_string(),
            detail: serde_json::json!({
                "event_type": self.event_type,
                "mode": self.mode,
                "amount_total": self.amount_total,
                "currency": self.currency,
            }),
        }
    }
}
