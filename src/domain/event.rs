use uuid::Uuid;

/// Row for the member activity history. event_id carries the provider's
/// event identifier so redelivered webhooks never double-log.
pub struct NewMemberEvent {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub external_id: Option<String>,
    pub event_id: String,
    pub action: String,
    pub actor: String,
    pub detail: serde_json::Value,
}

/// Outcome of pushing one verified webhook event through a translator.
#[derive(Debug)]
pub enum SyncOutcome {
    /// New domain row inserted.
    Created(Uuid),
    /// Existing row updated (state advanced).
    Updated(Uuid),
    /// Event is older than what we've already processed — no state change.
    Stale(Uuid),
    /// Event id was already processed (duplicate delivery).
    Duplicate,
    /// No local member matches the remote customer — recorded, not applied.
    Orphaned,
    /// Event type we don't translate — recorded in the event log only.
    Logged,
}

/// Process-wide notification emitted on connect/disconnect transitions.
/// Fire-and-forget: subscribers hold a broadcast receiver, no ack contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationEvent {
    LiveEnabled { message: String },
    LiveDisabled { message: String },
}
