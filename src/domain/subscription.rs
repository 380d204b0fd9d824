use {
    super::error::SyncError,
    super::event::NewMemberEvent,
    super::id::{EventId, SubscriptionId},
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Unpaid,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Paused,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Unpaid => "unpaid",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Paused => "paused",
        }
    }

    /// Whether this subscription still entitles the member to paid access.
    /// past_due keeps access — Stripe is still retrying the charge.
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing | Self::PastDue)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SubscriptionStatus {
    type Error = SyncError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "active" => Ok(Self::Active),
            "trialing" => Ok(Self::Trialing),
            "past_due" => Ok(Self::PastDue),
            "unpaid" => Ok(Self::Unpaid),
            "canceled" => Ok(Self::Canceled),
            "incomplete" => Ok(Self::Incomplete),
            "incomplete_expired" => Ok(Self::IncompleteExpired),
            "paused" => Ok(Self::Paused),
            other => Err(SyncError::Validation(format!(
                "unknown subscription status: {other}"
            ))),
        }
    }
}

/// What a translator applies per event. All fields come from the verified
/// envelope, never from arrival order.
#[derive(Debug, Clone)]
pub struct SubscriptionUpdate {
    id: Uuid,
    subscription_id: SubscriptionId,
    customer_id: String,
    status: SubscriptionStatus,
    price_id: Option<String>,
    cancel_at_period_end: bool,
    current_period_end: Option<i64>,
    event_id: EventId,
    event_type: String,
    provider_ts: i64,
    raw_event: serde_json::Value,
}

pub struct SubscriptionUpdateParams {
    pub subscription_id: SubscriptionId,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub price_id: Option<String>,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<i64>,
    pub event_id: EventId,
    pub event_type: String,
    pub provider_ts: i64,
    pub raw_event: serde_json::Value,
}

impl SubscriptionUpdate {
    pub fn new(params: SubscriptionUpdateParams) -> Self {
        Self {
            id: Uuid::now_v7(),
            subscription_id: params.subscription_id,
            customer_id: params.customer_id,
            status: params.status,
            price_id: params.price_id,
            cancel_at_period_end: params.cancel_at_period_end,
            current_period_end: params.current_period_end,
            event_id: params.event_id,
            event_type: params.event_type,
            provider_ts: params.provider_ts,
            raw_event: params.raw_event,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscription_id(&self) -> &SubscriptionId {
        &self.subscription_id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn status(&self) -> &SubscriptionStatus {
        &self.status
    }

    pub fn price_id(&self) -> Option<&str> {
        self.price_id.as_deref()
    }

    pub fn cancel_at_period_end(&self) -> bool {
        self.cancel_at_period_end
    }

    pub fn current_period_end(&self) -> Option<i64> {
        self.current_period_end
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn provider_ts(&self) -> i64 {
        self.provider_ts
    }

    pub fn raw_event(&self) -> &serde_json::Value {
        &self.raw_event
    }

    pub fn member_event(&self, actor: &str, action: &str) -> NewMemberEvent {
        NewMemberEvent {
            id: Uuid::now_v7(),
            member_id: None,
            external_id: Some(self.subscription_id.as_str().to_string()),
            event_id: self.event_id.as_str().to_string(),
            action: action.to_string(),
            actor: actor.to_string(),
            detail: serde_json::json!({
                "event_type": self.event_type,
                "status": self.status.as_str(),
                "cancel_at_period_end": self.cancel_at_period_end,
            }),
        }
    }
}
