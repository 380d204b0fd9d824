use {
    super::error::SyncError,
    super::event::NewMemberEvent,
    super::id::EventId,
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Open,
    Paid,
    Uncollectible,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Paid => "paid",
            Self::Uncollectible => "uncollectible",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = SyncError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "paid" => Ok(Self::Paid),
            "uncollectible" => Ok(Self::Uncollectible),
            "void" => Ok(Self::Void),
            other => Err(SyncError::Validation(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceUpdate {
    pub id: Uuid,
    pub invoice_id: String,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub status: InvoiceStatus,
    pub amount_paid: i64,
    pub currency: Option<String>,
    pub event_id: EventId,
    pub event_type: String,
    pub provider_ts: i64,
    pub raw_event: serde_json::Value,
}

impl InvoiceUpdate {
    pub fn member_event(&self, actor: &str, action: &str) -> NewMemberEvent {
        NewMemberEvent {
            id: Uuid::now_v7(),
            member_id: None,
            external_id: Some(self.invoice_id.clone()),
            event_id: self.event_id.as_str().to_string(),
            action: action.to_string(),
            actor: actor.to_string(),
            detail: serde_json::json!({
                "event_type": self.event_type,
                "status": self.status.as_str(),
                "amount_paid": self.amount_paid,
                "currency": self.currency,
            }),
        }
    }
}
