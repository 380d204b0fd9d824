use {
    super::error::SyncError,
    super::subscription::SubscriptionStatus,
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Free,
    Paid,
    Comped,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Comped => "comped",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for MemberStatus {
    type Error = SyncError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            "comped" => Ok(Self::Comped),
            other => Err(SyncError::Validation(format!(
                "unknown member status: {other}"
            ))),
        }
    }
}

/// Status a member should carry given their subscription state.
/// Comped members are managed manually and never downgraded by webhooks.
pub fn derive_member_status(current: &MemberStatus, sub: &SubscriptionStatus) -> MemberStatus {
    if *current == MemberStatus::Comped {
        return MemberStatus::Comped;
    }
    if sub.grants_access() {
        MemberStatus::Paid
    } else {
        MemberStatus::Free
    }
}

/// For INSERT — id generated in Rust via Uuid::now_v7().
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub status: MemberStatus,
}

impl NewMember {
    /// A checkout session may complete before the remote customer exists;
    /// the linkage stays empty until an event carries a real customer id.
    pub fn signup(
        email: impl Into<String>,
        name: Option<String>,
        customer_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            name,
            stripe_customer_id: customer_id,
            status: MemberStatus::Free,
        }
    }
}
