use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::SyncError;

/// Stripe event identifier (`evt_xxx`) — the sole dedup key for webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Result<Self, SyncError> {
        let id = id.into();
        if !id.starts_with("evt_") {
            return Err(SyncError::Validation(format!(
                "EventId must start with evt_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Subscription identifier (`sub_xxx`).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Result<Self, SyncError> {
        let id = id.into();
        if !id.starts_with("sub_") {
            return Err(SyncError::Validation(format!(
                "SubscriptionId must start with sub_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Billing portal configuration identifier (`bpc_xxx`).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(String);

impl ConfigurationId {
    pub fn new(id: impl Into<String>) -> Result<Self, SyncError> {
        let id = id.into();
        if !id.starts_with("bpc_") {
            return Err(SyncError::Validation(format!(
                "ConfigurationId must start with bpc_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Webhook endpoint identifier (`we_xxx`).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Result<Self, SyncError> {
        let id = id.into();
        if !id.starts_with("we_") {
            return Err(SyncError::Validation(format!(
                "EndpointId must start with we_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
