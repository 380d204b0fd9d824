use {
    crate::domain::error::SyncError,
    hmac::{Hmac, Mac},
    sha2::Sha256,
    std::sync::Arc,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

/// Replay window for the signature timestamp.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Parsed `Stripe-Signature` header: `t=<unix>,v1=<hex>[,v1=<hex>...]`.
#[derive(Debug)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<String>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SyncError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let mut pieces = part.trim().splitn(2, '=');
            let key = pieces.next().unwrap_or_default();
            let value = pieces.next().unwrap_or_default();
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                "v1" => v1_signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            SyncError::WebhookSignature("missing timestamp in signature header".into())
        })?;
        if v1_signatures.is_empty() {
            return Err(SyncError::WebhookSignature(
                "missing v1 signature in signature header".into(),
            ));
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifies that an inbound payload was signed with the configured secret.
/// Runs before any payload parsing — an envelope that fails here is never
/// deserialized.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Arc<str>,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), SyncError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Timestamped HMAC-SHA256 over `"{t}.{raw payload}"`, constant-time
    /// compared against every v1 candidate in the header.
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), SyncError> {
        let header = SignatureHeader::parse(signature_header)?;

        if (now - header.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(SyncError::WebhookSignature(
                "signature timestamp outside tolerance".into(),
            ));
        }

        let expected = compute_signature(&self.secret, header.timestamp, payload)?;

        let is_match = header
            .v1_signatures
            .iter()
            .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));

        if !is_match {
            return Err(SyncError::WebhookSignature("signature mismatch".into()));
        }

        Ok(())
    }
}

pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SyncError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SyncError::WebhookSignature(format!("invalid signing secret: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
