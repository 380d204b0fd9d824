mod common;

use common::*;
use member_sync::adapters::signature::{
    SIGNATURE_TOLERANCE_SECS, SignatureHeader, WebhookVerifier, compute_signature,
};

const NOW: i64 = 1_700_000_000;

// ── 1. valid_signature_passes ──────────────────────────────────────────────

#[test]
fn valid_signature_passes() {
    let body = r#"{"id":"evt_sig_1","type":"invoice.paid"}"#;
    let header = sign_payload(TEST_WEBHOOK_SECRET, NOW, body);

    let verifier = WebhookVerifier::new(TEST_WEBHOOK_SECRET);
    verifier.verify_at(body.as_bytes(), &header, NOW).unwrap();
}

// ── 2. tampered_payload_rejected ───────────────────────────────────────────
// Signature covers the raw bytes — any byte flip invalidates it.

#[test]
fn tampered_payload_rejected() {
    let body = r#"{"id":"evt_sig_2","amount":500}"#;
    let header = sign_payload(TEST_WEBHOOK_SECRET, NOW, body);

    let tampered = r#"{"id":"evt_sig_2","amount":9999}"#;
    let verifier = WebhookVerifier::new(TEST_WEBHOOK_SECRET);
    let err = verifier
        .verify_at(tampered.as_bytes(), &header, NOW)
        .unwrap_err();
    assert!(err.to_string().contains("mismatch"), "{err}");
}

// ── 3. wrong_secret_rejected ───────────────────────────────────────────────

#[test]
fn wrong_secret_rejected() {
    let body = "payload";
    let header = sign_payload("whsec_other", NOW, body);

    let verifier = WebhookVerifier::new(TEST_WEBHOOK_SECRET);
    assert!(verifier.verify_at(body.as_bytes(), &header, NOW).is_err());
}

// ── 4. stale_timestamp_rejected ────────────────────────────────────────────
// Replays outside the tolerance window fail even with a valid signature.

#[test]
fn stale_timestamp_rejected() {
    let body = "payload";
    let signed_at = NOW - SIGNATURE_TOLERANCE_SECS - 1;
    let header = sign_payload(TEST_WEBHOOK_SECRET, signed_at, body);

    let verifier = WebhookVerifier::new(TEST_WEBHOOK_SECRET);
    let err = verifier.verify_at(body.as_bytes(), &header, NOW).unwrap_err();
    assert!(err.to_string().contains("tolerance"), "{err}");

    // Exactly at the edge is still accepted.
    let edge = NOW - SIGNATURE_TOLERANCE_SECS;
    let header = sign_payload(TEST_WEBHOOK_SECRET, edge, body);
    verifier.verify_at(body.as_bytes(), &header, NOW).unwrap();
}

// ── 5. malformed_header_rejected ───────────────────────────────────────────

#[test]
fn malformed_header_rejected() {
    assert!(SignatureHeader::parse("").is_err());
    assert!(SignatureHeader::parse("v1=abc").is_err()); // no timestamp
    assert!(SignatureHeader::parse("t=1700000000").is_err()); // no v1
    assert!(SignatureHeader::parse("t=notanumber,v1=abc").is_err());

    let parsed = SignatureHeader::parse("t=1700000000,v1=aa,v1=bb").unwrap();
    assert_eq!(parsed.timestamp, 1_700_000_000);
    assert_eq!(parsed.v1_signatures, vec!["aa", "bb"]);
}

// ── 6. any_v1_candidate_matches ────────────────────────────────────────────
// Stripe sends multiple v1 entries during secret rotation; one match is
// enough.

#[test]
fn any_v1_candidate_matches() {
    let body = "rotating";
    let good = compute_signature(TEST_WEBHOOK_SECRET, NOW, body.as_bytes()).unwrap();
    let header = format!("t={NOW},v1=deadbeef,v1={good}");

    let verifier = WebhookVerifier::new(TEST_WEBHOOK_SECRET);
    verifier.verify_at(body.as_bytes(), &header, NOW).unwrap();
}
