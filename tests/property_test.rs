use member_sync::adapters::signature::{WebhookVerifier, compute_signature};
use member_sync::domain::id::{ConfigurationId, EndpointId, EventId, SubscriptionId};
use member_sync::domain::member::{MemberStatus, derive_member_status};
use member_sync::domain::portal::{PortalBusinessProfile, PortalConfigurationOptions};
use member_sync::domain::subscription::SubscriptionStatus;
use proptest::prelude::*;

fn arb_subscription_status() -> impl Strategy<Value = SubscriptionStatus> {
    prop_oneof![
        Just(SubscriptionStatus::Active),
        Just(SubscriptionStatus::Trialing),
        Just(SubscriptionStatus::PastDue),
        Just(SubscriptionStatus::Unpaid),
        Just(SubscriptionStatus::Canceled),
        Just(SubscriptionStatus::Incomplete),
        Just(SubscriptionStatus::IncompleteExpired),
        Just(SubscriptionStatus::Paused),
    ]
}

fn arb_member_status() -> impl Strategy<Value = MemberStatus> {
    prop_oneof![
        Just(MemberStatus::Free),
        Just(MemberStatus::Paid),
        Just(MemberStatus::Comped),
    ]
}

proptest! {
    /// as_str → try_from roundtrip is identity for any subscription status.
    #[test]
    fn subscription_status_roundtrip(status in arb_subscription_status()) {
        let roundtripped = SubscriptionStatus::try_from(status.as_str()).unwrap();
        prop_assert_eq!(roundtripped, status);
    }

    /// Same for member statuses.
    #[test]
    fn member_status_roundtrip(status in arb_member_status()) {
        let roundtripped = MemberStatus::try_from(status.as_str()).unwrap();
        prop_assert_eq!(roundtripped, status);
    }

    /// For any non-comped member the derived status tracks access exactly:
    /// paid iff the subscription grants access.
    #[test]
    fn derived_status_tracks_access(
        current in prop_oneof![Just(MemberStatus::Free), Just(MemberStatus::Paid)],
        sub in arb_subscription_status(),
    ) {
        let derived = derive_member_status(&current, &sub);
        if sub.grants_access() {
            prop_assert_eq!(derived, MemberStatus::Paid);
        } else {
            prop_assert_eq!(derived, MemberStatus::Free);
        }
    }

    /// Comped members are never touched by webhook-driven derivation.
    #[test]
    fn comped_is_sticky(sub in arb_subscription_status()) {
        prop_assert_eq!(
            derive_member_status(&MemberStatus::Comped, &sub),
            MemberStatus::Comped
        );
    }

    /// Id newtypes accept exactly their prefix, whatever the suffix.
    #[test]
    fn id_prefix_validation(suffix in "[a-zA-Z0-9]{1,24}") {
        let evt = format!("evt_{suffix}");
        let sub = format!("sub_{suffix}");
        let bpc = format!("bpc_{suffix}");
        let we = format!("we_{suffix}");

        prop_assert!(EventId::new(evt).is_ok());
        prop_assert!(SubscriptionId::new(sub.clone()).is_ok());
        prop_assert!(ConfigurationId::new(bpc.clone()).is_ok());
        prop_assert!(EndpointId::new(we.clone()).is_ok());

        prop_assert!(EventId::new(sub).is_err());
        prop_assert!(SubscriptionId::new(suffix.clone()).is_err());
        prop_assert!(ConfigurationId::new(we).is_err());
        prop_assert!(EndpointId::new(bpc).is_err());
    }

    /// The portal headline is a pure function of the site title and always
    /// embeds it.
    #[test]
    fn headline_embeds_title(title in "[a-zA-Z0-9 ]{1,40}") {
        let profile = PortalBusinessProfile::from_site_title(&title);
        prop_assert!(profile.headline().contains(&title));
        let again = PortalBusinessProfile::from_site_title(&title);
        prop_assert_eq!(profile.headline(), again.headline());
    }

    /// The full configuration form carries the return url and all three
    /// portal features.
    #[test]
    fn configuration_form_is_complete(
        title in "[a-zA-Z0-9 ]{1,40}",
        url in "https://[a-z]{3,12}\\.example",
    ) {
        let form = PortalConfigurationOptions::new(&title, &url).to_form();
        prop_assert!(form.iter().any(|(k, v)| k == "default_return_url" && *v == url));
        for feature in ["payment_method_update", "invoice_history", "subscription_cancel"] {
            let key = format!("features[{feature}][enabled]");
            prop_assert!(form.iter().any(|(k, v)| *k == key && v == "true"));
        }
    }

    /// Any payload verifies against a signature freshly computed with the
    /// same secret and timestamp, and against no other payload.
    #[test]
    fn signature_verifies_own_payload(
        payload in prop::collection::vec(any::<u8>(), 0..256),
        secret in "whsec_[a-zA-Z0-9]{8,32}",
        ts in 0i64..=4_000_000_000,
    ) {
        let sig = compute_signature(&secret, ts, &payload).unwrap();
        let header = format!("t={ts},v1={sig}");
        let verifier = WebhookVerifier::new(secret.as_str());
        prop_assert!(verifier.verify_at(&payload, &header, ts).is_ok());

        let mut other = payload.clone();
        other.push(0x42);
        prop_assert!(verifier.verify_at(&other, &header, ts).is_err());
    }
}
