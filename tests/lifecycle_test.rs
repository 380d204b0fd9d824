mod common;

use common::*;
use member_sync::domain::error::SyncError;
use member_sync::domain::event::IntegrationEvent;
use member_sync::infra::postgres::settings_repo;
use member_sync::services::integration::StripeIntegration;
use std::sync::{Arc, Mutex, atomic::Ordering};

const DB: &str = "member_sync_test_lifecycle";
const HANDLER_URL: &str = "https://site.example/members/webhooks/stripe";

// Connect/disconnect wipe shared tables; tests take turns within the binary.
static SERIAL: Mutex<()> = Mutex::new(());

fn serialize() -> std::sync::MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

async fn reset(pool: &sqlx::PgPool) {
    sqlx::query("TRUNCATE members, products, subscriptions, invoices, provider_events, member_events, settings CASCADE")
        .execute(pool)
        .await
        .unwrap();
}

// ── 35. connect_registers_and_announces ────────────────────────────────────

#[tokio::test]
async fn connect_registers_and_announces() {
    let _guard = serialize();
    let pool = setup_pool(DB).await;
    reset(&pool).await;
    set_setting(&pool, settings_repo::SITE_TITLE, "Acme").await;
    set_setting(&pool, settings_repo::SITE_URL, "https://acme.example").await;

    let integration = StripeIntegration::new(pool.clone(), HANDLER_URL);
    let mut events = integration.subscribe();

    let api = Arc::new(MockBillingApi::default());
    let endpoint = integration.connect(api.clone()).await.unwrap();

    assert!(integration.is_connected().await);
    assert!(!endpoint.secret.is_empty());
    assert_eq!(api.calls_matching("create_endpoint"), 1);
    assert_eq!(api.calls_matching("create_config"), 1);
    assert_eq!(
        get_setting(&pool, settings_repo::WEBHOOK_ENDPOINT_ID)
            .await
            .as_deref(),
        Some(endpoint.id.as_str())
    );

    let announced = events.recv().await.unwrap();
    assert!(matches!(announced, IntegrationEvent::LiveEnabled { .. }));
}

// ── 36. double_connect_rejected ────────────────────────────────────────────

#[tokio::test]
async fn double_connect_rejected() {
    let _guard = serialize();
    let pool = setup_pool(DB).await;
    reset(&pool).await;

    let integration = StripeIntegration::new(pool.clone(), HANDLER_URL);
    integration
        .connect(Arc::new(MockBillingApi::default()))
        .await
        .unwrap();

    let err = integration
        .connect(Arc::new(MockBillingApi::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)), "{err}");
    assert!(integration.is_connected().await);
}

// ── 37. disconnect_wipes_linkage ───────────────────────────────────────────
// Teardown order: webhook sink first, then every cached remote identifier,
// then the synced linkage on members and products.

#[tokio::test]
async fn disconnect_wipes_linkage() {
    let _guard = serialize();
    let pool = setup_pool(DB).await;
    reset(&pool).await;
    set_setting(&pool, settings_repo::SITE_TITLE, "Acme").await;
    set_setting(&pool, settings_repo::SITE_URL, "https://acme.example").await;
    let member_id = seed_member(&pool, "l37@example.com", "cus_l37").await;
    let product_id = seed_product(&pool, "Basic Plan", "price_l37").await;

    let integration = StripeIntegration::new(pool.clone(), HANDLER_URL);
    let mut events = integration.subscribe();

    let api = Arc::new(MockBillingApi::default());
    integration.connect(api.clone()).await.unwrap();
    let _ = events.recv().await.unwrap(); // LiveEnabled

    integration.disconnect().await.unwrap();
    assert!(!integration.is_connected().await);

    assert_eq!(api.calls_matching("delete_endpoint"), 1);
    for key in [
        settings_repo::WEBHOOK_ENDPOINT_ID,
        settings_repo::WEBHOOK_ENDPOINT_SECRET,
        settings_repo::BILLING_PORTAL_CONFIGURATION_ID,
    ] {
        assert!(get_setting(&pool, key).await.is_none(), "{key} survived");
    }
    assert!(member_customer_id(&pool, member_id).await.is_none());

    let price: Option<String> =
        sqlx::query_scalar("SELECT stripe_price_id FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(price.is_none());

    // Site settings are the site's, not the integration's.
    assert!(get_setting(&pool, settings_repo::SITE_TITLE).await.is_some());

    let announced = events.recv().await.unwrap();
    assert!(matches!(announced, IntegrationEvent::LiveDisabled { .. }));
}

// ── 38. disconnect_survives_remote_delete_failure ──────────────────────────
// Teardown keeps going when the remote removal fails: no cached id may
// survive to resurrect on the next connect.

#[tokio::test]
async fn disconnect_survives_remote_delete_failure() {
    let _guard = serialize();
    let pool = setup_pool(DB).await;
    reset(&pool).await;

    let integration = StripeIntegration::new(pool.clone(), HANDLER_URL);
    let api = Arc::new(MockBillingApi::default());
    integration.connect(api.clone()).await.unwrap();

    api.fail_endpoint_delete.store(true, Ordering::SeqCst);
    integration.disconnect().await.unwrap();

    assert!(!integration.is_connected().await);
    assert!(get_setting(&pool, settings_repo::WEBHOOK_ENDPOINT_ID).await.is_none());
    assert!(get_setting(&pool, settings_repo::WEBHOOK_ENDPOINT_SECRET).await.is_none());
}

// ── 39. disconnect_when_disconnected_is_noop ───────────────────────────────

#[tokio::test]
async fn disconnect_when_disconnected_is_noop() {
    let _guard = serialize();
    let pool = setup_pool(DB).await;
    reset(&pool).await;

    let integration = StripeIntegration::new(pool.clone(), HANDLER_URL);
    integration.disconnect().await.unwrap();
    assert!(!integration.is_connected().await);
}

// ── 40. reconnect_after_disconnect ─────────────────────────────────────────
// A fresh connect after teardown registers from scratch — nothing cached
// leaks across the cycle.

#[tokio::test]
async fn reconnect_after_disconnect() {
    let _guard = serialize();
    let pool = setup_pool(DB).await;
    reset(&pool).await;

    let integration = StripeIntegration::new(pool.clone(), HANDLER_URL);

    let api = Arc::new(MockBillingApi::default());
    let first = integration.connect(api.clone()).await.unwrap();
    integration.disconnect().await.unwrap();

    let second = integration.connect(api.clone()).await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(api.calls_matching("create_endpoint"), 2);
    assert_eq!(
        get_setting(&pool, settings_repo::WEBHOOK_ENDPOINT_ID)
            .await
            .as_deref(),
        Some(second.id.as_str())
    );
}
