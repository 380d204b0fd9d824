use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    member_sync::{
        AppState,
        adapters::{notify::LogNotifier, signature::WebhookVerifier, stripe_api::StripeApi},
        services::integration::StripeIntegration,
    },
    sqlx::postgres::PgPoolOptions,
    std::{env, sync::Arc, time::Duration},
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let handler_url = env::var("WEBHOOK_HANDLER_URL").expect("WEBHOOK_HANDLER_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    // With a secret key present the integration connects at boot: webhook
    // endpoint registered remotely, portal configuration reconciled, and
    // the returned signing secret drives verification. Without one we fall
    // back to a locally configured secret (stripe CLI forwarding, tests).
    let webhook_secret = match env::var("STRIPE_SECRET_KEY") {
        Ok(secret_key) => {
            let integration = StripeIntegration::new(pool.clone(), handler_url.clone());
            let api = Arc::new(StripeApi::new(secret_key));
            let endpoint = integration
                .connect(api)
                .await
                .expect("failed to connect stripe integration");
            endpoint.secret
        }
        Err(_) => env::var("STRIPE_WEBHOOK_SECRET")
            .expect("STRIPE_SECRET_KEY or STRIPE_WEBHOOK_SECRET must be set"),
    };

    let state = AppState {
        pool,
        verifier: WebhookVerifier::new(webhook_secret),
        notifier: Arc::new(LogNotifier),
    };

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/webhook",
            post(member_sync::adapters::webhook::stripe_webhook_handler),
        )
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB — Stripe events are typically <20 KB
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("listening on 0.0.0.0:3000");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
