use mimalloc::MiMalloc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use waypost::auth::FixedWindowThrottle;
use waypost::db::NavStore;
use waypost::middleware::auth::AuthRuntime;
use waypost::router::{WaypostState, waypost_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &waypost::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen = %cfg.listen,
        auth_enabled = cfg.auth.enabled,
        read_protected = cfg.auth.required_for_read,
        loglevel = %cfg.loglevel,
    );

    if cfg.auth.enabled && (cfg.auth.username.is_empty() || cfg.auth.password_hash.is_empty()) {
        warn!("auth is enabled but username or password hash is empty; every login will fail");
    }
    if cfg.auth.enabled && cfg.auth.secret == "default-secret" {
        warn!("auth is enabled with the default token secret; set WAYPOST_AUTH__SECRET");
    }

    let store = NavStore::connect(&cfg.database_url).await?;

    let throttle = Arc::new(FixedWindowThrottle::new(
        cfg.throttle.max_attempts,
        Duration::from_secs(cfg.throttle.window_secs),
    ));
    let auth = AuthRuntime::new(&cfg.auth, cfg.insecure_cookie);
    let state = WaypostState::new(store, auth, throttle);
    let app = waypost_router(state);

    let listener = TcpListener::bind(&cfg.listen).await?;
    info!("HTTP server listening on {}", cfg.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
