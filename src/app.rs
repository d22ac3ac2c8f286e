/*
 * Responsibility
 * - Config読み込み → 依存生成 (gate / codec / 失効チェック) → Router 組み立て
 * - Middleware の適用 (認証 gate / request-id / trace など)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware;
use crate::services::auth::{build_codec, build_gate, build_revocation_checker};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,token_auth=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let revocation = build_revocation_checker(&config.revocation)
        .await
        .context("failed to connect revocation backend")?;
    let gate = build_gate(&config.auth, revocation).context("failed to build authentication gate")?;

    let codec = build_codec(&config.auth).context("failed to load AUTH_PRIVATE_KEY")?;
    if codec.is_none() {
        tracing::info!("AUTH_PRIVATE_KEY not set; token issuance disabled");
    }

    Ok(AppState::new(Arc::new(gate), codec.map(Arc::new)))
}

/// Full HTTP stack: routes, authentication gate, then transport layers.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes());

    let router = middleware::auth::access::apply(router, state.clone()).with_state(state);

    middleware::http::apply(router)
}
