use emporium::assets::{AssetReconciler, CloudinaryHost};
use emporium::auth::TokenIssuer;
use emporium::config::Config;
use emporium::db::{self, Repositories};
use emporium::payments::StripeGateway;
use emporium::server::{EmporiumState, emporium_router};
use emporium::utils::http::build_client;
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USER_AGENT: &str = concat!("emporium/", env!("CARGO_PKG_VERSION"));

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let assets_cfg = cfg.assets();
    let payments_cfg = cfg.payments();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        per_page = cfg.basic.per_page,
        jwt_secret = redact(&cfg.auth.jwt_secret),
        token_ttl_secs = cfg.auth.token_ttl_secs,
        assets.api_url = %assets_cfg.api_url,
        assets.cloud_name = %assets_cfg.cloud_name,
        assets.api_secret = redact(&assets_cfg.api_secret),
        assets.upload_concurrency = assets_cfg.upload_concurrency,
        assets.proxy = %assets_cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        payments.api_url = %payments_cfg.api_url,
        payments.secret_key = redact(&payments_cfg.secret_key),
        payments.client_base_url = %payments_cfg.client_base_url,
        payments.proxy = %payments_cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        "effective configuration"
    );

    let pool = db::connect(&cfg.basic.database_url).await?;

    let assets_client = build_client(
        USER_AGENT,
        assets_cfg.proxy.as_ref(),
        assets_cfg.enable_multiplexing,
    )?;
    let payments_client = build_client(
        USER_AGENT,
        payments_cfg.proxy.as_ref(),
        payments_cfg.enable_multiplexing,
    )?;

    let host = CloudinaryHost::new(&assets_cfg, assets_client)?;
    let reconciler = AssetReconciler::new(Arc::new(host), assets_cfg.upload_concurrency);
    let gateway = StripeGateway::new(&payments_cfg, payments_client);

    let state = EmporiumState::new(
        Repositories::new(pool),
        reconciler,
        Arc::new(gateway),
        TokenIssuer::from_config(&cfg.auth),
        cfg.basic.per_page,
    );
    let app = emporium_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
