use std::{env, net::SocketAddr};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::{
    bots::BotService, finance::FinanceService, ipqs::IpqsService, licenses::LicenseService,
    notes::NoteService, provisioning::ProvisioningService, proxies::ProxyService, runtime,
    subscriptions::SubscriptionService, theme_assets::ThemeAssetService, vm_ops::VmOpsService,
};

use crate::auth::{ServerAuthConfig, ServerState};
use crate::routes;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let (host, port) = (cfg.server.host.clone(), cfg.server.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

fn load_config() -> configs::AppConfig {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(_) => {
            // No config file; assemble from env vars with defaults.
            let mut cfg = configs::AppConfig::default();
            if let Ok(host) = env::var("SERVER_HOST") {
                cfg.server.host = host;
            }
            if let Some(port) = env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
                cfg.server.port = port;
            }
            cfg.auth.normalize_from_env();
            cfg.storage.normalize_from_env();
            cfg
        }
    }
}

/// Wire every resource service and the bearer guard config into one state.
pub async fn build_state(cfg: &configs::AppConfig) -> anyhow::Result<ServerState> {
    let provisioning = ProvisioningService::open(&cfg.storage.data_dir).await?;
    Ok(ServerState {
        auth: ServerAuthConfig { api_token: cfg.auth.api_token.clone() },
        bots: BotService::new(),
        proxies: ProxyService::new(),
        licenses: LicenseService::new(),
        subscriptions: SubscriptionService::new(),
        finance: FinanceService::new(),
        ipqs: IpqsService::new(),
        provisioning,
        vm_ops: VmOpsService::new(),
        theme_assets: ThemeAssetService::new(
            cfg.assets.upload_base_url.clone(),
            cfg.assets.presign_ttl_secs,
        ),
        notes: NoteService::new(),
    })
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config();
    runtime::ensure_env("frontend", &cfg.storage.data_dir).await?;

    let state = build_state(&cfg).await?;
    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    // Bind and serve
    let addr = load_bind_addr(&cfg)?;
    info!(%addr, "starting botmox server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
