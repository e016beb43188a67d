use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, MarketData, Notifier, SignalStore};
use engine::{BinanceFuturesClient, CooldownGate, Dispatcher, Engine, Scanner, SqliteSignalStore};
use strategy::ScanConfig;
use telegram_ctrl::{start_bot, BotDeps, TelegramNotifier};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let scan_cfg = match &cfg.scan_config_path {
        Some(path) => ScanConfig::load(path),
        None => ScanConfig::default(),
    };
    info!(
        interval_secs = scan_cfg.scan_interval_secs,
        cooldown_minutes = scan_cfg.cooldown_minutes,
        "SpikeWatch starting"
    );

    // ── Database ──────────────────────────────────────────────────────────────
    let db_options = SqliteConnectOptions::from_str(&cfg.database_url)
        .unwrap_or_else(|e| panic!("Invalid DATABASE_URL: {e}"))
        .create_if_missing(true);
    let db = SqlitePool::connect_with(db_options)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to database: {e}"));
    sqlx::migrate!("../../migrations")
        .run(&db)
        .await
        .unwrap_or_else(|e| panic!("Database migration failed: {e}"));
    info!("Database ready");

    // ── Collaborators ─────────────────────────────────────────────────────────
    let market: Arc<dyn MarketData> = Arc::new(
        BinanceFuturesClient::new(&cfg.binance_futures_url, cfg.http_timeout)
            .unwrap_or_else(|e| panic!("Failed to build exchange client: {e}")),
    );
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        cfg.telegram_token.clone(),
        cfg.telegram_chat_id,
    ));
    let store: Arc<dyn SignalStore> = Arc::new(SqliteSignalStore::new(db.clone(), cfg.report_offset));

    // ── Engine ────────────────────────────────────────────────────────────────
    let gate = Arc::new(CooldownGate::new(scan_cfg.cooldown()));
    let scanner = Scanner::new(
        market,
        gate.clone(),
        Dispatcher::new(notifier.clone(), store.clone()),
        scan_cfg.clone(),
    );
    let shutdown = CancellationToken::new();
    let (engine, engine_handle) = Engine::new(scanner, gate, &scan_cfg, shutdown.clone());

    // ── Telegram commands ─────────────────────────────────────────────────────
    if cfg.telegram_allowed_user_ids.is_empty() {
        info!("TELEGRAM_ALLOWED_USER_IDS empty; command bot disabled");
    } else {
        let bot_deps = BotDeps {
            engine: engine_handle.clone(),
            allowed_user_ids: Arc::new(cfg.telegram_allowed_user_ids.clone()),
        };
        tokio::spawn(start_bot(cfg.telegram_token.clone(), bot_deps));
    }

    // ── Dashboard API ─────────────────────────────────────────────────────────
    if cfg.dashboard_token.is_empty() {
        info!("DASHBOARD_TOKEN empty; API disabled");
    } else {
        let api_state = api::AppState {
            store: store.clone(),
            engine_state: engine_handle.shared_state(),
            dashboard_token: cfg.dashboard_token.clone(),
        };
        let port = cfg.dashboard_port;
        tokio::spawn(async move {
            if let Err(e) = api::serve(api_state, port).await {
                error!(error = %e, "Dashboard API stopped");
            }
        });
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    let engine_task = tokio::spawn(engine.run());

    let started = format!(
        "✅ SpikeWatch started\nScanning USDT-M perpetuals every {}s (cooldown {}m)",
        scan_cfg.scan_interval().as_secs(),
        scan_cfg.cooldown_minutes
    );
    if let Err(e) = notifier.notify(&started).await {
        warn!(error = %e, "Startup notification failed");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received. Stopping engine.");
    shutdown.cancel();
    if let Err(e) = engine_task.await {
        error!(error = %e, "Engine task ended abnormally");
    }

    if let Err(e) = notifier.notify("🛑 SpikeWatch stopped manually").await {
        warn!(error = %e, "Shutdown notification failed");
    }
    db.close().await;
    info!("Exited cleanly");
}
