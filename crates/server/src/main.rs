//! Coaching agent server entry point

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use coaching_agent_agent::CoachingEngine;
use coaching_agent_config::{load_settings, Settings};
use coaching_agent_llm::{OpenAiBackend, OpenAiConfig};
use coaching_agent_persistence::{InMemorySessionStore, SessionStore, SqliteSessionStore};
use coaching_agent_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("COACHING_AGENT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Warning: Failed to load config: {e}. Using defaults.");
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting coaching agent server"
    );

    let store = build_session_store(&config).await;
    let engine = build_engine(&config, store);
    let state = AppState::new(config.clone(), Arc::new(engine));

    let app = create_router(state);

    let host: IpAddr = config
        .server
        .host
        .parse()
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Pick the session store backend; SQLite failures degrade to in-memory
async fn build_session_store(config: &Settings) -> Arc<dyn SessionStore> {
    if !config.persistence.enabled {
        tracing::info!("Persistence disabled, using in-memory session store");
        return Arc::new(InMemorySessionStore::new());
    }

    match SqliteSessionStore::open(&config.persistence.database_path).await {
        Ok(store) => {
            tracing::info!(
                path = %config.persistence.database_path,
                "SQLite session persistence enabled"
            );
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                "Failed to open SQLite store, falling back to in-memory sessions"
            );
            Arc::new(InMemorySessionStore::new())
        }
    }
}

/// Build the engine, attaching a model backend when an API key is configured
fn build_engine(config: &Settings, store: Arc<dyn SessionStore>) -> CoachingEngine {
    let engine = CoachingEngine::new(config.engine.clone(), store);

    if !config.llm.is_configured() {
        tracing::info!(
            "No model API key configured; running on fallback responses (demo mode)"
        );
        return engine;
    }

    let timeout = Duration::from_secs(config.llm.timeout_secs);
    let llm_config = OpenAiConfig {
        endpoint: config.llm.endpoint.clone(),
        api_key: config.llm.api_key.clone().unwrap_or_default(),
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        timeout,
    };

    match OpenAiBackend::new(llm_config) {
        Ok(backend) => {
            tracing::info!(model = %config.llm.model, "Model backend configured");
            engine.with_llm(Arc::new(backend), timeout)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Model backend configuration failed; running on fallback responses"
            );
            engine
        }
    }
}

/// Initialize tracing with env-filter and optional JSON output
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        tracing_subscriber::EnvFilter::new(format!("coaching_agent={level},tower_http=info"))
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
