//! HTTP route handlers.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::source::{GeneratorSource, LocalPool};
use crate::task::GeneratedTask;

use super::types::*;

/// Shared application state.
pub struct AppState {
    /// Provider-backed generator with local fallback
    pub generator: Arc<GeneratorSource>,
}

/// Build the router without binding it.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate-task", post(generate_task))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = Arc::new(LocalPool::load(config.task_pool_file.as_deref())?);
    let generator = Arc::new(GeneratorSource::from_config(&config.llm, pool));
    match generator.provider_id() {
        Some(id) => tracing::info!("Task generation via provider '{}'", id),
        None => tracing::info!("No generation provider configured, serving local tasks only"),
    }

    let app = router(Arc::new(AppState { generator }));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.generator.provider_id().map(str::to_string),
        pool_size: state.generator.pool().len(),
    })
}

/// Generate one task. Never fails: provider errors fall back to the local pool.
async fn generate_task(State(state): State<Arc<AppState>>) -> Json<GeneratedTask> {
    let generated = state.generator.generate().await;
    tracing::debug!(
        "Generated task {} ({}, source={})",
        generated.task.id,
        generated.task.category,
        generated.source
    );
    Json(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::source::{EndpointSource, TaskSource};
    use crate::task::TaskOrigin;

    async fn spawn_server() -> String {
        let generator = Arc::new(GeneratorSource::new(
            None,
            Arc::new(LocalPool::builtin()),
            Duration::from_secs(5),
        ));
        let app = router(Arc::new(AppState { generator }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn generate_without_credential_serves_local_task() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/generate-task", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: GeneratedTask = response.json().await.unwrap();
        assert_eq!(body.source, TaskOrigin::Local);
        assert!(!body.task.text.is_empty());
        assert!(!body.task.category.is_empty());
    }

    #[tokio::test]
    async fn health_reports_local_only() {
        let base = spawn_server().await;
        let health: HealthResponse = reqwest::get(format!("{}/api/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.provider, None);
        assert_eq!(health.pool_size, LocalPool::builtin().len());
    }

    #[tokio::test]
    async fn endpoint_source_consumes_generation_route() {
        let base = spawn_server().await;
        let source = EndpointSource::new(
            format!("{}/api/generate-task", base),
            Duration::from_secs(5),
            Arc::new(LocalPool::builtin()),
        )
        .unwrap();
        let task = source.fetch().await;
        assert!(task.id > 0);
        assert!(!task.soft.is_empty());
    }
}
