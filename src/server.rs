//! # Server Configuration
//!
//! This module contains the router, middleware and serve loop for the Tenders API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::error::{ApiError, ErrorType};
use crate::handlers::{self, tenders};
use crate::service::TenderService;
use crate::telemetry::{TRACE_ID_HEADER, TraceContext, with_trace_context};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: TenderService,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/tenders", get(tenders::list_tenders))
        .route("/tenders/new", post(tenders::create_tender))
        .route("/tenders/my", get(tenders::list_my_tenders))
        .route(
            "/tenders/{tender_id}/status",
            get(tenders::get_tender_status).put(tenders::update_tender_status),
        )
        .route("/tenders/{tender_id}/edit", patch(tenders::edit_tender))
        .route(
            "/tenders/{tender_id}/rollback/{version}",
            put(tenders::rollback_tender),
        )
        .route(
            "/tenders/{tender_id}/versions",
            get(tenders::list_tender_versions),
        );

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(propagate_trace_id))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ErrorType::NotFound.into()
}

/// Runs the request inside a trace context and echoes its ID on the response.
async fn propagate_trace_id(request: Request, next: Next) -> Response {
    let context = TraceContext::from_headers(request.headers());
    let trace_id = context.trace_id.clone();

    let mut response = with_trace_context(context, next.run(request)).await;
    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

/// Serves the API until `shutdown` fires.
///
/// In-flight requests get `shutdown_grace_seconds` to finish; the server task
/// is aborted after that.
pub async fn run_server(
    config: Arc<AppConfig>,
    service: TenderService,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = config.bind_addr().context("Invalid server address")?;
    let grace = config.shutdown_grace();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, profile = %config.profile, "Server listening");

    let app = create_app(AppState { config, service });
    let token = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(token.cancelled_owned())
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("server task failed")??;
            return Ok(());
        }
        _ = shutdown.cancelled() => {
            tracing::info!(grace_seconds = grace.as_secs(), "Shutdown requested, draining requests");
        }
    }

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => result.context("server task failed")??,
        Err(_) => {
            tracing::warn!("Shutdown grace period elapsed, aborting open connections");
            server.abort();
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Cancels `token` on Ctrl-C or SIGTERM.
pub async fn shutdown_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    token.cancel();
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::ping,
        crate::handlers::tenders::list_tenders,
        crate::handlers::tenders::create_tender,
        crate::handlers::tenders::list_my_tenders,
        crate::handlers::tenders::get_tender_status,
        crate::handlers::tenders::update_tender_status,
        crate::handlers::tenders::edit_tender,
        crate::handlers::tenders::rollback_tender,
        crate::handlers::tenders::list_tender_versions,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::TenderStatus,
            crate::error::ApiError,
            crate::handlers::types::TenderResponse,
            crate::handlers::types::TenderVersionResponse,
            crate::handlers::types::CreateTenderRequest,
            crate::handlers::types::EditTenderRequest,
            crate::handlers::types::TenderStatusResponse,
        )
    ),
    tags(
        (name = "tenders", description = "Versioned tender management"),
        (name = "health", description = "Liveness checks"),
    ),
    info(
        title = "Tenders API",
        description = "API for creating, amending and rolling back tenders",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
