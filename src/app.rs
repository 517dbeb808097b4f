use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{field, info, info_span, warn, Span};

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::{meal_plans, recipes, shopping};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(cors())
        .layer(request_tracing())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(recipes::router())
        .merge(meal_plans::router())
        .merge(shopping::router())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

type RequestTrace = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    (),
    fn(&Response<Body>, Duration, &Span),
>;

fn request_tracing() -> RequestTrace {
    fn span(req: &Request<Body>) -> Span {
        info_span!(
            "http_request",
            method = %req.method(),
            path = req.uri().path(),
            status = field::Empty,
        )
    }

    fn record(res: &Response<Body>, latency: Duration, span: &Span) {
        let status = res.status();
        span.record("status", field::display(status));
        let latency_ms = latency.as_millis() as u64;
        if status.is_server_error() {
            tracing::error!(%status, latency_ms, "request failed");
        } else {
            info!(%status, latency_ms, "request served");
        }
    }

    TraceLayer::new_for_http()
        .make_span_with(span as fn(&Request<Body>) -> Span)
        .on_request(())
        .on_response(record as fn(&Response<Body>, Duration, &Span))
}

pub async fn serve(app: Router, server: &ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(server.listen_addr()).await?;
    info!(addr = %listener.local_addr()?, "meal planner listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("meal planner stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("interrupted, shutting down"),
        _ = terminate => info!("terminated, shutting down"),
    }
}
