use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    time::Duration,
};

use axum::{
    Json,
    Router,
    extract::State,
    http::StatusCode,
    routing::{
        get,
        post,
    },
};
use chrono::Utc;
use pulse_core::{
    Estimator,
    MetricsResponse,
    MetricsSource,
    ThreadRngEstimator,
};
use serde::Deserialize;
use serde_json::{
    Value,
    json,
};
use tokio::{
    net::TcpListener,
    signal,
    time::sleep,
};
use tracing::{
    info,
    warn,
};

use crate::{
    aggregator::MetricsAggregator,
    analyze::{
        analyze_address,
        validate_address,
    },
    cache::ResponseCache,
    clock::{
        Clock,
        SystemClock,
    },
    config::GatewayConfig,
    error::{
        GatewayError,
        Result,
    },
    query::execute_query,
    rpc::RpcClient,
};

/// Builder that wires configuration, clock, and estimator together.
pub struct GatewayBuilder {
    config: GatewayConfig,
    clock: Option<Arc<dyn Clock>>,
    estimator: Option<Arc<dyn Estimator>>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            clock: None,
            estimator: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn Estimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn build(self) -> Result<Gateway> {
        let config = self.config.validate()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let estimator = self
            .estimator
            .unwrap_or_else(|| Arc::new(ThreadRngEstimator));
        let state = GatewayState::new(config.clone(), clock, estimator);
        Ok(Gateway { config, state })
    }
}

pub struct Gateway {
    config: GatewayConfig,
    state: GatewayState,
}

impl Gateway {
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "pulse gateway starting");
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on a pre-bound listener with a caller-supplied shutdown
    /// future. Tests bind port 0 and pass a cancellation-token future.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Gateway { config, state } = self;

        // Sweep the response cache at TTL cadence so expired entries
        // cannot accumulate over process lifetime.
        let cache = state.cache.clone();
        let sweep_interval = Duration::from_millis(config.rpc_cache_ttl_ms);
        tokio::spawn(async move {
            loop {
                sleep(sweep_interval).await;
                cache.sweep_expired();
            }
        });

        let addr = listener.local_addr()?;
        let router = build_router(state);
        info!(%addr, "pulse gateway listening");

        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("pulse gateway shutdown complete");

        Ok(())
    }
}

/// Shared request-handling context, cloned into every handler.
#[derive(Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub cache: ResponseCache,
    pub rpc: Arc<RpcClient>,
    pub aggregator: Arc<MetricsAggregator>,
    ready: Arc<AtomicBool>,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, clock: Arc<dyn Clock>, estimator: Arc<dyn Estimator>) -> Self {
        let cache = ResponseCache::new(
            Duration::from_millis(config.rpc_cache_ttl_ms),
            clock.clone(),
        );
        let rpc = Arc::new(RpcClient::new(
            config.rpc_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            cache.clone(),
        ));
        let aggregator = Arc::new(MetricsAggregator::new(
            rpc.clone(),
            estimator,
            clock,
            Duration::from_millis(config.snapshot_ttl_ms),
        ));
        Self {
            config,
            cache,
            rpc,
            aggregator,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }
}

fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/solana/metrics", get(serve_metrics))
        .route("/api/solana/analyze", post(serve_analyze))
        .route("/api/solana/query", post(serve_query))
        .route("/health", get(serve_health))
        .route("/ready", get(serve_ready))
        .with_state(state)
}

/// Always HTTP 200: upstream failures are absorbed into fallback data so
/// the dashboard never sees a hard error from this endpoint.
async fn serve_metrics(State(state): State<GatewayState>) -> Json<MetricsResponse> {
    let snapshot = state.aggregator.snapshot().await;
    if snapshot.source == MetricsSource::Rpc {
        state.ready.store(true, Ordering::Relaxed);
    }
    Json(MetricsResponse {
        success: true,
        data: snapshot,
    })
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    address: Option<String>,
}

async fn serve_analyze(
    State(state): State<GatewayState>,
    Json(request): Json<AnalyzeRequest>,
) -> (StatusCode, Json<Value>) {
    let address = request.address.unwrap_or_default();
    if let Err(err) = validate_address(&address) {
        return error_response(StatusCode::BAD_REQUEST, err.to_string());
    }

    match analyze_address(&state.rpc, &address).await {
        Ok(info) => {
            state.ready.store(true, Ordering::Relaxed);
            (
                StatusCode::OK,
                Json(json!({ "success": true, "data": info })),
            )
        }
        Err(err) => {
            warn!(%address, %err, "contract analysis failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to analyze contract: {err}"),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: Option<String>,
}

async fn serve_query(
    State(state): State<GatewayState>,
    Json(request): Json<QueryRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(query) = request.query.filter(|query| !query.is_empty()) else {
        let err = GatewayError::InvalidRequest("Invalid query".to_string());
        return error_response(StatusCode::BAD_REQUEST, err.to_string());
    };

    match execute_query(&state.rpc, &query).await {
        Ok(result) => {
            state.ready.store(true, Ordering::Relaxed);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "query": query,
                    "result": result,
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            )
        }
        Err(err) => {
            warn!(%query, %err, "query execution failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

async fn serve_health() -> StatusCode {
    StatusCode::OK
}

/// Ready once at least one upstream call has succeeded.
async fn serve_ready(State(state): State<GatewayState>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "error": message })))
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
    }
}
