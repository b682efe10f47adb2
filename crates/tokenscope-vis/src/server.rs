//! Axum web server with WebSocket streaming for the token views.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokenscope_cascade::{
    AnimationSnapshot, Brand, CascadeDriver, CascadeEdge, CascadeNode, ColorMode, Phase, Tier, TokenSet,
};
use tokenscope_color::{assess, assess_all, Backdrop, ContrastPairing, PairingReport};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::VisConfig;

/// Shared application state.
pub struct AppState {
    tokens: RwLock<TokenSet>,
    driver: CascadeDriver,
}

/// Visualization server.
pub struct VisServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server for the configured token set.
    pub fn new(config: VisConfig) -> Self {
        let tokens = config.tokens();
        let driver = CascadeDriver::new(&tokens, config.scheduler, config.frame_interval);
        Self {
            addr: config.addr,
            state: Arc::new(AppState {
                tokens: RwLock::new(tokens),
                driver,
            }),
        }
    }

    /// Handle to the cascade driver behind the server.
    pub fn driver(&self) -> &CascadeDriver {
        &self.state.driver
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            // API routes
            .route("/api/status", get(status_handler))
            .route("/api/graph", get(graph_handler))
            .route("/api/tokens", get(tokens_handler))
            .route("/api/pairings", get(pairings_handler))
            .route("/api/contrast", get(contrast_handler))
            .route("/api/cascade", get(cascade_handler))
            .route("/api/cascade/activate", post(activate_handler))
            .route("/api/cascade/reset", post(reset_handler))
            .route("/api/theme", post(theme_handler))
            // WebSocket for animation updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("Token visualizer running on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}

/// API error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
}

impl From<tokenscope_cascade::Error> for ApiError {
    fn from(err: tokenscope_cascade::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::BadRequest(error) = self;
        tracing::debug!(%error, "rejected request");
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    mode: ColorMode,
    brand: Brand,
    node_count: usize,
    edge_count: usize,
    phase: Phase,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let tokens = state.tokens.read().await;
    let graph = state.driver.graph().await;
    Json(StatusResponse {
        status: "ok",
        mode: tokens.mode,
        brand: tokens.brand,
        node_count: graph.nodes().len(),
        edge_count: graph.edges().len(),
        phase: state.driver.snapshot().phase,
    })
}

/// Column header for the graph view.
#[derive(Serialize)]
struct TierSummary {
    tier: Tier,
    label: &'static str,
    count: usize,
}

#[derive(Serialize)]
struct GraphResponse {
    tiers: Vec<TierSummary>,
    nodes: Vec<CascadeNode>,
    edges: Vec<CascadeEdge>,
}

async fn graph_handler(State(state): State<Arc<AppState>>) -> Json<GraphResponse> {
    // Waits out an in-flight theme switch.
    let _tokens = state.tokens.read().await;
    let graph = state.driver.graph().await;
    let counts = graph.tier_counts();
    Json(GraphResponse {
        tiers: Tier::ALL
            .iter()
            .map(|&tier| TierSummary {
                tier,
                label: tier.label(),
                count: counts[tier.index()],
            })
            .collect(),
        nodes: graph.nodes().to_vec(),
        edges: graph.edges().to_vec(),
    })
}

/// One row of the token table.
#[derive(Serialize)]
struct TokenEntry {
    key: &'static str,
    value: &'static str,
}

#[derive(Serialize)]
struct TokensResponse {
    mode: ColorMode,
    brand: Brand,
    entries: Vec<TokenEntry>,
}

impl From<&TokenSet> for TokensResponse {
    fn from(tokens: &TokenSet) -> Self {
        Self {
            mode: tokens.mode,
            brand: tokens.brand,
            entries: tokens
                .entries()
                .into_iter()
                .map(|(key, value)| TokenEntry { key, value })
                .collect(),
        }
    }
}

async fn tokens_handler(State(state): State<Arc<AppState>>) -> Json<TokensResponse> {
    Json(TokensResponse::from(&*state.tokens.read().await))
}

async fn pairings_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PairingReport>> {
    let tokens = *state.tokens.read().await;
    Json(assess_all(&tokens.pairings(), tokens.backdrop()))
}

#[derive(Deserialize)]
struct ContrastQuery {
    fg: String,
    bg: String,
    #[serde(default)]
    backdrop: Backdrop,
}

/// Ad-hoc check, reported like a pairing.
async fn contrast_handler(Query(query): Query<ContrastQuery>) -> Json<PairingReport> {
    let pairing = ContrastPairing::new("Custom", query.fg, query.bg);
    Json(assess(&pairing, query.backdrop))
}

async fn cascade_handler(State(state): State<Arc<AppState>>) -> Json<AnimationSnapshot> {
    Json(state.driver.snapshot())
}

#[derive(Deserialize)]
struct ActivateRequest {
    core: String,
}

#[derive(Serialize)]
struct ActivateResponse {
    reach: usize,
    tiers: usize,
    snapshot: AnimationSnapshot,
}

async fn activate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>, ApiError> {
    let plan = state.driver.activate(&req.core).await?;
    Ok(Json(ActivateResponse {
        reach: plan.closure.len(),
        tiers: plan.steps.len(),
        snapshot: state.driver.snapshot(),
    }))
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<AnimationSnapshot> {
    state.driver.reset().await;
    Json(state.driver.snapshot())
}

/// Missing fields keep their current value.
#[derive(Deserialize)]
struct ThemeRequest {
    mode: Option<ColorMode>,
    brand: Option<Brand>,
}

async fn theme_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ThemeRequest>,
) -> Json<TokensResponse> {
    // The guard spans the rebuild so the graph always matches the stored tokens.
    let mut tokens = state.tokens.write().await;
    *tokens = TokenSet::resolve(req.mode.unwrap_or(tokens.mode), req.brand.unwrap_or(tokens.brand));
    state.driver.rebuild(&tokens).await;
    Json(TokensResponse::from(&*tokens))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut updates = state.driver.subscribe();

    // Send initial snapshot
    let initial = updates.borrow_and_update().clone();
    if send(&mut socket, &WsResponse::Snapshot(initial)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if send(&mut socket, &WsResponse::Snapshot(snapshot)).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = match serde_json::from_str::<WsCommand>(text.as_str()) {
                            Ok(cmd) => handle_ws_command(&state, cmd).await,
                            Err(e) => Some(WsResponse::Error { message: e.to_string() }),
                        };
                        if let Some(response) = response {
                            if send(&mut socket, &response).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    tracing::debug!("websocket closed");
}

async fn send(socket: &mut WebSocket, response: &WsResponse) -> Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode websocket message");
            Ok(())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "get_snapshot")]
    GetSnapshot,
    #[serde(rename = "activate")]
    Activate { core: String },
    #[serde(rename = "reset")]
    Reset,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "snapshot")]
    Snapshot(AnimationSnapshot),
    #[serde(rename = "error")]
    Error { message: String },
}

/// State changes reach the client through the watch stream, so only
/// explicit reads and failures get a direct reply.
async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> Option<WsResponse> {
    match cmd {
        WsCommand::GetSnapshot => Some(WsResponse::Snapshot(state.driver.snapshot())),
        WsCommand::Activate { core } => match state.driver.activate(&core).await {
            Ok(_) => None,
            Err(e) => Some(WsResponse::Error { message: e.to_string() }),
        },
        WsCommand::Reset => {
            state.driver.reset().await;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn server() -> VisServer {
        VisServer::new(VisConfig::default())
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn status_reports_graph_size() {
        let router = server().router();
        let (status, body) = call(&router, Method::GET, "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "light");
        assert_eq!(body["brand"], "indigo");
        assert_eq!(body["node_count"], 25);
        assert_eq!(body["phase"], "idle");
    }

    #[tokio::test]
    async fn graph_lists_tiers_in_order() {
        let router = server().router();
        let (_, body) = call(&router, Method::GET, "/api/graph", None).await;
        let tiers: Vec<&str> = body["tiers"].as_array().unwrap().iter().map(|t| t["tier"].as_str().unwrap()).collect();
        assert_eq!(tiers, ["core", "semantic", "component", "platform"]);
        assert_eq!(body["edges"].as_array().unwrap().len(), 34);
    }

    #[tokio::test]
    async fn tokens_include_semantic_aliases() {
        let router = server().router();
        let (_, body) = call(&router, Method::GET, "/api/tokens", None).await;
        let entries = body["entries"].as_array().unwrap();
        let primary = entries.iter().find(|e| e["key"] == "semantic.primary").unwrap();
        assert_eq!(primary["value"], "#6366f1");
    }

    #[tokio::test]
    async fn pairings_carry_badges() {
        let router = server().router();
        let (_, body) = call(&router, Method::GET, "/api/pairings", None).await;
        let reports = body.as_array().unwrap();
        assert_eq!(reports[0]["label"], "Text on Surface");
        assert_eq!(reports[0]["tier"], "AAA");
        assert!(reports.iter().all(|r| r["valid"] == true));
    }

    #[tokio::test]
    async fn contrast_query() {
        let router = server().router();
        let (status, body) =
            call(&router, Method::GET, "/api/contrast?fg=%23767676&bg=%23ffffff", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], "AA");
        assert!((body["ratio"].as_f64().unwrap() - 4.54).abs() < 0.01);

        let (_, body) = call(&router, Method::GET, "/api/contrast?fg=tomato&bg=%23fff", None).await;
        assert_eq!(body["ratio"], 1.0);
        assert_eq!(body["tier"], "Fail");
        assert_eq!(body["valid"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn activate_then_reset() {
        let server = server();
        let router = server.router();

        let (status, body) =
            call(&router, Method::POST, "/api/cascade/activate", Some(serde_json::json!({"core": "brand-300"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reach"], 6);
        assert_eq!(body["tiers"], 4);
        assert_eq!(body["snapshot"]["selected_core"], "brand-300");
        assert_eq!(body["snapshot"]["phase"], "running");

        let (_, body) = call(&router, Method::POST, "/api/cascade/reset", None).await;
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["activated_nodes"].as_array().unwrap().len(), 0);
        assert_eq!(server.driver().snapshot().selected_core, None);
    }

    #[tokio::test]
    async fn unknown_core_is_bad_request() {
        let router = server().router();
        let (status, body) =
            call(&router, Method::POST, "/api/cascade/activate", Some(serde_json::json!({"core": "nope"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("nope"));

        let (_, body) = call(&router, Method::GET, "/api/cascade", None).await;
        assert_eq!(body["phase"], "idle");
    }

    #[tokio::test]
    async fn theme_switch_recolors_graph() {
        let router = server().router();
        let (status, body) =
            call(&router, Method::POST, "/api/theme", Some(serde_json::json!({"mode": "dark", "brand": "ember"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "dark");
        assert_eq!(body["brand"], "ember");

        let (_, graph) = call(&router, Method::GET, "/api/graph", None).await;
        let brand_300 = graph["nodes"].as_array().unwrap().iter().find(|n| n["id"] == "brand-300").unwrap();
        assert_eq!(brand_300["color"], "#fdba74");

        // Partial update keeps the brand
        let (_, body) = call(&router, Method::POST, "/api/theme", Some(serde_json::json!({"mode": "light"}))).await;
        assert_eq!(body["mode"], "light");
        assert_eq!(body["brand"], "ember");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_theme_switches_keep_graph_in_sync() {
        let router = server().router();

        for _ in 0..200 {
            let ember = tokio::spawn({
                let router = router.clone();
                async move {
                    call(&router, Method::POST, "/api/theme", Some(serde_json::json!({"mode": "light", "brand": "ember"})))
                        .await
                }
            });
            let indigo = tokio::spawn({
                let router = router.clone();
                async move {
                    call(&router, Method::POST, "/api/theme", Some(serde_json::json!({"mode": "dark", "brand": "indigo"})))
                        .await
                }
            });
            let (_, ember) = ember.await.unwrap();
            let (_, indigo) = indigo.await.unwrap();
            assert_eq!(ember["brand"], "ember");
            assert_eq!(indigo["brand"], "indigo");

            let (_, tokens) = call(&router, Method::GET, "/api/tokens", None).await;
            let (_, graph) = call(&router, Method::GET, "/api/graph", None).await;
            let token_300 = tokens["entries"].as_array().unwrap().iter().find(|e| e["key"] == "brand.300").unwrap();
            let node_300 = graph["nodes"].as_array().unwrap().iter().find(|n| n["id"] == "brand-300").unwrap();
            assert_eq!(node_300["color"], token_300["value"], "graph out of sync with {}", tokens["brand"]);
        }
    }

    #[tokio::test]
    async fn index_is_served() {
        let router = server().router();
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn ws_commands_parse() {
        let cmd: WsCommand = serde_json::from_str(r#"{"type":"activate","core":"brand-300"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Activate { core } if core == "brand-300"));
        assert!(matches!(serde_json::from_str::<WsCommand>(r#"{"type":"reset"}"#).unwrap(), WsCommand::Reset));
    }

    #[test]
    fn ws_snapshot_is_tagged() {
        let json = serde_json::to_value(WsResponse::Snapshot(AnimationSnapshot::default())).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["phase"], "idle");
    }
}
