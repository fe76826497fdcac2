//! URL Guard API Server
//!
//! HTTP front end for the URL risk engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      URL GUARD API                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐ │
//! │  │  Router   │→ │  Analyzer    │→ │  Model calls         │ │
//! │  │  (Axum)   │  │  (features,  │  │  (blocking pool,     │ │
//! │  │           │  │   trust)     │  │   shared deadline)   │ │
//! │  └───────────┘  └──────┬───────┘  └──────────┬───────────┘ │
//! │                        └──── vote + score ◄───┘             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod inference;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use urlguard_core::{Analyzer, ModelRegistry, TrustedDomains};

use inference::Stragglers;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "urlguard_server=debug,urlguard_core=info,tower_http=debug".into()))
        .with((!production).then(|| tracing_subscriber::fmt::layer()))
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    tracing::info!("URL Guard API starting ({})...", config.environment);
    tracing::info!("Model manifest: {}", config.model_manifest.display());

    // Models and trusted list are loaded once and never change while serving
    let analyzer = build_analyzer(&config);
    tracing::info!(
        "✓ {} models ready: {:?}",
        analyzer.models().len(),
        analyzer.models().names()
    );

    let state = AppState {
        stragglers: Arc::new(Stragglers::for_registry(analyzer.models())),
        analyzer: Arc::new(analyzer),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub stragglers: Arc<Stragglers>,
    pub config: config::Config,
}

fn build_analyzer(config: &config::Config) -> Analyzer {
    let models = ModelRegistry::load_manifest(&config.model_manifest);

    let trusted = match &config.trusted_domains_file {
        Some(path) => TrustedDomains::builtin_with_file(path).unwrap_or_else(|e| {
            tracing::warn!("Trusted domains file {} unreadable: {} - using built-in list", path.display(), e);
            TrustedDomains::builtin()
        }),
        None => TrustedDomains::builtin(),
    };
    tracing::info!("{} trusted domains", trusted.len());

    Analyzer::new(models, trusted)
}

fn cors_layer(config: &config::Config) -> CorsLayer {
    let origin = match config.client_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            tracing::warn!("CLIENT_URL is not a valid origin ({}) - allowing any origin", e);
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/analyze", post(handlers::analyze::analyze))
        .route("/api/v1/models", get(handlers::models::list))
        .route("/api/v1/features", get(handlers::features::describe))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use urlguard_core::logic::model::HeuristicModel;
    use urlguard_core::{ClassifierModel, FeatureVector, Label, ModelError};

    struct Fixed(Label);

    impl ClassifierModel for Fixed {
        fn technology(&self) -> &'static str {
            "fixed"
        }

        fn predict_label(&self, _features: &FeatureVector) -> Result<Label, ModelError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl ClassifierModel for Failing {
        fn technology(&self) -> &'static str {
            "failing"
        }

        fn predict_label(&self, _features: &FeatureVector) -> Result<Label, ModelError> {
            Err(ModelError::Inference("unsupported input".to_string()))
        }
    }

    fn test_state() -> AppState {
        let models = ModelRegistry::new()
            .with_model("heuristic", Arc::new(HeuristicModel::default()))
            .with_model("benign", Arc::new(Fixed(Label::Benign)))
            .with_model("broken", Arc::new(Failing));
        let mut trusted = TrustedDomains::builtin();
        trusted.extend(["example.com"]);

        AppState {
            stragglers: Arc::new(Stragglers::for_registry(&models)),
            analyzer: Arc::new(Analyzer::new(models, trusted)),
            config: config::Config::default(),
        }
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn analyze_request(body: serde_json::Value) -> Request<Body> {
        Request::post("/api/v1/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_models() {
        let app = create_router(test_state());
        let req = Request::get("/health").body(Body::empty()).unwrap();

        let resp = tokio_test::assert_ok!(app.oneshot(req).await);
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["modelsLoaded"], 3);
        assert_eq!(body["modelNames"][0], "heuristic");
        assert_eq!(body["featureLayout"]["featureCount"], 20);
    }

    #[tokio::test]
    async fn test_analyze_untrusted_url() {
        let app = create_router(test_state());
        let req = analyze_request(serde_json::json!({ "url": "http://192.168.10.4/bank/login" }));

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["url"], "http://192.168.10.4/bank/login");
        assert_eq!(body["protocol"], "http");
        assert_eq!(body["isTrusted"], false);
        assert_eq!(body["features"]["use_of_ip"], 1);
        assert_eq!(body["prediction"]["totalModels"], 3);
        assert_eq!(body["prediction"]["votingModels"], 2);
        assert_eq!(body["prediction"]["perModel"][2]["predictedLabel"], "error");
        assert_eq!(body["prediction"]["trustedDomainOverride"], false);
        assert_eq!(body["explanation"][0], "⚠ HTTP connection - no encryption.");
        assert_eq!(body["explanation"][2], "⚠ URL uses IP address instead of domain name.");
    }

    #[tokio::test]
    async fn test_analyze_trusted_domain() {
        let app = create_router(test_state());
        let req = analyze_request(serde_json::json!({ "url": "http://example.com/x" }));

        let resp = app.oneshot(req).await.unwrap();
        let body = json_body(resp).await;

        assert_eq!(body["isTrusted"], true);
        assert_eq!(body["prediction"]["trustedDomainOverride"], true);
        assert_eq!(body["prediction"]["finalLabel"], "benign");
        assert_eq!(body["prediction"]["confidencePercent"], 99.0);
        assert_eq!(body["safetyScore"], 95);
    }

    #[tokio::test]
    async fn test_analyze_empty_url_is_bad_request() {
        let app = create_router(test_state());

        for payload in [serde_json::json!({ "url": "   " }), serde_json::json!({})] {
            let resp = app.clone().oneshot(analyze_request(payload)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body = json_body(resp).await;
            assert_eq!(body["error"], "url is required");
            assert_eq!(body["status"], 400);
        }
    }

    #[tokio::test]
    async fn test_analyze_oversized_url_is_bad_request() {
        let app = create_router(test_state());
        let url = format!("https://example.org/{}", "a".repeat(8200));

        let resp = app.oneshot(analyze_request(serde_json::json!({ "url": url }))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = json_body(resp).await;
        assert_eq!(body["error"], "url is too long");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_bad_request() {
        let app = create_router(test_state());
        let bad_bodies = [
            ("application/json", "{\"url\": "),
            ("application/json", "{\"url\": 42}"),
            ("text/plain", "https://example.org"),
        ];

        for (content_type, payload) in bad_bodies {
            let req = Request::post("/api/v1/analyze")
                .header("content-type", content_type)
                .body(Body::from(payload))
                .unwrap();

            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", payload);

            let body = json_body(resp).await;
            assert_eq!(body["status"], 400);
            assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));
        }
    }

    #[tokio::test]
    async fn test_models_listing() {
        let app = create_router(test_state());
        let req = Request::get("/api/v1/models").body(Body::empty()).unwrap();

        let body = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["models"], serde_json::json!(["heuristic", "benign", "broken"]));
        assert_eq!(body["details"][0]["technology"], "heuristic");
    }

    #[tokio::test]
    async fn test_features_listing() {
        let app = create_router(test_state());
        let req = Request::get("/api/v1/features").body(Body::empty()).unwrap();

        let body = json_body(app.oneshot(req).await.unwrap()).await;
        assert_eq!(body["features"].as_array().unwrap().len(), 20);
        assert_eq!(body["features"][2]["name"], "count.");
        assert_eq!(body["chartFeatures"].as_array().unwrap().len(), 11);
        assert_eq!(body["maxUrlLength"], 8192);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = create_router(test_state());
        let req = Request::get("/api/predict").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["status"], 404);
    }
}
