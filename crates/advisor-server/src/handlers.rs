//! HTTP Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use portfolio_advisor::{
    Holding, PipelineError, PortfolioAnalysis, ResolveError, RiskTolerance, report_filename,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_connected: bool,
    pub price_oracle: String,
    pub price_oracle_healthy: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// Used in the download filename
    #[serde(default)]
    pub name: Option<String>,
    /// Missing or `null` means medium
    #[serde(default)]
    pub risk_tolerance: Option<RiskTolerance>,
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub company_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub symbol: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Error rendered as `{error, code}` JSON
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.into(),
            }),
        )
            .into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let (status, code) = match &err {
            PipelineError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            PipelineError::PriceLookup(_) => (StatusCode::BAD_GATEWAY, "PRICE_LOOKUP_FAILED"),
            PipelineError::Recommendation(_) => (StatusCode::BAD_GATEWAY, "RECOMMENDATION_FAILED"),
            PipelineError::ReportGeneration(_) => (StatusCode::BAD_GATEWAY, "REPORT_GENERATION_FAILED"),
            PipelineError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_FAILED"),
        };
        if status.is_server_error() {
            tracing::error!(stage = err.stage(), "Pipeline failed: {}", err);
        } else {
            tracing::debug!(stage = err.stage(), "Rejected request: {}", err);
        }
        Self {
            status,
            code,
            message: err.user_message(),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let (status, code) = match &err {
            ResolveError::EmptyName => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_NAME"),
            ResolveError::Unrecognized(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNRECOGNIZED_SYMBOL"),
            ResolveError::Completion(e) => {
                tracing::error!("Symbol resolution failed: {}", e);
                (StatusCode::BAD_GATEWAY, "LLM_FAILED")
            }
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        Self {
            status: rejection.status(),
            code: "INVALID_REQUEST",
            message: rejection.body_text(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let oracle = state.pipeline.oracle();
    let (llm_connected, price_oracle_healthy) =
        tokio::join!(state.provider.health_check(), oracle.health_check());

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        llm_connected: llm_connected.unwrap_or(false),
        price_oracle: oracle.name().to_string(),
        price_oracle_healthy,
    })
}

/// Price and analyze holdings without generating a report
pub async fn analysis_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<PortfolioAnalysis>, ApiError> {
    let Json(payload) = payload?;
    let analysis = state.pipeline.analyze_holdings(&payload.holdings).await?;
    Ok(Json(analysis))
}

/// Run the full pipeline and return the PDF as a download
pub async fn report_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let risk_tolerance = payload.risk_tolerance.unwrap_or_default();
    let pdf = state.pipeline.run_to_pdf(&payload.holdings, &risk_tolerance).await?;

    let today = chrono::Local::now().date_naive();
    let filename = report_filename(payload.name.as_deref().unwrap_or_default(), today);
    tracing::info!(%filename, bytes = pdf.len(), "Report generated");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        pdf,
    )
        .into_response())
}

/// Company name to ticker symbol
pub async fn resolve_symbol_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let Json(payload) = payload?;
    let symbol = state.resolver.resolve(&payload.company_name).await?;
    Ok(Json(ResolveResponse { symbol }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use llm_core::{Completion, GenerationOptions, LlmProvider, Message, ProviderInfo, TextCompletion};
    use portfolio_advisor::{
        PageLayout, PipelineConfig, Recommender, ReportComposer, ReportPipeline, StaticPriceOracle, SymbolResolver,
    };
    use tower::ServiceExt;

    use super::*;

    /// Answers every prompt from a fixed table keyed on prompt content
    struct CannedProvider;

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "Canned".into(),
                default_model: "canned-1".into(),
            }
        }

        async fn health_check(&self) -> llm_core::Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> llm_core::Result<Completion> {
            let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
            let content = if prompt.contains("ticker symbol") {
                "AAPL"
            } else if prompt.contains("one-page report") {
                "# Portfolio Report\n**Total value:** $1,500"
            } else {
                "**Diversify** beyond technology"
            };
            Ok(Completion {
                content: content.into(),
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    fn test_app() -> axum::Router {
        let provider: Arc<dyn LlmProvider> = Arc::new(CannedProvider);
        let completion = TextCompletion::with_default_model(provider.clone(), Duration::from_secs(5));
        let pipeline = ReportPipeline::new(
            Arc::new(StaticPriceOracle::demo()),
            Recommender::new(completion.clone()),
            ReportComposer::new(completion.clone(), PageLayout::default()),
            PipelineConfig::default(),
        );
        crate::app(AppState {
            provider,
            pipeline: Arc::new(pipeline),
            resolver: Arc::new(SymbolResolver::new(completion)),
        })
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["llm_connected"], true);
        assert_eq!(body["price_oracle"], "static");
        assert_eq!(body["price_oracle_healthy"], true);
    }

    #[tokio::test]
    async fn test_analysis() {
        let request = post(
            "/api/analysis",
            r#"{"holdings": [{"symbol": "AAPL", "quantity": 10, "purchase_price": 120}]}"#,
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["total_invested"], "1200");
        assert_eq!(body["details"][0]["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_invalid_holding_is_422() {
        let request = post(
            "/api/analysis",
            r#"{"holdings": [{"symbol": "AAPL", "quantity": -1, "purchase_price": 120}]}"#,
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        for body in [
            r#"{"holdings": [{"symbol": "AAPL", "quantity": "ten", "purchase_price": 120}]}"#,
            r#"{"holdings": ["#,
        ] {
            let response = test_app().oneshot(post("/api/analysis", body)).await.unwrap();
            assert!(response.status().is_client_error());

            let body = json_body(response).await;
            assert_eq!(body["code"], "INVALID_REQUEST");
            assert!(!body["error"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_null_risk_tolerance_defaults() {
        let request = post(
            "/api/report",
            r#"{"risk_tolerance": null,
                "holdings": [{"symbol": "AAPL", "quantity": 10, "purchase_price": 120}]}"#,
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    }

    #[tokio::test]
    async fn test_report_download() {
        let request = post(
            "/api/report",
            r#"{"name": "alice", "risk_tolerance": "high",
                "holdings": [{"symbol": "AAPL", "quantity": 10, "purchase_price": 120}]}"#,
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");

        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"alice_Report_"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_resolve_symbol() {
        let response = test_app()
            .oneshot(post("/api/resolve-symbol", r#"{"company_name": "Apple"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["symbol"], "AAPL");

        let response = test_app()
            .oneshot(post("/api/resolve-symbol", r#"{"company_name": "  "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["code"], "EMPTY_NAME");
    }
}
