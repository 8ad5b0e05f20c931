// Advisor API server
// Decision: A missing GEMINI_API_KEY degrades gracefully - the server starts
// and chat routes answer 503 until the provider is configured

mod chat;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use advisor_core::{
    Advisor, ChatMessage, ChatProvider, ChatRole, EnrichedProduct, ProductStore, SearchEngine,
    SessionHistory, SessionStatus, SessionStore, StartReply, TurnReply,
};
use advisor_gemini::GeminiProvider;
use advisor_search::SearchServiceClient;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    advisor_ready: bool,
}

async fn health(
    axum::extract::State(ready): axum::extract::State<bool>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        advisor_ready: ready,
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        chat::start_chat,
        chat::send_message,
        chat::get_history,
        chat::delete_session,
    ),
    components(
        schemas(
            StartReply, TurnReply, SessionHistory,
            ChatMessage, ChatRole, SessionStatus,
            EnrichedProduct,
            chat::SendMessageRequest,
            chat::DeleteResponse,
        )
    ),
    tags(
        (name = "chat", description = "Conversational product advisor endpoints")
    ),
    info(
        title = "Advisor API",
        version = "0.1.0",
        description = "Conversational product advisor over hybrid search",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("advisor-api starting...");

    // Search service binding
    let search_url =
        std::env::var("SEARCH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8001".into());
    tracing::info!(url = %search_url, "Search service configured");
    let search_client = Arc::new(SearchServiceClient::new(search_url));

    // Chat provider (optional - gracefully degrade if not configured)
    let advisor = match GeminiProvider::new() {
        Ok(provider) => {
            tracing::info!(model = %provider.model(), "Gemini provider initialized");
            let advisor = Advisor::new(
                Arc::new(provider) as Arc<dyn ChatProvider>,
                search_client.clone() as Arc<dyn SearchEngine>,
                search_client as Arc<dyn ProductStore>,
                Arc::new(SessionStore::new()),
            );
            Some(Arc::new(advisor))
        }
        Err(e) => {
            tracing::warn!(
                "Chat provider not configured (GEMINI_API_KEY not set): {}. Chat routes disabled.",
                e
            );
            None
        }
    };
    let advisor_ready = advisor.is_some();

    let chat_state = chat::AppState { advisor };

    // Load CORS allowed origins from environment (optional)
    // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    let app = Router::new()
        .route("/health", get(health).with_state(advisor_ready))
        .merge(chat::routes(chat_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
