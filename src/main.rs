use std::net::SocketAddr;
use std::sync::Arc;

use pdf_chat::api::{create_router, AppState};
use pdf_chat::application::{ChatService, DocumentService};
use pdf_chat::domain::ports::EmbeddingService;
use pdf_chat::infrastructure::{AppConfig, GeminiChat, LocalEmbedding, PdfTextExtractor};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api=debug,pdf_chat=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load()?;
    AppConfig::require_api_key()?;
    info!(
        model = %config.config.llm.model,
        chunk_size = config.config.chunking.chunk_size.get(),
        "configuration loaded"
    );

    let embedding = Arc::new(LocalEmbedding::from_config(&config.config.embedding)?);
    info!(
        model = %config.config.embedding.model,
        dimension = embedding.dimension(),
        "embedding model configured"
    );
    let documents = Arc::new(DocumentService::with_chunk_size(
        Arc::new(PdfTextExtractor::new()),
        embedding,
        config.config.chunking.chunk_size,
    ));
    let chat = Arc::new(ChatService::new(Arc::new(GeminiChat::new(&config))));

    let addr = SocketAddr::new(config.config.server.host.parse()?, config.config.server.port);
    let app = create_router(AppState::new(config, documents, chat));

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
