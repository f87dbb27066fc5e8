use axum::{routing::{get, post}, Router};
use contractor_quote_rust::{api, create_pool, AppConfig, QuoteService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let service = Arc::new(QuoteService::new(pool, config.engine.clone()));

    let quote_routes = Router::new()
        .route("/api/quote/generate", post(api::generate_quote))
        .route("/api/quote/preview/batch", post(api::preview_batch))
        .route("/api/quote/:quote_no/csv", get(api::export_quote_csv))
        .with_state(service);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(quote_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/quote/generate        - description -> quotation draft");
    info!("  POST /api/quote/preview/batch   - parallel preview, not saved");
    info!("  GET  /api/quote/:quote_no/csv   - export saved quotation");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
