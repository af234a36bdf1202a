// region:    --- Imports
use auction_marketplace::config::Config;
use auction_marketplace::database::DatabaseManager;
use auction_marketplace::handlers::{self, AppState};
use auction_marketplace::store::{EntityStore, MemoryStore, PgStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    info!("{:<12} --> 설정 로드: bind={}", "Main", config.bind_addr);

    // 저장소 선택 (DATABASE_URL 유무)
    let store: Arc<dyn EntityStore> = match DatabaseManager::from_config(&config).await? {
        Some(db_manager) => {
            if config.init_schema {
                if let Err(e) = db_manager.initialize_database().await {
                    error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                    return Err(e.into());
                }
                info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            }
            Arc::new(PgStore::new(Arc::new(db_manager)))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 미설정: 메모리 저장소로 실행합니다",
                "Main"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let routes_all = handlers::routes(AppState::new(store));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
