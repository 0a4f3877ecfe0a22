use catalog_backend::features::catalog::CatalogStorage;
use catalog_backend::media::MediaStore;
use catalog_backend::state::AppState;
use catalog_backend::{AppConfig, ShutdownManager, build_app};

#[tokio::main]
async fn main() {
    // 配置先于日志加载：日志级别本身来自配置
    if let Err(e) = AppConfig::init_global() {
        eprintln!("Config init failed: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::global();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    // 创建优雅退出管理器
    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    if config.auth.resolve_secret().is_none() {
        tracing::error!("auth.jwt_secret 未配置（可通过 APP_AUTH_JWT_SECRET 设置），拒绝启动");
        std::process::exit(1);
    }

    let storage = match CatalogStorage::connect_sqlite(
        &config.database.sqlite_path,
        config.database.sqlite_wal,
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("数据库连接失败: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = storage.init_schema().await {
        tracing::error!("数据库初始化失败: {}", e);
        std::process::exit(1);
    }
    let pool = storage.pool.clone();

    let media_root = config.media_path();
    if let Err(e) = tokio::fs::create_dir_all(&media_root).await {
        tracing::error!("创建媒体目录失败 {:?}: {}", media_root, e);
        std::process::exit(1);
    }

    let app_state = AppState::new(
        storage,
        MediaStore::from_config(&config.media),
        config.auth.clone(),
    );
    let app = build_app(app_state, config);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Catalog API: http://{}{}", addr, config.api.prefix);
    tracing::info!("Media: {:?} -> {}", media_root, config.media.url_prefix);

    let shutdown_timeout = config.shutdown.timeout_duration();
    let signal_manager = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = signal_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    // 退出信号之后，在途请求最多再等待 timeout_secs
    let server = tokio::spawn(async move { graceful.await });
    let result = tokio::select! {
        joined = server => Some(joined),
        _ = async {
            shutdown_manager.wait_for_shutdown().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => None,
    };

    match result {
        Some(Ok(Ok(()))) => tracing::info!("HTTP服务器已关闭"),
        Some(Ok(Err(e))) => {
            tracing::error!("服务器运行错误: {}", e);
            pool.close().await;
            std::process::exit(1);
        }
        Some(Err(e)) => tracing::error!("服务器任务异常退出: {}", e),
        None => tracing::warn!("优雅退出超时（{}秒），强制退出", config.shutdown.timeout_secs),
    }

    pool.close().await;
    tracing::info!("服务器已优雅关闭");
}
