use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::features::{catalog, health, ingest, reviews};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

pub fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // 排除图片、流式响应与常见二进制下载；保留默认的最小大小阈值（32B）
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
        .and(NotForContentType::const_new("application/zip"))
        .and(NotForContentType::const_new("application/gzip"))
        .and(NotForContentType::const_new("video/"))
        .and(NotForContentType::const_new("audio/"))
}

/// 业务路由（不含前缀），供 [`build_app`] 挂载到 `config.api.prefix`
pub fn api_router() -> Router<AppState> {
    Router::<AppState>::new()
        .merge(catalog::create_catalog_router())
        .merge(reviews::create_reviews_router())
        .merge(ingest::create_ingest_router())
}

/// 组装完整应用：健康检查、业务接口、媒体静态文件、API 文档以及全局中间件
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let media_root = state.media.root().to_path_buf();

    let mut app = Router::<AppState>::new()
        .route("/health", get(health::handler::health_check))
        .nest(&config.api.prefix, api_router())
        .nest_service(&config.media.url_prefix, ServeDir::new(media_root))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    app = app.layer(axum::middleware::from_fn(request_id_middleware));

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(CompressionLayer::new().compress_when(compression_predicate()))
}

#[cfg(test)]
mod compression_predicate_tests {
    use super::compression_predicate;
    use axum::body::Body;
    use axum::http::{Response as HttpResponse, header};
    use tower_http::compression::predicate::Predicate;

    fn should_compress_for(ct: &str) -> bool {
        let body_bytes = vec![b'x'; 2048];
        let resp = HttpResponse::builder()
            .header(header::CONTENT_TYPE, ct)
            .body(Body::from(body_bytes))
            .unwrap();
        compression_predicate().should_compress(&resp)
    }

    #[test]
    fn json_responses_are_compressed() {
        assert!(should_compress_for("application/json"));
        assert!(should_compress_for("application/problem+json"));
    }

    #[test]
    fn thumbnails_and_binary_downloads_are_not_compressed() {
        assert!(!should_compress_for("image/png"));
        assert!(!should_compress_for("application/octet-stream"));
        assert!(!should_compress_for("text/event-stream"));
    }
}
