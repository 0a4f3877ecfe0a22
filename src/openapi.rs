use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::{Modify, OpenApi};

/// 在 OpenAPI 中注入 Bearer JWT 的安全定义（评论提交接口使用）。
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// 为 Swagger UI 提供正确的“业务接口前缀”Servers 配置。
///
/// - 业务接口默认前缀为 `/api/v1`（对应 `config.api.prefix` / `APP_API__PREFIX`）。
/// - `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api/v1）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api/v1")
                    .description(Some("业务接口前缀：对应 config.api.prefix")),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health 等不带前缀接口）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::catalog::handler::list_latest_products,
        crate::features::catalog::handler::list_top_categories,
        crate::features::catalog::handler::get_product_detail,
        crate::features::catalog::handler::get_category_detail,
        crate::features::catalog::handler::search,
        crate::features::reviews::handler::list_reviews,
        crate::features::reviews::handler::create_review,
        crate::features::ingest::handler::create_product,
        crate::features::ingest::handler::create_category,
    ),
    components(schemas(
        crate::error::ProblemDetails,
        crate::error::ProblemFieldError,
        crate::features::health::handler::HealthResponse,
        crate::features::catalog::models::ProductResponse,
        crate::features::catalog::models::CategoryResponse,
        crate::features::catalog::models::SearchRequest,
        crate::features::catalog::models::SearchResponse,
        crate::features::reviews::models::ReviewRequest,
        crate::features::reviews::models::ReviewResponse,
        crate::features::ingest::payload::ProductIngestRequest,
        crate::features::ingest::payload::CategoryIngestRequest,
        crate::features::ingest::handler::IngestResponse,
    )),
    modifiers(&BearerSecurity, &ApiServers),
    tags(
        (name = "Catalog", description = "商品目录：最新商品、首页分类、详情与搜索。"),
        (name = "Reviews", description = "商品评论：列表与（需认证的）提交。"),
        (name = "Ingest", description = "创建商品/分类：解码 data-URI 缩略图并落盘。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Catalog Backend API",
        version = env!("CARGO_PKG_VERSION"),
        description = "商品目录后端 API（Axum + utoipa）。注意：除 /health 外，其余业务接口实际挂载在 `config.api.prefix`（默认 /api/v1）下，OpenAPI 的 paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_every_catalog_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/health",
            "/products",
            "/categories",
            "/products/{category_slug}/{product_slug}",
            "/categories/{category_slug}",
            "/products/{category_slug}/{product_slug}/reviews",
            "/search",
            "/products/create",
            "/categories/create",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}
