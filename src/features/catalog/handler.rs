use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};

use crate::error::{AppError, NotFoundError};
use crate::state::AppState;

use super::models::{CategoryResponse, ProductResponse, SearchRequest, SearchResponse};

/// 首页分类数量上限
pub const TOP_CATEGORIES_LIMIT: i64 = 8;

#[utoipa::path(
    get,
    path = "/products",
    summary = "最新商品",
    description = "返回全部商品，按创建时间倒序（同一时间按 ID 倒序）。",
    responses(
        (status = 200, description = "商品列表", body = [ProductResponse]),
        (status = 500, description = "存储查询失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Catalog"
)]
pub async fn list_latest_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let rows = state.storage.list_latest_products().await?;
    Ok(Json(ProductResponse::from_rows(rows, &state.media)))
}

#[utoipa::path(
    get,
    path = "/categories",
    summary = "首页分类",
    description = "按名称排序返回最多 8 个分类。",
    responses(
        (status = 200, description = "分类列表", body = [CategoryResponse]),
        (status = 500, description = "存储查询失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Catalog"
)]
pub async fn list_top_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let rows = state.storage.top_categories(TOP_CATEGORIES_LIMIT).await?;
    let items = rows
        .into_iter()
        .map(|r| CategoryResponse::from_row(r, &state.media))
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/products/{category_slug}/{product_slug}",
    summary = "商品详情",
    params(
        ("category_slug" = String, Path, description = "分类 slug"),
        ("product_slug" = String, Path, description = "商品 slug")
    ),
    responses(
        (status = 200, description = "商品详情", body = ProductResponse),
        (status = 404, description = "商品不存在（回显 category_slug / product_slug）", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Catalog"
)]
pub async fn get_product_detail(
    State(state): State<AppState>,
    Path((category_slug, product_slug)): Path<(String, String)>,
) -> Result<Json<ProductResponse>, AppError> {
    match state
        .storage
        .product_by_slugs(&category_slug, &product_slug)
        .await?
    {
        Some(row) => Ok(Json(ProductResponse::from_row(row, &state.media))),
        None => Err(NotFoundError::Product {
            category_slug,
            product_slug,
        }
        .into()),
    }
}

#[utoipa::path(
    get,
    path = "/categories/{category_slug}",
    summary = "分类详情",
    params(("category_slug" = String, Path, description = "分类 slug")),
    responses(
        (status = 200, description = "分类详情", body = CategoryResponse),
        (status = 404, description = "分类不存在（回显 category_slug）", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Catalog"
)]
pub async fn get_category_detail(
    State(state): State<AppState>,
    Path(category_slug): Path<String>,
) -> Result<Json<CategoryResponse>, AppError> {
    let row = state
        .storage
        .category_by_slug(&category_slug)
        .await?
        .ok_or(NotFoundError::Category {
            category_slug: category_slug.clone(),
        })?;
    Ok(Json(CategoryResponse::from_row(row, &state.media)))
}

#[utoipa::path(
    post,
    path = "/search",
    summary = "商品搜索",
    description = "按名称或描述做大小写不敏感的子串匹配；query 为空、null、缺省或请求体为空时返回空列表。",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "匹配的商品", body = SearchResponse),
        (status = 400, description = "请求体不是合法 JSON", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Catalog"
)]
pub async fn search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SearchResponse>, AppError> {
    // 不要求 Content-Type；空请求体按空查询处理
    let req = SearchRequest::from_body(&body).map_err(|e| AppError::Json(e.to_string()))?;
    let rows = state.storage.search_products(req.query()).await?;
    tracing::debug!(target: "catalog_backend::catalog", query = %req.query(), hits = rows.len(), "product search");
    Ok(Json(SearchResponse {
        products: ProductResponse::from_rows(rows, &state.media),
    }))
}

pub fn create_catalog_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_latest_products))
        .route("/categories", get(list_top_categories))
        .route("/search", post(search))
        .route("/products/:category_slug/:product_slug", get(get_product_detail))
        .route("/categories/:category_slug", get(get_category_detail))
}
