use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, IngestError};
use crate::extract::JsonBody;
use crate::features::catalog::models::{NewCategory, NewProduct};
use crate::features::catalog::storage::now_rfc3339;
use crate::media::unique_image_name;
use crate::state::AppState;

use super::data_uri::decode_data_uri;
use super::payload::{
    CategoryIngestRequest, CategoryPayload, ProductIngestRequest, ProductPayload, field_names,
};

const PRODUCT_THUMBNAIL_DIR: &str = "products";
const CATEGORY_THUMBNAIL_DIR: &str = "categories";

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[schema(example = json!({"message": "Product created successfully"}))]
pub struct IngestResponse {
    pub message: String,
}

fn body_error(err: AppError) -> IngestError {
    match err {
        AppError::Json(msg) => IngestError::Body(msg),
        other => IngestError::Body(other.to_string()),
    }
}

fn store_error(context: &str, err: impl std::fmt::Display) -> IngestError {
    IngestError::Store(format!("{context}: {err}"))
}

async fn ingest_product(
    state: &AppState,
    body: Result<JsonBody<Value>, AppError>,
) -> Result<i64, IngestError> {
    let JsonBody(raw) = body.map_err(body_error)?;
    tracing::info!(target: "catalog_backend::ingest", fields = ?field_names(&raw), "product ingest received");

    let payload = ProductPayload::parse(&raw)?;
    let bytes = decode_data_uri(&payload.thumbnail)?;

    let exists = state
        .storage
        .category_exists(payload.category_id)
        .await
        .map_err(|e| store_error("lookup category", e))?;
    if !exists {
        return Err(IngestError::UnknownCategory(payload.category_id));
    }

    let filename = unique_image_name("thumbnail");
    let reference = state
        .media
        .save(PRODUCT_THUMBNAIL_DIR, &filename, &bytes)
        .await
        .map_err(|e| store_error("write thumbnail", e))?;

    let record = NewProduct {
        category_id: payload.category_id,
        name: payload.name,
        slug: payload.slug,
        description: payload.description,
        price_cents: payload.price_cents,
        image: payload.image,
        thumbnail: reference.clone(),
    };
    match state.storage.insert_product(&record, &now_rfc3339()).await {
        Ok(id) => Ok(id),
        Err(e) => {
            state.media.remove(&reference).await;
            Err(store_error("insert product", e))
        }
    }
}

async fn ingest_category(
    state: &AppState,
    body: Result<JsonBody<Value>, AppError>,
) -> Result<i64, IngestError> {
    let JsonBody(raw) = body.map_err(body_error)?;
    tracing::info!(target: "catalog_backend::ingest", fields = ?field_names(&raw), "category ingest received");

    let payload = CategoryPayload::parse(&raw)?;
    let bytes = decode_data_uri(&payload.thumbnail)?;

    let filename = unique_image_name("category");
    let reference = state
        .media
        .save(CATEGORY_THUMBNAIL_DIR, &filename, &bytes)
        .await
        .map_err(|e| store_error("write thumbnail", e))?;

    let record = NewCategory {
        name: payload.name,
        slug: payload.slug,
        thumbnail: reference.clone(),
    };
    match state.storage.insert_category(&record, &now_rfc3339()).await {
        Ok(id) => Ok(id),
        Err(e) => {
            state.media.remove(&reference).await;
            Err(store_error("insert category", e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/products/create",
    summary = "创建商品",
    description = "解码 data-URI 缩略图并写入媒体目录，随后插入商品记录。不检查 slug 重复。",
    request_body = ProductIngestRequest,
    responses(
        (status = 201, description = "商品已创建", body = IngestResponse),
        (status = 400, description = "字段缺失/无效、缩略图无法解码或分类不存在", body = crate::error::ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "文件写入或记录插入失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Ingest"
)]
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<JsonBody<Value>, AppError>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    match ingest_product(&state, body).await {
        Ok(id) => {
            tracing::info!(target: "catalog_backend::ingest", product_id = id, "product created");
            Ok((
                StatusCode::CREATED,
                Json(IngestResponse {
                    message: "Product created successfully".into(),
                }),
            ))
        }
        Err(e) => {
            tracing::warn!(target: "catalog_backend::ingest", "product ingest failed: {e}");
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/categories/create",
    summary = "创建分类",
    description = "解码 data-URI 缩略图并写入媒体目录，随后插入分类记录。不检查 slug 重复。",
    request_body = CategoryIngestRequest,
    responses(
        (status = 201, description = "分类已创建", body = IngestResponse),
        (status = 400, description = "字段缺失/无效或缩略图无法解码", body = crate::error::ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "文件写入或记录插入失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Ingest"
)]
pub async fn create_category(
    State(state): State<AppState>,
    body: Result<JsonBody<Value>, AppError>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    match ingest_category(&state, body).await {
        Ok(id) => {
            tracing::info!(target: "catalog_backend::ingest", category_id = id, "category created");
            Ok((
                StatusCode::CREATED,
                Json(IngestResponse {
                    message: "Category created successfully".into(),
                }),
            ))
        }
        Err(e) => {
            tracing::warn!(target: "catalog_backend::ingest", "category ingest failed: {e}");
            Err(e.into())
        }
    }
}

pub fn create_ingest_router() -> Router<AppState> {
    Router::new()
        .route("/products/create", post(create_product))
        .route("/categories/create", post(create_category))
}
