use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde_json::Value;

use crate::error::{AppError, NotFoundError};
use crate::extract::JsonBody;
use crate::features::auth::BearerAuthState;
use crate::features::catalog::storage::now_rfc3339;
use crate::state::AppState;

use super::models::{NewReview, ReviewRequest, ReviewResponse};

#[utoipa::path(
    get,
    path = "/products/{category_slug}/{product_slug}/reviews",
    summary = "商品评论列表",
    description = "按提交顺序返回商品的全部评论；商品不存在时返回空列表。",
    params(
        ("category_slug" = String, Path, description = "分类 slug"),
        ("product_slug" = String, Path, description = "商品 slug")
    ),
    responses((status = 200, description = "评论列表", body = [ReviewResponse])),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path((category_slug, product_slug)): Path<(String, String)>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let rows = state
        .storage
        .reviews_for(&category_slug, &product_slug)
        .await?;
    Ok(Json(rows.into_iter().map(ReviewResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/products/{category_slug}/{product_slug}/reviews",
    summary = "提交商品评论",
    description = "需要 Bearer 令牌。依次检查身份、字段校验、商品是否存在，全部通过后写入评论。",
    params(
        ("category_slug" = String, Path, description = "分类 slug"),
        ("product_slug" = String, Path, description = "商品 slug")
    ),
    request_body = ReviewRequest,
    security(("BearerAuth" = [])),
    responses(
        (status = 201, description = "评论已创建", body = ReviewResponse),
        (status = 400, description = "字段校验失败（errors 列出全部失败字段）", body = crate::error::ProblemDetails, content_type = "application/problem+json"),
        (status = 401, description = "缺少或无效的身份凭证", body = crate::error::ProblemDetails, content_type = "application/problem+json"),
        (status = 404, description = "商品不存在", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    auth: BearerAuthState,
    Path((category_slug, product_slug)): Path<(String, String)>,
    body: Result<JsonBody<Value>, AppError>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    // 身份检查先于请求体解析：未认证请求即便载荷非法也返回 401
    let identity = auth.require()?;
    let JsonBody(payload) = body?;
    let review = NewReview::validate(&payload).map_err(AppError::Validation)?;

    let product = state
        .storage
        .product_by_slugs(&category_slug, &product_slug)
        .await?
        .ok_or(NotFoundError::Product {
            category_slug,
            product_slug,
        })?;

    let row = state
        .storage
        .insert_review(product.id, &identity.subject, &review, &now_rfc3339())
        .await?;
    tracing::info!(
        target: "catalog_backend::reviews",
        review_id = row.id,
        product_id = product.id,
        "review created"
    );
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(row))))
}

pub fn create_reviews_router() -> Router<AppState> {
    Router::new().route(
        "/products/:category_slug/:product_slug/reviews",
        get(list_reviews).post(create_review),
    )
}
