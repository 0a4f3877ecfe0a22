use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求体无法解析（非 JSON / 结构不符）
    #[error("请求体解析错误: {0}")]
    Json(String),

    /// 缺少或无效的身份凭证
    #[error("认证失败: {0}")]
    Auth(String),

    /// 字段级校验失败（评论载荷）
    #[error("参数校验错误")]
    Validation(Vec<ProblemFieldError>),

    /// 按 slug 查找实体未命中
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// 图片上传式创建失败
    #[error("{0}")]
    Ingest(#[from] IngestError),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 查找未命中，携带调用方传入的 slug 以便原样回显
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("分类不存在: {category_slug}")]
    Category { category_slug: String },

    #[error("商品不存在: {category_slug}/{product_slug}")]
    Product {
        category_slug: String,
        product_slug: String,
    },
}

/// 商品/分类创建（含缩略图解码与落盘）错误
#[derive(Error, Debug)]
pub enum IngestError {
    /// 请求体不是合法 JSON 对象
    #[error("invalid request body: {0}")]
    Body(String),

    /// 缺少必需字段
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// 字段类型或取值无效
    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// data-URI 缺少逗号分隔的数据段
    #[error("thumbnail must be a data URI of the form '<meta>,<base64>'")]
    MalformedDataUri,

    /// base64 解码失败或解码结果为空
    #[error("thumbnail could not be decoded: {0}")]
    Decode(String),

    /// 引用的分类不存在
    #[error("category {0} does not exist")]
    UnknownCategory(i64),

    /// 文件写入或记录插入失败
    #[error("failed to store record: {0}")]
    Store(String),
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// 扩展成员：
/// - `errors`：字段级校验错误
/// - `message`：创建类接口的错误文本
/// - `category_slug` / `product_slug`：查找未命中时回显的 slug
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Not Found")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 404)]
    pub status: u16,

    /// 人类可读的详细信息（尽量稳定，不建议依赖解析）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "NOT_FOUND")]
    pub code: String,

    /// 可选：请求追踪 ID。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// 可选：字段级校验错误。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ProblemFieldError>>,

    /// 可选：创建类接口的错误文本。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "category_slug", skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,

    #[serde(rename = "product_slug", skip_serializing_if = "Option::is_none")]
    pub product_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ProblemFieldError {
    /// 字段名
    pub field: String,
    /// 字段错误信息
    pub message: String,
}

impl ProblemFieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Ingest(e) => match e {
                IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Json(_) => "BAD_REQUEST",
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::NotFound(NotFoundError::Category { .. }) => "CATEGORY_NOT_FOUND",
            AppError::NotFound(NotFoundError::Product { .. }) => "PRODUCT_NOT_FOUND",
            AppError::Ingest(e) => match e {
                IngestError::Body(_) => "INGEST_BAD_BODY",
                IngestError::MissingField(_) => "INGEST_MISSING_FIELD",
                IngestError::InvalidField { .. } => "INGEST_INVALID_FIELD",
                IngestError::MalformedDataUri | IngestError::Decode(_) => "INGEST_BAD_IMAGE",
                IngestError::UnknownCategory(_) => "INGEST_UNKNOWN_CATEGORY",
                IngestError::Store(_) => "INGEST_STORE_FAILED",
            },
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let title = self.title().to_string();
        let code = self.stable_code().to_string();
        let detail = Some(self.to_string());

        if status.is_server_error() {
            tracing::error!(code = %code, "{}", self);
        }

        let mut problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title,
            status: status.as_u16(),
            detail,
            code,
            request_id: crate::request_id::current_request_id(),
            errors: None,
            message: None,
            category_slug: None,
            product_slug: None,
        };

        match self {
            AppError::Validation(errors) => problem.errors = Some(errors),
            AppError::NotFound(NotFoundError::Category { category_slug }) => {
                problem.category_slug = Some(category_slug);
            }
            AppError::NotFound(NotFoundError::Product {
                category_slug,
                product_slug,
            }) => {
                problem.category_slug = Some(category_slug);
                problem.product_slug = Some(product_slug);
            }
            AppError::Ingest(e) => problem.message = Some(e.to_string()),
            _ => {}
        }

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
