use serde::Serialize;
use serde_json::Value;

use crate::error::ProblemFieldError;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MAX_CONTENT_CHARS: usize = 2000;

/// 评论表行
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub product_id: i64,
    pub user_sub: String,
    pub rating: i64,
    pub content: String,
    pub created_at: String,
}

/// 通过校验的评论载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub rating: i64,
    pub content: String,
}

/// 评论请求体（仅用于 OpenAPI 文档；实际按字段逐个校验）
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
#[schema(example = json!({"rating": 5, "content": "Fits perfectly."}))]
pub struct ReviewRequest {
    /// 评分（1-5）
    pub rating: i64,
    /// 评论内容（最多 2000 字符）
    pub content: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[schema(example = json!({
  "id": 7,
  "product": 3,
  "user": "alice",
  "rating": 5,
  "content": "Fits perfectly.",
  "created_at": "2025-01-10T08:00:00.000Z"
}))]
pub struct ReviewResponse {
    pub id: i64,
    /// 所属商品 ID
    pub product: i64,
    /// 评论者身份（令牌 sub）
    pub user: String,
    pub rating: i64,
    pub content: String,
    pub created_at: String,
}

impl From<ReviewRow> for ReviewResponse {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product: row.product_id,
            user: row.user_sub,
            rating: row.rating,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

impl NewReview {
    /// 逐字段校验原始 JSON，收集全部字段错误后一次性返回
    pub fn validate(payload: &Value) -> Result<Self, Vec<ProblemFieldError>> {
        let Some(obj) = payload.as_object() else {
            return Err(vec![ProblemFieldError::new(
                "non_field_errors",
                "Invalid data. Expected a JSON object.",
            )]);
        };

        let mut errors = Vec::new();

        let rating = match obj.get("rating") {
            None | Some(Value::Null) => {
                errors.push(ProblemFieldError::new("rating", "This field is required."));
                None
            }
            Some(v) => match v.as_i64() {
                Some(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Some(r),
                Some(_) => {
                    errors.push(ProblemFieldError::new(
                        "rating",
                        format!("Ensure this value is between {MIN_RATING} and {MAX_RATING}."),
                    ));
                    None
                }
                None => {
                    errors.push(ProblemFieldError::new("rating", "A valid integer is required."));
                    None
                }
            },
        };

        let content = match obj.get("content") {
            None | Some(Value::Null) => {
                errors.push(ProblemFieldError::new("content", "This field is required."));
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                errors.push(ProblemFieldError::new("content", "This field may not be blank."));
                None
            }
            Some(Value::String(s)) if s.chars().count() > MAX_CONTENT_CHARS => {
                errors.push(ProblemFieldError::new(
                    "content",
                    format!("Ensure this field has no more than {MAX_CONTENT_CHARS} characters."),
                ));
                None
            }
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                errors.push(ProblemFieldError::new("content", "Not a valid string."));
                None
            }
        };

        match (rating, content) {
            (Some(rating), Some(content)) if errors.is_empty() => Ok(Self { rating, content }),
            _ => Err(errors),
        }
    }
}
