use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// 已认证的调用方身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

/// 请求携带的认证结果。
///
/// 提取器本身从不拒绝请求：是否要求认证由处理函数在入口处通过 [`BearerAuthState::require`] 决定。
#[derive(Debug, Clone, Default)]
pub enum BearerAuthState {
    #[default]
    Absent,
    Valid(Identity),
    Invalid(String),
}

impl BearerAuthState {
    /// 从请求头解析并校验 Bearer 令牌
    pub fn from_headers(headers: &HeaderMap, cfg: &AuthConfig) -> Self {
        if headers.get(header::AUTHORIZATION).is_none() {
            return Self::Absent;
        }
        match extract_bearer_token(headers).and_then(|token| decode_access_token(&token, cfg)) {
            Ok(claims) => Self::Valid(Identity {
                subject: claims.sub,
            }),
            Err(e) => Self::Invalid(e.to_string()),
        }
    }

    /// 要求已认证身份；缺失或无效均返回 401
    pub fn require(&self) -> Result<&Identity, AppError> {
        match self {
            Self::Valid(identity) => Ok(identity),
            Self::Absent => Err(AppError::Auth("缺少身份凭证".into())),
            Self::Invalid(msg) => Err(AppError::Auth(msg.clone())),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BearerAuthState {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Self::from_headers(&parts.headers, &state.auth);
        if let Self::Invalid(reason) = &auth {
            tracing::debug!(target: "catalog_backend::auth", "bearer rejected: {reason}");
        }
        Ok(auth)
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Auth("缺少 Authorization 头".into()))?;
    let token = raw
        .trim()
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Authorization 必须使用 Bearer 方案".into()))?
        .trim();
    if token.is_empty() {
        return Err(AppError::Auth("Bearer token 不能为空".into()));
    }
    Ok(token.to_string())
}

fn signing_secret(cfg: &AuthConfig) -> Result<String, AppError> {
    cfg.resolve_secret().ok_or_else(|| {
        AppError::Internal("auth.jwt_secret 未配置（可通过 APP_AUTH_JWT_SECRET 设置）".into())
    })
}

pub fn decode_access_token(token: &str, cfg: &AuthConfig) -> Result<AccessClaims, AppError> {
    let secret = signing_secret(cfg)?;
    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_issuer(&[cfg.jwt_issuer.as_str()]);
    validation.set_audience(&[cfg.jwt_audience.as_str()]);
    let data = jsonwebtoken::decode::<AccessClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Auth("访问令牌无效或已过期".into()))?;
    Ok(data.claims)
}

/// 为 `subject` 签发访问令牌；`ttl_secs` 为 None 时使用配置的默认有效期
pub fn issue_access_token(
    cfg: &AuthConfig,
    subject: &str,
    ttl_secs: Option<u64>,
) -> Result<String, AppError> {
    if subject.trim().is_empty() {
        return Err(AppError::Auth("subject 不能为空".into()));
    }
    let secret = signing_secret(cfg)?;
    let now = chrono::Utc::now().timestamp();
    let ttl = i64::try_from(ttl_secs.unwrap_or(cfg.token_ttl_secs)).unwrap_or(i64::MAX / 2);
    let claims = AccessClaims {
        sub: subject.to_string(),
        iss: cfg.jwt_issuer.clone(),
        aud: cfg.jwt_audience.clone(),
        iat: now,
        exp: now.saturating_add(ttl),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("签发令牌失败: {e}")))
}
