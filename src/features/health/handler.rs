use axum::{http::StatusCode, response::Json};
use serde::Serialize;

/// 目录服务的健康检查响应。
///
/// `service` 固定为本 crate 包名 `catalog-backend`，`version` 取自 Cargo.toml；
/// 不探测数据库与媒体目录，进程能处理请求即视为 healthy。
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    #[schema(example = "healthy")]
    pub status: String,
    /// 服务名称
    #[schema(example = "catalog-backend")]
    pub service: String,
    /// 当前版本（Cargo package version）
    #[schema(example = "0.1.0")]
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "用于探活的健康检查端点，返回服务状态与版本信息。",
    responses((status = 200, description = "服务健康", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::health_check;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn reports_healthy_with_package_identity() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "catalog-backend");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
