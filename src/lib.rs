/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 路由与中间件组装
pub mod app;

/// CORS 层构建
pub mod cors;

/// JSON 请求体提取器
pub mod extract;

/// 功能聚合模块
pub mod features;

/// 媒体文件存储
pub mod media;

/// OpenAPI 文档
pub mod openapi;

/// 请求追踪 ID 中间件
pub mod request_id;

/// 应用状态聚合模块
pub mod state;

/// 优雅退出管理模块
pub mod shutdown;

// 导出常用类型供外部使用
pub use app::build_app;
pub use config::AppConfig;
pub use error::AppError;
pub use shutdown::{ShutdownManager, ShutdownReason};
