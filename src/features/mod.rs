/// Bearer 身份认证
pub mod auth;
/// 商品与分类查询
pub mod catalog;
/// 健康检查
pub mod health;
/// 带缩略图的商品/分类创建
pub mod ingest;
/// 商品评论
pub mod reviews;
