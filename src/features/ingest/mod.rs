/// data-URI 缩略图解码
pub mod data_uri;
pub mod handler;
/// 创建请求的字段校验
pub mod payload;

pub use handler::create_ingest_router;
