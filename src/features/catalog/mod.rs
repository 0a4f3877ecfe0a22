pub mod handler;
pub mod models;
pub mod storage;

pub use handler::create_catalog_router;
pub use storage::CatalogStorage;
