pub mod handler;
pub mod models;

pub use handler::create_reviews_router;
