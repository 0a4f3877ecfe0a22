/// Bearer JWT 身份解析与令牌签发
pub mod bearer;

pub use bearer::{BearerAuthState, Identity};
