pub mod action_token;
pub mod age;
pub mod auth;
pub mod error;
pub mod json;
pub mod jwt;
pub mod logging;
pub mod response;

pub use error::AppError;
pub use json::AppJson;
pub use response::BaseResponse;
pub use response::ErrorResponse;
