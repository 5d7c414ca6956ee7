pub mod response;
pub mod trace;

pub use response::{ApiResponse, ApiResult};
pub use trace::request_span;
