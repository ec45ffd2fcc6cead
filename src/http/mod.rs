//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from file-serving logic.

pub mod body;
pub mod mime;
pub mod query;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use query::QueryParams;
pub use response::{
    build_404_response, build_405_response, build_413_response, build_attachment_response,
    build_error_response, build_health_response, build_json_response, build_options_response,
};
