//! Request handler module
//!
//! Responsible for request routing dispatch and the file endpoints.

pub mod files;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
