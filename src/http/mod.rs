//! HTTP protocol layer module
//!
//! Response builders and CORS handling, decoupled from the route handlers.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_created_response, build_error_response, build_json_response,
    build_options_response, with_cors, PROJECTS_CACHE_CONTROL,
};
