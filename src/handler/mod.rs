//! Request handler module
//!
//! Responsible for request routing dispatch and the vote API handlers.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
