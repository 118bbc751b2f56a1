//! Request handler module
//!
//! A single catch-all route that hands every GET/HEAD request to the asset responder.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
