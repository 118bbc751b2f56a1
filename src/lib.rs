//! Static asset server for pre-built web bundles (HTML, JavaScript, WebAssembly).
//!
//! Every request path is joined onto a configured root directory, the file's
//! extension picks the `Content-Type`, and each response allows any origin.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
