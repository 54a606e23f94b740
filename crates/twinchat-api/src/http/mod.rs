//! HTTP/REST API layer for twinchat.
//!
//! Axum routes for chatting and reading history, with CORS and request
//! tracing. Errors render as `{ "detail", "code" }`.

pub mod error;
pub mod handlers;
pub mod router;
