//! Chat pipeline: conversation repository, context assembly, per-session
//! locking, and the service that runs one turn end to end.

pub mod context;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod session_lock;
