//! Chat pipeline logic and port traits for twinchat.
//!
//! This crate defines the "ports" (storage and model provider traits) that
//! the infrastructure layer implements, plus the pipeline that drives one
//! chat turn. It depends only on `twinchat-types` -- never on
//! `twinchat-infra` or any network/filesystem crate.

pub mod chat;
pub mod llm;
pub mod storage;
