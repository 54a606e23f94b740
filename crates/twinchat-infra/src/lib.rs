//! Infrastructure layer for twinchat.
//!
//! Contains implementations of the traits defined in `twinchat-core`:
//! local-filesystem and S3 conversation stores, the Bedrock Converse model
//! provider, AWS request signing, and the persona file loader.

pub mod aws;
pub mod llm;
pub mod persona;
pub mod storage;
