//! Data models for extracted documents and configuration.

pub mod config;
pub mod document;
pub mod invoice;
pub mod vendor;
