pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod host;
pub mod humanize;
pub mod mime_types;
pub mod observability;
pub mod pipeline;
pub mod transport;
