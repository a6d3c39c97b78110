pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod media;
pub mod models;
pub mod notifications;
pub mod search;
pub mod store;
pub mod telemetry;
pub mod websocket;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::UdagramConfig;
pub use errors::{Result, UdagramError};
pub use telemetry::{BatchMetrics, init_tracing};
