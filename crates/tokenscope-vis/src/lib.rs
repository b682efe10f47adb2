//! Tokenscope Visualization
//!
//! Serves the token tables, contrast badges and the cascade animation to a
//! browser.
//!
//! # Architecture
//!
//! - **REST API**: tokens, pairings, ad-hoc contrast checks, cascade control
//! - **WebSocket**: streams an animation snapshot on every cascade change
//! - **Config**: environment driven, see [`VisConfig::from_env`]
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisConfig::from_env()?);
//! server.serve().await?;
//! ```

mod config;
mod server;

pub use config::{ConfigError, VisConfig};
pub use server::{AppState, VisServer};
