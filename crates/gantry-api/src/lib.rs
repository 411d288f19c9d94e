//! Gantry HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod handlers;
pub mod server;
pub mod slack;

pub use config::{Config, ReleaseFailurePolicy};
pub use server::{create_router, start_server, AppState};
