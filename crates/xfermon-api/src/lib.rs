// xfermon-api: Async Rust client for the transfer service endpoint-manager API

pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod tasks;
pub mod transport;

pub use client::TransferClient;
pub use error::Error;
pub use models::{EndpointInfo, PauseResult, TaskDocument, TaskListPage};
pub use transport::TransportConfig;
