//! Client-side analytics and resilience layer for the dropout-risk platform.
//!
//! Raw semester records and counselor rosters fetched through
//! [`gateway::RemoteGateway`] are turned into dashboard statistics by
//! [`dashboard`] and [`counselor`]. [`resilience::ResilienceShim`] swaps in a
//! demo snapshot whenever a load fails. Session credentials and the chat
//! transcript live in a local SQLite key/value store.

pub mod chat;
pub mod client;
pub mod config;
pub mod counselor;
pub mod dashboard;
pub mod db;
pub mod demo;
pub mod error;
pub mod gateway;
pub mod models;
pub mod report;
pub mod resilience;
pub mod risk;
pub mod session;

pub use client::RiskClient;
pub use config::ClientConfig;
pub use error::ClientError;
