//! # Stumpcast Server
//!
//! Live cricket commentary broadcast server.
//!
//! ## Overview
//!
//! - **Commentary Feed**: clients submit commentary plus score deltas over a
//!   WebSocket and every connected client receives the ordered, deduplicated
//!   feed annotated with the running score
//! - **Per-Connection Catch-Up**: each connection tracks its own cursor into
//!   the durable log and backfills everything it missed through the same
//!   path live broadcasts use
//! - **Downstream Mirror**: accepted items are mirrored to a Redis Stream,
//!   best-effort and fully decoupled from client delivery
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - SQLite (via sqlx) for the durable commentary log and score
//! - A DashMap-backed connection registry and cursor tracker
//! - Redis Streams for the optional downstream mirror

pub mod broadcast;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
