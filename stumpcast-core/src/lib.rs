//! # Stumpcast Core
//!
//! Core library for the Stumpcast live-commentary service: the durable
//! commentary log, the running score, and the optional downstream stream
//! mirror.
//!
//! ## Overview
//!
//! - **Commentary Log**: append-only [`store::CommentaryStore`] with
//!   store-assigned, strictly increasing item ids
//! - **Score Tracking**: singleton [`types::ScoreState`] mutated by
//!   accumulated deltas, snapshotted per item at insert time
//! - **Downstream Mirror**: best-effort [`publish::DownstreamPublisher`]
//!   onto a Redis Stream; never a correctness dependency
//!
//! The server crate owns connections, cursors, and fan-out; everything here
//! is transport-agnostic.

pub mod error;
pub mod publish;
pub mod store;
pub mod types;

pub use error::{DeliveryError, PublisherError, StoreError, ValidationError};
pub use publish::{DownstreamPublisher, NoopPublisher, RedisStreamPublisher};
pub use store::{CommentaryStore, SqliteCommentaryStore};
pub use types::{CommentaryItem, ScoreDelta, ScoreState, Submission};
