//! Bulk heartbeat API client.
//!
//! A single public operation, [`Client::send_heartbeats`], posts a batch to
//! the bulk endpoint and returns one [`Outcome`] per submitted heartbeat, in
//! submission order. Batches spanning multiple credentials are partitioned
//! and sent concurrently, one task per credential.
//!
//! Response statuses map onto the error taxonomy: 401 is [`ApiError::Auth`],
//! 400 is [`ApiError::BadRequest`], 429 is [`ApiError::RateLimited`], any
//! 5xx or network/timeout failure is [`ApiError::Transient`]. Callers decide
//! retry policy from the error kind; this crate performs no retries itself.

mod client;
mod error;
mod response;

pub use client::{group_by_api_key, Client, ClientOptions, BASE_URL};
pub use error::{ApiError, Result};
pub use response::parse_heartbeat_responses;
