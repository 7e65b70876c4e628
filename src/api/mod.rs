//! speedrun.com API client
//!
//! This module provides the paginated fetcher used by every dataset loader:
//! a client that walks `pagination.links` to completion, retries rate-limited
//! requests with exponential backoff, and gives any other failed page one
//! more chance after a fixed sleep before giving up.

mod client;
mod envelope;
mod retry;

pub use client::{ApiClient, Record};
pub use envelope::{PageEnvelope, Pagination, PaginationLink};
pub use retry::RetryPolicy;

use thiserror::Error;

/// Errors that can occur when talking to the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response body could not be read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-success status that retries did not resolve.
    /// Carries the response body for diagnostics.
    #[error("HTTP {status} from {url}: {body}")]
    Http { url: String, status: u16, body: String },

    /// The response body did not decode, or lacked the expected `data` field
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}
