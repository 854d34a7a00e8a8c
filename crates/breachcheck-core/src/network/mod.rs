//! Network utilities for HTTP operations.
//!
//! This module provides:
//! - HTTP client with uniform status and error-body handling
//! - The [`Fetcher`] seam the offline cache fetches through

mod client;
mod fetcher;

pub(crate) use client::read_body;
pub use client::{api_error, redact, HttpClient, SharedHttpClient};
pub use fetcher::{resolve_under, DynFetcher, Fetcher, OriginFetcher};
