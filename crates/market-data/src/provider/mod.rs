//! Quote vendor clients and the central-bank series client.
//!
//! Each quote vendor performs one HTTP call per request and returns the
//! current price or fails. Vendors are interchangeable behind
//! [`QuoteProvider`]; the resolver decides ordering and fallback.

pub mod banxico;
mod finnhub;
mod polygon;
mod traits;

pub use finnhub::FinnhubProvider;
pub use polygon::PolygonProvider;
pub use traits::QuoteProvider;

use std::time::Duration;

/// Timeout applied to every upstream call. A timed-out call is handled like
/// any other vendor failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client providers share by default.
pub(crate) fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
