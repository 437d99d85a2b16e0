// --- File: crates/slotbook_common/src/http/client.rs ---
use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A shared HTTP client with the default timeout.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Creates a new HTTP client with a custom request timeout.
///
/// A timeout of zero disables it, which long-lived streams such as the change feed need.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    let builder = Client::builder().connect_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    let builder = if timeout_secs > 0 {
        builder.timeout(Duration::from_secs(timeout_secs))
    } else {
        builder
    };
    builder.build()
}
