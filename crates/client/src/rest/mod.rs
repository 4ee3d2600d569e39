//! Adapters for a hosted backend exposing a PostgREST-style table API and a
//! GoTrue-style auth API under the same project URL.

pub mod auth;
pub mod store;

pub use auth::RestAuthProvider;
pub use store::RestLedgerStore;

use std::time::Duration;

use debtbook_shared::auth::AuthErrorBody;
use reqwest::Client;

/// Header carrying the project's public API key.
pub(crate) const API_KEY_HEADER: &str = "apikey";

/// Builds the HTTP client shared by one adapter.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("debtbook/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Joins the project URL and an API path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Extracts a readable message from an error response body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<AuthErrorBody>(body) {
        Ok(parsed) if parsed.error.is_some() || parsed.error_description.is_some() => {
            parsed.message()
        }
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://demo.supabase.co", "rest/v1/entries")]
    #[case("https://demo.supabase.co/", "/rest/v1/entries")]
    fn test_endpoint(#[case] base: &str, #[case] path: &str) {
        assert_eq!(endpoint(base, path), "https://demo.supabase.co/rest/v1/entries");
    }

    #[rstest]
    #[case(
        r#"{"message":"permission denied for table entries"}"#,
        "permission denied for table entries"
    )]
    #[case(
        r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        "Invalid login credentials"
    )]
    #[case(r#"{"msg":"User not found"}"#, "User not found")]
    #[case("Bad Gateway", "Bad Gateway")]
    #[case("", "no response body")]
    fn test_error_message(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }
}
