//! Shared HTTP client for the collaborator endpoints.

use once_cell::sync::Lazy;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub(crate) fn get_http_client() -> &'static reqwest::Client {
    &HTTP_CLIENT
}
