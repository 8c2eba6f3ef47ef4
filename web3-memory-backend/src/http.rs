use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Process-wide HTTP client shared by the model client and the block explorer fan-out.
///
/// `Client::clone()` is an `Arc` increment, so services clone it freely.
/// Per-request timeouts (the 5s explorer lookups) are set with `.timeout()` on the request.
static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(120))
        .user_agent(concat!("web3-memory-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create shared HTTP client")
});

/// Returns a reference to the global shared HTTP client.
pub fn shared_client() -> &'static Client {
    &SHARED_CLIENT
}
