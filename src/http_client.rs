use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("header_hardener/", env!("CARGO_PKG_VERSION"));

/// HTTP client tuned for header fetching: pooled connections, rustls,
/// bounded redirects and timeouts. Built by the caller and passed to the
/// header source; there is no process-wide client.
pub fn create_client(timeout_secs: u64, user_agent: &str) -> reqwest::Result<Client> {
    ClientBuilder::new()
        // Connection pooling
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .tcp_nodelay(true)

        // Timeouts
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(5)))

        // Compression
        .gzip(true)
        .brotli(true)

        // TLS: headers are graded as a browser would see them, so certificates are verified
        .use_rustls_tls()
        .https_only(false)

        // Headers are graded on the final response
        .redirect(reqwest::redirect::Policy::limited(5))

        .user_agent(user_agent)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(create_client(10, DEFAULT_USER_AGENT).is_ok());
    }
}
