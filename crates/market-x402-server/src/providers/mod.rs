//! Upstream data providers behind the paid resources.

pub mod exchange;
pub mod weather;

use std::time::{Duration, Instant};

use crate::metrics::UPSTREAM_LATENCY;

/// Round-trip budget for one upstream call.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared outbound HTTP client for data providers.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http })
    }

    /// GET `url`, recording latency under `provider`.
    ///
    /// Errors have the URL stripped: provider URLs carry API keys.
    pub async fn get(&self, provider: &str, url: url::Url) -> Result<reqwest::Response, reqwest::Error> {
        let started = Instant::now();
        let result = self.http.get(url).send().await;
        UPSTREAM_LATENCY
            .with_label_values(&[provider])
            .observe(started.elapsed().as_secs_f64());
        result.map_err(reqwest::Error::without_url)
    }
}

/// Join `segments` onto `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<url::Url, url::ParseError> {
    let mut path = base.trim_end_matches('/').to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }
    url::Url::parse(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("https://example.com/", &["v6", "k y", "pair", "USD/../x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v6/k%20y/pair/USD%2F..%2Fx"
        );
    }
}
