#[cfg(test)]
mod tests {
    use crate::config::ApiConfig;
    use crate::http::RateLimitedHttpClient;
    use std::time::Instant;

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let result = RateLimitedHttpClient::with_base_url("localhost:3000/api");
        assert!(result.is_err());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = RateLimitedHttpClient::with_base_url("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[tokio::test]
    async fn test_rate_limiting_timing() {
        let settings = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            requests_per_second: 2,
            burst_capacity: 1,
            request_timeout_ms: 200,
            ..ApiConfig::default()
        };
        let client = RateLimitedHttpClient::new(&settings).unwrap();

        let start = Instant::now();
        for _ in 0..2 {
            // Nothing listens on the discard port; only the limiter delay matters here
            let _ = client.post_empty("/delivery/shippit/confirm/1").await;
        }
        let elapsed = start.elapsed();

        println!("Two rate-limited requests took: {elapsed:?}");
        assert!(elapsed.as_millis() >= 400);
        assert_eq!(client.metrics().get_stats().total_requests, 2);
    }
}
