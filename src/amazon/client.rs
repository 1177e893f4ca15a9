//! HTTP client for Amazon requests, with user-agent selection by probe.

use crate::amazon::parser::is_blocked_page;
use crate::config::Config;
use crate::error::TrackerError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// User agent for the list download, and fallback when no candidate passes.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:38.0) Gecko/20100101 Firefox/38.0 SeaMonkey/2.35";

/// Accept-Language sent with every storefront request.
pub const ACCEPT_LANGUAGE: &str = "en-US, en;q=0.5";

/// Builds the Kindle store search URL for an author, newest first.
pub fn search_url(base_url: &str, author: &str) -> String {
    let phrase = format!("\"{}\"", author);
    format!(
        "{}/s?k={}&i=digital-text&s=date-desc-rank",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&phrase)
    )
}

/// Trait for fetching storefront pages - enables mocking for tests.
#[async_trait]
pub trait Storefront: Send + Sync {
    /// Fetches a page and returns the HTML response.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Amazon HTTP client sending the user agent chosen by the probe.
pub struct StorefrontClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl StorefrontClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.storefront_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Returns the storefront base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the search URL for an author on this storefront.
    pub fn search_url(&self, author: &str) -> String {
        search_url(&self.base_url, author)
    }

    /// Returns the user agent sent with page requests.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Updates the user agent sent with page requests.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    /// Performs a GET request with the given user agent.
    async fn get(&self, url: &str, user_agent: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            anyhow::bail!("Rate limited by Amazon (503)");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }

    /// Downloads the candidate user agents, one per line, in random order.
    pub async fn download_user_agents(&self, list_url: &str) -> Result<Vec<String>> {
        let body = self
            .get(list_url, DEFAULT_USER_AGENT)
            .await
            .with_context(|| format!("Failed to download user agent list from {}", list_url))?;

        let mut agents: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        agents.shuffle(&mut rand::rng());

        debug!("Downloaded {} candidate user agents", agents.len());
        Ok(agents)
    }

    /// Tries each candidate on a search for `probe_author` and returns the
    /// first one Amazon does not answer with its automated-access page.
    pub async fn probe(&self, candidates: &[String], probe_author: &str) -> Option<String> {
        let url = self.search_url(probe_author);

        for candidate in candidates {
            match self.get(&url, candidate).await {
                Ok(html) if !is_blocked_page(&html) => {
                    info!("Success on user agent string: {}", candidate);
                    return Some(candidate.clone());
                }
                Ok(_) => debug!("Fail on user agent: {}", candidate),
                Err(e) => debug!("Fail on user agent: {} ({})", candidate, e),
            }
        }

        None
    }

    /// Downloads the candidate list, probes it and keeps the working user agent.
    ///
    /// Falls back to [`DEFAULT_USER_AGENT`] when the list cannot be fetched
    /// or every candidate is rejected.
    pub async fn select_user_agent(&mut self, list_url: &str, probe_author: &str) {
        let candidates = match self.download_user_agents(list_url).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("{:#}. Using the default user agent.", e);
                Vec::new()
            }
        };

        match self.probe(&candidates, probe_author).await {
            Some(user_agent) => self.set_user_agent(user_agent),
            None => {
                if !candidates.is_empty() {
                    warn!(
                        "All {} user agents were rejected. Using the default user agent.",
                        candidates.len()
                    );
                }
                self.set_user_agent(DEFAULT_USER_AGENT);
            }
        }
    }
}

#[async_trait]
impl Storefront for StorefrontClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        let html = self.get(url, &self.user_agent).await?;

        if is_blocked_page(&html) {
            return Err(TrackerError::Blocked.into());
        }

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amazon::selectors::text;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config(base_url: &str) -> Config {
        Config { storefront_url: base_url.to_string(), ..Config::default() }
    }

    fn blocked_html() -> String {
        format!("<html><body><p>{}</p></body></html>", text::AUTOMATED_ACCESS)
    }

    #[test]
    fn test_search_url_encoding() {
        assert_eq!(
            search_url("https://www.amazon.com", "Robin Hobb"),
            "https://www.amazon.com/s?k=%22Robin%20Hobb%22&i=digital-text&s=date-desc-rank"
        );
        assert_eq!(
            search_url("https://www.amazon.com", "Brontë & Co"),
            "https://www.amazon.com/s?k=%22Bront%C3%AB%20%26%20Co%22&i=digital-text&s=date-desc-rank"
        );
    }

    #[test]
    fn test_new_trims_base_url() {
        let client = StorefrontClient::new(&make_test_config("http://localhost:1234/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
        assert!(client.search_url("A B").starts_with("http://localhost:1234/s?k="));
    }

    #[test]
    fn test_set_user_agent() {
        let mut client = StorefrontClient::new(&Config::default()).unwrap();
        client.set_user_agent("TestAgent/1.0");
        assert_eq!(client.user_agent(), "TestAgent/1.0");
    }

    #[tokio::test]
    async fn test_fetch_sends_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "\"Robin Hobb\""))
            .and(query_param("i", "digital-text"))
            .and(header("user-agent", "TestAgent/1.0"))
            .and(header("accept-language", ACCEPT_LANGUAGE))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>results</html>"))
            .mount(&mock_server)
            .await;

        let mut client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        client.set_user_agent("TestAgent/1.0");

        let body = client.fetch(&client.search_url("Robin Hobb")).await.unwrap();
        assert!(body.contains("results"));
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_503() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        let err = client.fetch(&client.search_url("Robin Hobb")).await.unwrap_err();
        assert!(err.to_string().contains("Rate limited"));
    }

    #[tokio::test]
    async fn test_fetch_http_error_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        let err = client.fetch(&client.search_url("Robin Hobb")).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_blocked_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(200).set_body_string(blocked_html()))
            .mount(&mock_server)
            .await;

        let client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        let err = client.fetch(&client.search_url("Robin Hobb")).await.unwrap_err();
        assert_eq!(err.downcast_ref::<TrackerError>(), Some(&TrackerError::Blocked));
    }

    #[tokio::test]
    async fn test_download_user_agents() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user-agents.txt"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("AgentA\n\n  AgentB  \nAgentC\n"))
            .mount(&mock_server)
            .await;

        let client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        let url = format!("{}/user-agents.txt", mock_server.uri());

        let mut agents = client.download_user_agents(&url).await.unwrap();
        agents.sort();
        assert_eq!(agents, vec!["AgentA", "AgentB", "AgentC"]);
    }

    #[tokio::test]
    async fn test_probe_skips_rejected_agents() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .and(header("user-agent", "BadAgent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(blocked_html()))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .and(header("user-agent", "GoodAgent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();

        let candidates = vec!["BadAgent".to_string(), "GoodAgent".to_string()];
        assert_eq!(client.probe(&candidates, "Robin Hobb").await, Some("GoodAgent".to_string()));

        let candidates = vec!["GoodAgent".to_string(), "BadAgent".to_string()];
        assert_eq!(client.probe(&candidates, "Robin Hobb").await, Some("GoodAgent".to_string()));
    }

    #[tokio::test]
    async fn test_probe_all_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(200).set_body_string(blocked_html()))
            .mount(&mock_server)
            .await;

        let client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        let candidates = vec!["A".to_string(), "B".to_string()];
        assert_eq!(client.probe(&candidates, "Robin Hobb").await, None);
        assert_eq!(client.probe(&[], "Robin Hobb").await, None);
    }

    #[tokio::test]
    async fn test_select_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user-agents.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("GoodAgent\n"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let mut client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        let url = format!("{}/user-agents.txt", mock_server.uri());
        client.select_user_agent(&url, "Robin Hobb").await;

        assert_eq!(client.user_agent(), "GoodAgent");
    }

    #[tokio::test]
    async fn test_select_user_agent_falls_back_to_default() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user-agents.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let mut client = StorefrontClient::new(&make_test_config(&mock_server.uri())).unwrap();
        client.set_user_agent("Stale");

        let url = format!("{}/user-agents.txt", mock_server.uri());
        client.select_user_agent(&url, "Robin Hobb").await;

        assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
    }
}
