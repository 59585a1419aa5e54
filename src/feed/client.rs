use std::future::Future;

use reqwest::{header, Client, StatusCode};

use super::parser::parse_feed;
use super::{FetchError, RssFeed};

/// Value sent in the `User-Agent` header of every fetch.
pub const USER_AGENT: &str = "gator";

/// Fetches and parses RSS documents over HTTP.
#[derive(Debug, Clone, Default)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch through a preconfigured client (timeouts, proxies). The
    /// `User-Agent` sent is still [`USER_AGENT`].
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `url` once and return the normalized document.
    ///
    /// Only a 200 response counts as success. `cancel` resolves when the caller
    /// gives up; pass [`std::future::pending`] to wait for the transport.
    pub async fn fetch(
        &self,
        url: &str,
        cancel: impl Future<Output = ()> + Send,
    ) -> Result<RssFeed, FetchError> {
        tokio::select! {
            biased;
            _ = cancel => Err(FetchError::Cancelled),
            result = self.fetch_once(url) => result,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<RssFeed, FetchError> {
        tracing::debug!("Fetching feed from {}", url);

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        let mut feed = parse_feed(&body)?;
        feed.normalize();

        tracing::debug!("Parsed {} items from {}", feed.channel.items.len(), url);
        Ok(feed)
    }
}
