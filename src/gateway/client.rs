use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::settings::ItunesConfig;

use super::error::GatewayError;
use super::models::{SearchResponse, SearchResultItem};

/// The console's only dependency on the outside world.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Free-text catalog search.
    async fn query(&self, term: &str) -> Result<SearchResponse, GatewayError>;

    /// Fetch a single collection by its iTunes id.
    async fn lookup(&self, id: u64) -> Result<Option<SearchResultItem>, GatewayError>;
}

pub struct ItunesClient {
    http: reqwest::Client,
    base_url: String,
    entity: String,
    limit: u32,
    country: Option<String>,
}

impl ItunesClient {
    pub fn new(config: &ItunesConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("tunes/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            entity: config.entity.join(","),
            limit: config.limit,
            country: config.country.clone(),
        })
    }

    /// Override the per-request result limit (used by `tunes search --limit`).
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn search_request(&self, term: &str) -> reqwest::Result<reqwest::Request> {
        let mut params: Vec<(&str, String)> = vec![
            ("term", term.to_string()),
            ("entity", self.entity.clone()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(ref country) = self.country {
            params.push(("country", country.clone()));
        }

        self.http
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .build()
    }

    pub fn lookup_request(&self, id: u64) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(format!("{}/lookup", self.base_url))
            .query(&[("id", id.to_string())])
            .build()
    }

    async fn fetch(&self, request: reqwest::Request) -> Result<SearchResponse, GatewayError> {
        let url = request.url().clone();
        debug!(%url, "itunes request");

        let response = self.http.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "itunes returned non-success status");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let payload = parse_payload(&body)?;
        debug!(%url, results = payload.results.len(), "itunes response decoded");
        Ok(payload)
    }
}

#[async_trait]
impl SearchGateway for ItunesClient {
    async fn query(&self, term: &str) -> Result<SearchResponse, GatewayError> {
        let request = self.search_request(term)?;
        self.fetch(request).await
    }

    async fn lookup(&self, id: u64) -> Result<Option<SearchResultItem>, GatewayError> {
        let request = self.lookup_request(id)?;
        let payload = self.fetch(request).await?;
        Ok(pick_collection(payload.results))
    }
}

pub fn parse_payload(body: &str) -> Result<SearchResponse, GatewayError> {
    Ok(serde_json::from_str(body)?)
}

/// A lookup by collection id can also return the album's tracks; only the
/// collection row itself is an album.
fn pick_collection(results: Vec<SearchResultItem>) -> Option<SearchResultItem> {
    results
        .into_iter()
        .find(|item| item.wrapper_type.as_deref() == Some("collection"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client() -> ItunesClient {
        ItunesClient::new(&ItunesConfig::default()).unwrap()
    }

    #[test]
    fn test_search_url_encodes_term() {
        let request = client().search_request("the beatles").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://itunes.apple.com/search?term=the+beatles&entity=musicArtist%2Calbum%2Csong&limit=10"
        );
    }

    #[test]
    fn test_search_url_includes_country() {
        let config = ItunesConfig {
            base_url: "http://localhost:8080/".to_string(),
            country: Some("gb".to_string()),
            ..ItunesConfig::default()
        };
        let request = ItunesClient::new(&config)
            .unwrap()
            .with_limit(3)
            .search_request("x")
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/search?term=x&entity=musicArtist%2Calbum%2Csong&limit=3&country=gb"
        );
    }

    #[test]
    fn test_lookup_url() {
        let request = client().lookup_request(1440857781).unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://itunes.apple.com/lookup?id=1440857781"
        );
    }

    #[test]
    fn test_parse_payload_rejects_garbage() {
        let err = parse_payload("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_pick_collection_prefers_collection_row() {
        let track = SearchResultItem {
            wrapper_type: Some("track".into()),
            track_name: Some("Come Together".into()),
            ..Default::default()
        };
        let album = SearchResultItem {
            wrapper_type: Some("collection".into()),
            collection_name: Some("Abbey Road".into()),
            ..Default::default()
        };
        let picked = pick_collection(vec![track, album]).unwrap();
        assert_eq!(picked.collection_name.as_deref(), Some("Abbey Road"));
        assert!(pick_collection(Vec::new()).is_none());
    }

    #[test]
    fn test_pick_collection_ignores_non_album_rows() {
        let artist = SearchResultItem {
            wrapper_type: Some("artist".into()),
            artist_name: Some("The Beatles".into()),
            ..Default::default()
        };
        let track = SearchResultItem {
            wrapper_type: Some("track".into()),
            track_name: Some("Come Together".into()),
            ..Default::default()
        };
        assert!(pick_collection(vec![artist, track]).is_none());
    }

    /// Serve one canned HTTP response on a loopback port and return its base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    fn client_at(base_url: String) -> ItunesClient {
        let config = ItunesConfig {
            base_url,
            timeout_secs: 5,
            ..ItunesConfig::default()
        };
        ItunesClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream() {
        let base = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;

        let err = client_at(base).query("abba").await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { status: 503 }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_success_without_results_is_decode_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
        )
        .await;

        let err = client_at(base).query("abba").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_success_decodes_results() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 58\r\nconnection: close\r\n\r\n{\"resultCount\":1,\"results\":[{\"wrapperType\":\"collection\"}]}",
        )
        .await;

        let album = client_at(base).lookup(42).await.unwrap();
        assert_eq!(album.unwrap().wrapper_type.as_deref(), Some("collection"));
    }

    #[tokio::test]
    async fn test_closed_port_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_at(format!("http://{}", addr))
            .query("abba")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)), "{:?}", err);
    }
}
