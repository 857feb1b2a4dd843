use crate::error::ScrapeError;
use crate::scrapers::traits::{FetchedPage, PageFetcher};
use crate::scrapers::types::{ScrapeOptions, DEFAULT_ACCEPT_LANGUAGE};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Plain HTTP GET fetcher. No retries: the first failure is returned.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(options: &ScrapeOptions) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        debug!("Fetching URL: {}", url);

        let network = |source| ScrapeError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status: {}", url, status);
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(network)?;

        debug!("Downloaded {} bytes of HTML from {}", html.len(), final_url);

        Ok(FetchedPage {
            url: final_url,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer the first request on a loopback port with a canned response.
    async fn serve_once(status: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        Url::parse(&format!("http://{addr}/collection?page=1")).unwrap()
    }

    fn local_fetcher() -> HttpFetcher {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .no_proxy()
            .build()
            .unwrap();
        HttpFetcher { client }
    }

    #[tokio::test]
    async fn success_returns_body_and_url() {
        let url = serve_once("200 OK", "<div class=\"card\"></div>").await;

        let page = local_fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.html, "<div class=\"card\"></div>");
        assert_eq!(page.url, url);
    }

    #[tokio::test]
    async fn not_found_is_a_status_error() {
        let url = serve_once("404 Not Found", "gone").await;

        match local_fetcher().fetch(&url).await {
            Err(ScrapeError::Status { url: failed, status }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(failed, url.to_string());
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let url = serve_once("500 Internal Server Error", "").await;

        let err = local_fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/")).unwrap();

        let err = local_fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Network { .. }));
    }

    #[test]
    fn builds_with_custom_options() {
        let options = ScrapeOptions {
            timeout: Duration::from_secs(5),
            user_agent: "test-agent/1.0".to_string(),
            ..ScrapeOptions::default()
        };
        assert!(HttpFetcher::new(&options).is_ok());
    }
}
