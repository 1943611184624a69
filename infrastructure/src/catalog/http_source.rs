//! Price List offer index over HTTPS

use crate::config::DEFAULT_CATALOG_URL;
use advisor_application::{CatalogError, CatalogSource};
use advisor_domain::ServiceCatalog;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for the catalog download
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `offers.*.{serviceName, offerCode}` from the public price list
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // Each fetch runs on a short-lived runtime; pooled connections would outlive it
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Source for the public AWS endpoint with the default timeout
    pub fn aws_default() -> Result<Self, CatalogError> {
        Self::new(DEFAULT_CATALOG_URL, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode an offer index body into a catalog
pub fn parse_offer_index(body: &[u8]) -> Result<ServiceCatalog, CatalogError> {
    let document: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| CatalogError::Malformed(e.to_string()))?;
    ServiceCatalog::from_offer_index(&document).map_err(|e| CatalogError::Malformed(e.to_string()))
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<ServiceCatalog, CatalogError> {
        debug!(url = %self.url, "Fetching service catalog");
        let response = self
            .client
            .get(&self.url)
            .header("User-Agent", "aws-advisor/0.1")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout
                } else {
                    CatalogError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::Network(e.to_string())
            }
        })?;

        let catalog = parse_offer_index(&body)?;
        info!(services = catalog.len(), "Fetched service catalog");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_domain::{AliasTable, CatalogOrigin, SubstringPolicy};

    #[test]
    fn test_parse_offer_index() {
        let body = br#"{
            "formatVersion": "v1.0",
            "offers": {
                "AmazonEC2": {"offerCode": "AmazonEC2", "serviceName": "Amazon Elastic Compute Cloud"},
                "AmazonS3": {"offerCode": "AmazonS3", "serviceName": "Amazon Simple Storage Service"},
                "Broken": {"offerCode": "Broken"}
            }
        }"#;
        let catalog = parse_offer_index(body).unwrap();
        assert_eq!(catalog.origin(), CatalogOrigin::Remote);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.find_code(
                "amazon simple storage service",
                &AliasTable::empty(),
                SubstringPolicy::FirstMatch
            ),
            Some("AmazonS3")
        );
    }

    #[test]
    fn test_parse_rejects_malformed_bodies() {
        assert!(matches!(parse_offer_index(b"<html>"), Err(CatalogError::Malformed(_))));
        assert!(matches!(
            parse_offer_index(br#"{"formatVersion": "v1.0"}"#),
            Err(CatalogError::Malformed(_))
        ));
    }

    const INDEX_BODY: &str =
        r#"{"offers": {"AmazonEC2": {"offerCode": "AmazonEC2", "serviceName": "Amazon EC2"}}}"#;

    /// Serves `count` requests, each on a fresh connection, keeping every socket open
    fn serve_index(count: usize) -> (String, std::thread::JoinHandle<usize>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/offers/v1.0/aws/index.json", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let mut open = Vec::new();
            for _ in 0..count {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n{}",
                    INDEX_BODY.len(),
                    INDEX_BODY
                );
                stream.write_all(response.as_bytes()).unwrap();
                open.push(stream);
            }
            open.len()
        });
        (url, handle)
    }

    #[test]
    fn test_fetch_across_short_lived_runtimes() {
        let (url, server) = serve_index(2);
        let source = HttpCatalogSource::new(url, Duration::from_secs(5)).unwrap();

        for _ in 0..2 {
            let catalog = crate::runtime::block_on_isolated(source.fetch()).unwrap().unwrap();
            assert_eq!(catalog.len(), 1);
        }
        assert_eq!(server.join().unwrap(), 2);
    }

    #[test]
    fn test_default_source_targets_price_list() {
        let source = HttpCatalogSource::aws_default().unwrap();
        assert!(source.url().ends_with("/offers/v1.0/aws/index.json"));
    }
}
