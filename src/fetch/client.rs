use crate::core::config::CrawlerConfig;
use crate::core::error::{Error, ErrorKind, Result};
use bytes::Bytes;
use reqwest::header;
use std::future::Future;

/// Raw fetch result: response bytes plus the headers the crawler cares
/// about, decoupled from any particular HTTP client.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: Bytes,
    pub last_modified: Option<String>,
    pub date: Option<String>,
    pub content_length: Option<u64>,
}

impl FetchedPage {
    /// `Last-Modified` header, falling back to `Date`, then empty.
    pub fn last_modification_date(&self) -> String {
        self.last_modified
            .clone()
            .or_else(|| self.date.clone())
            .unwrap_or_default()
    }

    /// `Content-Length` header, falling back to the byte length of the
    /// extracted body text.
    pub fn page_size(&self, body_text: &str) -> u64 {
        self.content_length.unwrap_or(body_text.len() as u64)
    }

    /// Decodes the response body as UTF-8, falling back to Latin-1.
    /// Latin-1 maps every byte to a code point, so decoding never fails.
    pub fn decode_body(&self) -> String {
        match std::str::from_utf8(&self.body) {
            Ok(text) => text.to_string(),
            Err(_) => self.body.iter().map(|&b| b as char).collect(),
        }
    }
}

pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send;
}

/// HTTP fetcher over a pooled reqwest client, scoped to one crawl.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send {
        let request = self.client.get(url);
        let url = url.to_string();
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::new(
                    ErrorKind::Fetch,
                    format!("{url} returned {status}"),
                ));
            }

            let header_string = |name: header::HeaderName| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from)
            };
            let last_modified = header_string(header::LAST_MODIFIED);
            let date = header_string(header::DATE);
            let content_length = response.content_length();
            let body = response.bytes().await?;

            Ok(FetchedPage {
                body,
                last_modified,
                date,
                content_length,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &[u8]) -> FetchedPage {
        FetchedPage {
            body: Bytes::copy_from_slice(body),
            last_modified: None,
            date: None,
            content_length: None,
        }
    }

    #[test]
    fn utf8_bodies_decode_directly() {
        assert_eq!(page("héllo".as_bytes()).decode_body(), "héllo");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // 0xE9 is é in Latin-1 but not valid UTF-8 on its own.
        assert_eq!(page(&[0x63, 0x61, 0x66, 0xE9]).decode_body(), "café");
    }

    #[test]
    fn last_modified_falls_back_to_date() {
        let mut p = page(b"");
        p.date = Some("Tue, 02 Jan 2024 00:00:00 GMT".to_string());
        assert_eq!(p.last_modification_date(), "Tue, 02 Jan 2024 00:00:00 GMT");

        p.last_modified = Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string());
        assert_eq!(p.last_modification_date(), "Mon, 01 Jan 2024 00:00:00 GMT");

        assert_eq!(page(b"").last_modification_date(), "");
    }

    #[test]
    fn page_size_prefers_content_length() {
        let mut p = page(b"body");
        assert_eq!(p.page_size("four"), 4);
        p.content_length = Some(1234);
        assert_eq!(p.page_size("four"), 1234);
    }
}
