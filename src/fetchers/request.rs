use super::Fetcher;
use crate::error::HarvestError;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, DNT, PRAGMA,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Blocking HTTP fetcher that presents itself as a desktop Chrome.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, HarvestError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(browser_headers()?)
            .build()?;

        Ok(Self { client })
    }
}

/// Static header set of a desktop browser session.
///
/// Accept-Encoding is left to reqwest so compressed bodies get decoded.
fn browser_headers() -> Result<HeaderMap, HarvestError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, BROWSER_USER_AGENT.parse()?);
    headers.insert(ACCEPT, BROWSER_ACCEPT.parse()?);
    headers.insert(ACCEPT_LANGUAGE, "en-US,en;q=0.9".parse()?);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        "sec-ch-ua",
        "\"Chromium\";v=\"137\", \"Not/A)Brand\";v=\"24\"".parse()?,
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"macOS\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    Ok(headers)
}

impl Fetcher for RequestFetcher {
    fn fetch(&self, url: &str) -> Result<String, HarvestError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::StatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}
