use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::HttpMethod;
use crate::errors::AwdError;

use super::classify::{classify_response, SubmitVerdict};
use super::template::FlagInfo;

pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateful submission client: one persistent connection pool per scoring
/// server, with a fixed default header set merged per request.
pub struct FlagSender {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(reqwest::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(reqwest::header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(reqwest::header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,zh-TW;q=0.8,en-US;q=0.7,en;q=0.6"),
    );
    headers.insert(HeaderName::from_static("matchid"), HeaderValue::from_static(""));
    headers
}

impl FlagSender {
    /// `server` may be a bare host or a full URL; the scheme defaults to
    /// https and a non-standard `port` is made explicit in the base URL.
    pub fn new(server: &str, port: Option<u16>, timeout: Duration) -> Result<Self, AwdError> {
        let base_url = normalize_base_url(server, port)?;
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| AwdError::Config(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            headers: default_headers(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or replace one default header.
    pub fn set_header(&mut self, key: &str, value: &str) -> Result<(), AwdError> {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| AwdError::Config(format!("Invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AwdError::Config(format!("Invalid header value for '{}': {}", key, e)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Merge a batch of default headers.
    pub fn set_headers(&mut self, headers: &HashMap<String, String>) -> Result<(), AwdError> {
        for (key, value) in headers {
            self.set_header(key, value)?;
        }
        Ok(())
    }

    /// Submit one flag and classify the scoring server's answer. Transport
    /// failures never escape; they come back as failed verdicts.
    pub async fn send_flag(&self, info: &FlagInfo) -> SubmitVerdict {
        let request = match self.build_request(info) {
            Ok(request) => request,
            Err(detail) => return SubmitVerdict::failure(detail),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return SubmitVerdict::failure(format!("[request failed] {}", e)),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return SubmitVerdict::failure(format!("[body read failed] {}", e)),
        };

        if !status.is_success() {
            return SubmitVerdict::failure(format!(
                "[http {}] {}",
                status.as_u16(),
                String::from_utf8_lossy(&body)
            ));
        }

        let verdict = classify_response(&body);
        debug!(subject = %info.subject, accepted = verdict.accepted, "Flag submission classified");
        verdict
    }

    fn build_request(&self, info: &FlagInfo) -> Result<reqwest::RequestBuilder, String> {
        let raw = format!("{}{}", self.base_url, info.endpoint);
        let mut url =
            Url::parse(&raw).map_err(|e| format!("[malformed URL] {}: {}", raw, e))?;

        // Query parameters ride on the URL itself so they can coexist with
        // a POST body.
        if let Some(params) = &info.params {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut headers = self.headers.clone();
        if info.method == HttpMethod::Post && info.use_form && info.data.is_some() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        if let Some(extra) = &info.headers {
            for (key, value) in extra {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|e| format!("[invalid header '{}'] {}", key, e))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| format!("[invalid header '{}'] {}", key, e))?;
                headers.insert(name, value);
            }
        }

        let builder = match info.method {
            HttpMethod::Get => self.client.get(url).headers(headers),
            HttpMethod::Post => {
                let mut builder = self.client.post(url).headers(headers);
                if let Some(data) = &info.data {
                    builder = if info.use_form {
                        builder.form(data)
                    } else {
                        builder.json(data)
                    };
                }
                builder
            }
        };
        Ok(builder)
    }
}

fn normalize_base_url(server: &str, port: Option<u16>) -> Result<String, AwdError> {
    let mut url = server.trim().trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("https://{}", url);
    }
    let parsed = Url::parse(&url)
        .map_err(|e| AwdError::Config(format!("Invalid flag server URL '{}': {}", server, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AwdError::Config(format!("Invalid flag server URL '{}'", server)))?;

    // A port embedded in the URL wins; otherwise the explicit argument is
    // appended unless it is the protocol default.
    let port = parsed
        .port()
        .or(port.filter(|p| !matches!(*p, 80 | 443)));
    Ok(match port {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}
