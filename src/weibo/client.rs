use crate::weibo::Fetcher;
use crate::weibo::model::{ApiEnvelope, LongText, Mblog, TimelinePage};
use anyhow::{Context, Result};
use reqwest::header;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://weibo.com";

/// Anonymous visitor cookie sent when the config leaves `Cookie` empty.
/// Timelines that require a login still need a real session cookie.
pub const DEFAULT_COOKIE: &str = "SUB=visitor";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("api at {url} rejected the request: ok={ok} msg={msg}")]
    Rejected { url: String, ok: i64, msg: String },
}

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub endpoint: String,
    pub cookie: Option<String>,
    pub proxy: Option<String>,
}

pub struct Client {
    http: reqwest::blocking::Client,
    endpoint: String,
    cookie: String,
}

impl Client {
    pub fn new(opts: &ClientOptions) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT);
        builder = match opts.proxy.as_deref() {
            Some(url) => builder.proxy(
                reqwest::Proxy::all(url).with_context(|| format!("invalid proxy url: {url}"))?,
            ),
            None => builder.no_proxy(),
        };
        let http = builder.build().context("failed to build http client")?;

        let endpoint = if opts.endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            opts.endpoint.trim().trim_end_matches('/').to_string()
        };

        let cookie = match opts.cookie.as_deref().map(str::trim) {
            Some(cookie) if !cookie.is_empty() => cookie.to_string(),
            _ => DEFAULT_COOKIE.to_string(),
        };

        Ok(Self {
            http,
            endpoint,
            cookie,
        })
    }

    pub fn get_mblogs(
        &self,
        userid: &str,
        page: u32,
        extra_detail: bool,
    ) -> Result<Vec<Mblog>, FetchError> {
        let url = format!(
            "{}/ajax/statuses/mymblog?uid={userid}&page={page}&feature=0",
            self.endpoint
        );
        let page: TimelinePage = self.get_json(&url, userid)?;
        let mut mblogs = page.list;

        if extra_detail {
            for mblog in mblogs.iter_mut().filter(|m| m.is_long_text) {
                let text = self.get_long_text(userid, &mblog.mblog_id)?;
                if !text.is_empty() {
                    mblog.long_text = Some(text);
                }
            }
        }

        Ok(mblogs)
    }

    fn get_long_text(&self, userid: &str, mblog_id: &str) -> Result<String, FetchError> {
        let url = format!("{}/ajax/statuses/longtext?id={mblog_id}", self.endpoint);
        let long: LongText = self.get_json(&url, userid)?;
        Ok(long.long_text_content)
    }

    fn get_json<T: DeserializeOwned + Default>(
        &self,
        url: &str,
        userid: &str,
    ) -> Result<T, FetchError> {
        let request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .header(header::REFERER, format!("{}/u/{userid}", self.endpoint))
            .header(header::COOKIE, &self.cookie);

        let response = request.send().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let envelope: ApiEnvelope<T> = response.json().map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;
        if envelope.ok != 1 {
            return Err(FetchError::Rejected {
                url: url.to_string(),
                ok: envelope.ok,
                msg: envelope.msg,
            });
        }
        Ok(envelope.data.unwrap_or_default())
    }
}

impl Fetcher for Client {
    fn fetch(&self, userid: &str, page: u32, extra_detail: bool) -> Result<Vec<Mblog>> {
        Ok(self.get_mblogs(userid, page, extra_detail)?)
    }
}
