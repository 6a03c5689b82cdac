//! GitHub REST API fetcher.
//!
//! # Credentials
//!
//! Every request carries the configured token as a bearer credential. The
//! token is never logged; [`GithubOptions`]' `Debug` output redacts it.

use crate::RemoteFetcher;
use crate::error::{ErrorKind, Result};
use crate::models::{LanguageDetails, Languages, Repository, SearchResponse};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use tracing::instrument;

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
/// The search API refuses anything larger.
const MAX_PER_PAGE: u32 = 100;

/// Connection and search settings for [`GithubFetcher`].
#[derive(Clone)]
pub struct GithubOptions {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    pub token: String,
    /// Search qualifiers, e.g. `stars:>1`.
    pub query: String,
    pub sort: String,
    pub order: String,
    pub per_page: u32,
    pub user_agent: String,
}
impl Default for GithubOptions {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: String::new(),
            query: "stars:>1".to_string(),
            sort: "stars".to_string(),
            order: "desc".to_string(),
            per_page: MAX_PER_PAGE,
            user_agent: concat!("repolang/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
impl Debug for GithubOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GithubOptions")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("query", &self.query)
            .field("sort", &self.sort)
            .field("order", &self.order)
            .field("per_page", &self.per_page)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// GitHub REST API fetcher.
///
/// # Examples
///
/// ```no_run
/// use repolang_github::{GithubFetcher, GithubOptions, RemoteFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = GithubFetcher::new(GithubOptions {
///     token: std::env::var("GITHUB_TOKEN")?,
///     ..GithubOptions::default()
/// })?;
/// let top = fetcher.snapshot(100).await?;
/// let languages = fetcher.languages(&top[0].full_name).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GithubFetcher {
    client: Client,
    options: GithubOptions,
}
impl GithubFetcher {
    pub fn new(mut options: GithubOptions) -> Result<Self> {
        options.api_url = options.api_url.trim_end_matches('/').to_string();
        options.per_page = options.per_page.clamp(1, MAX_PER_PAGE);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        let client = Client::builder()
            .user_agent(&options.user_agent)
            .default_headers(headers)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &GithubOptions {
        &self.options
    }

    /// Send an authenticated GET and decode a successful JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.options.token)
            .query(query)
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let response = Self::check_status(response)?;
        let body = response.bytes().await.or_raise(|| ErrorKind::Network)?;
        serde_json::from_slice(&body).or_raise(|| ErrorKind::Decode)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteFetcher for GithubFetcher {
    #[instrument(skip(self), fields(query = %self.options.query))]
    async fn search_page(&self, page: u32) -> Result<Vec<Repository>> {
        let url = format!("{}/search/repositories", self.options.api_url);
        let query = [
            ("q", self.options.query.clone()),
            ("sort", self.options.sort.clone()),
            ("order", self.options.order.clone()),
            ("per_page", self.options.per_page.to_string()),
            ("page", page.to_string()),
        ];
        let response: SearchResponse = self.get_json(&url, &query).await?;
        let mut items = response.items;
        for repo in &mut items {
            repo.derive_short_name();
        }
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn languages(&self, full_name: &str) -> Result<Languages> {
        let url = format!("{}/repos/{full_name}/languages", self.options.api_url);
        let raw: BTreeMap<String, u64> = self.get_json(&url, &[]).await?;
        Ok(raw.into_iter().map(|(name, bytes)| (name, LanguageDetails::from(bytes))).collect())
    }
}
