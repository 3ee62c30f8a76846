use crate::error::PagerError;
use crate::fetcher::{PageFetcher, PageRequest, PageResult};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, warn};

const USER_AGENT: &str = "listpager-core/0.1";
const ACCEPT: &str = "application/json";

/// Fetches pages from a JSON endpoint: `GET {endpoint}?page=N&limit=M`
///
/// The response body must decode into [`PageResult`], i.e.
/// `{"items": [...], "totalItemCount": 23}`.
#[derive(Debug)]
pub struct HttpPageFetcher<T> {
    client: reqwest::Client,
    endpoint: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageFetcher<T> {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PagerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Share one client (connection pool, cookies) between several widgets
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            _item: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<T> PageFetcher<T> for HttpPageFetcher<T>
where
    T: DeserializeOwned + Send,
{
    async fn fetch(&self, request: PageRequest) -> Result<PageResult<T>, PagerError> {
        debug!(
            endpoint = %self.endpoint,
            page = request.page,
            page_size = request.page_size,
            "Requesting page"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("page", request.page), ("limit", request.page_size)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "Page request rejected");
            return Err(PagerError::Fetch(format!(
                "{} returned HTTP {}",
                self.endpoint, status
            )));
        }

        let body = response.text().await?;
        let page: PageResult<T> = serde_json::from_str(&body)?;

        debug!(
            items = page.items.len(),
            total = page.total_item_count,
            "Page received"
        );
        Ok(page)
    }
}
