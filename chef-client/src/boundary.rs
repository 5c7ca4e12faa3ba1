//! Client side of `POST /api/recipes`.

use std::future::Future;

use recipe_chef::RecipeQuery;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Failure to get any answer out of the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("unreadable response: {0}")]
    Decode(String),
}

/// What the API said. The renderer only tells ok from not ok.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryReply {
    /// 2xx with a JSON body, not yet interpreted.
    Success(Value),
    /// Non-2xx, with the `error` field of the body when there was one.
    Failure(Option<String>),
}

/// Request/response access to the recipe API.
pub trait RecipeBoundary: Send + Sync {
    fn suggest(
        &self,
        query: &RecipeQuery,
    ) -> impl Future<Output = Result<BoundaryReply, ClientError>> + Send;
}

/// [`RecipeBoundary`] over HTTP. No timeout: a request runs until the
/// server answers or the connection drops.
#[derive(Debug, Clone)]
pub struct HttpRecipeBoundary {
    client: reqwest::Client,
    url: String,
}

impl HttpRecipeBoundary {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: format!("{base}/api/recipes"),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RecipeBoundary for HttpRecipeBoundary {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn suggest(&self, query: &RecipeQuery) -> Result<BoundaryReply, ClientError> {
        let resp = self.client.post(&self.url).json(query).send().await?;
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        if status.is_success() {
            debug!(%status, "recipes received");
            Ok(BoundaryReply::Success(body))
        } else {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string);
            warn!(%status, error = ?message, "recipe API returned an error");
            Ok(BoundaryReply::Failure(message))
        }
    }
}
