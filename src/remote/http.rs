use super::{RemoteError, ReviewRemote, SubmitRequest, SubmitResponse};
use crate::model::{PendingRating, ReviewItem};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Header carrying the client-generated rating id.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// `reqwest` client for the review service.
#[derive(Clone)]
pub struct HttpReviewRemote {
    client: Client,
    server: String,
}

impl HttpReviewRemote {
    /// Create a client for `server` (e.g. `http://localhost:3000`).
    ///
    /// `timeout` bounds every request so nothing stays pending forever.
    pub fn new(server: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self::with_client(client, server))
    }

    pub fn with_client(client: Client, server: impl Into<String>) -> Self {
        let server = server.into().trim_end_matches('/').to_string();
        Self { client, server }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn rating_url(&self, word_id: &str) -> String {
        format!(
            "{}/vocabulary/{}/rating",
            self.server,
            urlencoding::encode(word_id)
        )
    }
}

#[async_trait]
impl ReviewRemote for HttpReviewRemote {
    async fn fetch_review_items(&self) -> Result<Vec<ReviewItem>, RemoteError> {
        let url = format!("{}/review", self.server);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        let items: Vec<ReviewItem> = resp.json().await?;
        debug!("Fetched {} review items from {}", items.len(), url);
        Ok(items)
    }

    async fn submit_rating(&self, rating: &PendingRating) -> Result<(), RemoteError> {
        let body = SubmitRequest {
            rating: rating.rating.into(),
            reviewed_at: rating.created_at,
        };
        let resp = self
            .client
            .post(self.rating_url(&rating.word_id))
            .header(IDEMPOTENCY_HEADER, rating.id.to_string())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        let ack: SubmitResponse = resp.json().await?;
        if ack.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected(
                ack.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}
