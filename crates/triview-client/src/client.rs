//! HTTP client for the feedback service.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use triview_core::config::ServiceConfig;
use triview_core::{DraftRequest, FeedbackResult, SubmitError};

/// Path of the feedback endpoint, relative to the service base URL.
pub const FEEDBACK_PATH: &str = "/api/feedback";

/// Client for the feedback service API.
pub struct FeedbackClient {
    client: Client,
    endpoint: String,
}

impl FeedbackClient {
    /// Build a client for `base_url`. Without a timeout, a request waits as
    /// long as the transport allows.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), FEEDBACK_PATH);
        Self { client, endpoint }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post a draft and parse the structured feedback.
    ///
    /// A non-success status maps to [`SubmitError::Http`] without reading the
    /// body. Connection failures and unparsable bodies map to
    /// [`SubmitError::Transport`].
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, domain = %request.domain))]
    pub async fn post_draft(&self, request: &DraftRequest) -> Result<FeedbackResult, SubmitError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Feedback service returned an error status");
            return Err(SubmitError::Http(status.as_u16()));
        }

        let result: FeedbackResult = resp.json().await.map_err(transport_error)?;
        debug!(
            peer = result.peer_feedback.is_some(),
            editor = result.editor_feedback.is_some(),
            expert = result.expert_feedback.is_some(),
            "Feedback received"
        );
        Ok(result)
    }
}

fn transport_error(e: reqwest::Error) -> SubmitError {
    warn!("Feedback request failed: {}", e);
    SubmitError::transport(e.to_string())
}
