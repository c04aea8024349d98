//! The seam between the UI and the feedback service.
//!
//! The TUI only talks to `dyn FeedbackService`, so tests can drive the whole
//! submit/settle cycle without a network.

use async_trait::async_trait;

use triview_core::{DraftRequest, FeedbackResult, SubmitError};

use crate::client::FeedbackClient;

#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Issue one feedback request. Exactly one outcome per call.
    async fn request_feedback(&self, request: &DraftRequest)
        -> Result<FeedbackResult, SubmitError>;
}

#[async_trait]
impl FeedbackService for FeedbackClient {
    async fn request_feedback(
        &self,
        request: &DraftRequest,
    ) -> Result<FeedbackResult, SubmitError> {
        self.post_draft(request).await
    }
}
