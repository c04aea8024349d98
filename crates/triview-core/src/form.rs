//! Form state: the five editable inputs plus the request lifecycle.
//!
//! Lifecycle fields are only changed through [`FormState::begin_submit`] and
//! [`FormState::settle`], which keeps `result` and `error` mutually exclusive
//! and guarantees `is_loading` drops back to false once the latest request
//! settles. Requests are numbered; a settlement for anything but the latest
//! issued request is discarded.

use tracing::debug;

use crate::error::SubmitError;
use crate::feedback::{Domain, DraftRequest, FeedbackResult, Preferences};

pub const DEFAULT_DRAFT: &str = "Machine learning has become very popular, but many introductions either go\n\
too deep into math or stay too high-level. In this blog post I want to give a\n\
gentle, intuitive introduction to gradient descent using a simple example.";
pub const DEFAULT_TONE: &str = "friendly and clear";
pub const DEFAULT_LENGTH: &str = "short blog post";
pub const DEFAULT_NOTES: &str = "Assume the reader knows basic algebra.";

/// Identifies one issued submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// A request built by [`FormState::begin_submit`], ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: RequestId,
    pub request: DraftRequest,
}

/// The free-text input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Draft,
    Tone,
    Length,
    Notes,
}

/// A single field overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Domain(Domain),
    Text(TextField, String),
}

/// What [`FormState::settle`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    /// The outcome belonged to a superseded request and was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct FormState {
    domain: Domain,
    draft: String,
    tone: String,
    length: String,
    notes: String,

    is_loading: bool,
    error: Option<String>,
    result: Option<FeedbackResult>,

    /// Sequence number of the most recently issued request.
    latest: u64,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self {
            domain: Domain::default(),
            draft: DEFAULT_DRAFT.to_string(),
            tone: DEFAULT_TONE.to_string(),
            length: DEFAULT_LENGTH.to_string(),
            notes: DEFAULT_NOTES.to_string(),
            is_loading: false,
            error: None,
            result: None,
            latest: 0,
        }
    }

    // ── Inputs ──────────────────────────────────────────────

    /// Overwrite one input field. No validation, no other field is touched.
    pub fn update_field(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Domain(domain) => self.domain = domain,
            FieldUpdate::Text(field, value) => *self.text_mut(field) = value,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Draft => &self.draft,
            TextField::Tone => &self.tone,
            TextField::Length => &self.length,
            TextField::Notes => &self.notes,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Draft => &mut self.draft,
            TextField::Tone => &mut self.tone,
            TextField::Length => &mut self.length,
            TextField::Notes => &mut self.notes,
        }
    }

    /// Build the request body from the current inputs.
    pub fn draft_request(&self) -> DraftRequest {
        DraftRequest {
            draft: self.draft.clone(),
            domain: self.domain,
            preferences: Preferences {
                tone: self.tone.clone(),
                length: self.length.clone(),
                extra_notes: self.notes.clone(),
            },
        }
    }

    // ── Lifecycle ───────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&FeedbackResult> {
        self.result.as_ref()
    }

    /// The id of the request whose settlement would currently be applied.
    pub fn latest_request(&self) -> Option<RequestId> {
        (self.latest > 0).then_some(RequestId(self.latest))
    }

    /// Enter the submitting state and build the request to send.
    ///
    /// Any request issued earlier becomes stale.
    pub fn begin_submit(&mut self) -> Submission {
        self.is_loading = true;
        self.error = None;
        self.result = None;
        self.latest += 1;

        let id = RequestId(self.latest);
        debug!(request = id.0, "Submission started");
        Submission {
            id,
            request: self.draft_request(),
        }
    }

    /// Apply the outcome of request `id`.
    pub fn settle(
        &mut self,
        id: RequestId,
        outcome: Result<FeedbackResult, SubmitError>,
    ) -> Settlement {
        if id.0 != self.latest || !self.is_loading {
            debug!(request = id.0, latest = self.latest, "Discarding stale settlement");
            return Settlement::Stale;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.to_string());
            }
        }
        self.is_loading = false;
        Settlement::Applied
    }
}
