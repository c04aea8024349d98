//! Local precondition checks on a draft request.
//!
//! Advisory only: submission never consults this. The service remains
//! responsible for rejecting input it cannot review.

use crate::feedback::DraftRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyDraft,
    BlankDraft,
}

impl ValidationIssue {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationIssue::EmptyDraft => "Draft is empty",
            ValidationIssue::BlankDraft => "Draft contains only whitespace",
        }
    }
}

pub fn validate(request: &DraftRequest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if request.draft.is_empty() {
        issues.push(ValidationIssue::EmptyDraft);
    } else if request.draft.trim().is_empty() {
        issues.push(ValidationIssue::BlankDraft);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldUpdate, FormState, TextField};

    fn request_with_draft(draft: &str) -> DraftRequest {
        let mut state = FormState::new();
        state.update_field(FieldUpdate::Text(TextField::Draft, draft.into()));
        state.draft_request()
    }

    #[test]
    fn default_draft_passes() {
        assert!(validate(&FormState::new().draft_request()).is_empty());
    }

    #[test]
    fn empty_and_blank_drafts_are_flagged() {
        assert_eq!(validate(&request_with_draft("")), vec![ValidationIssue::EmptyDraft]);
        assert_eq!(
            validate(&request_with_draft(" \n\t")),
            vec![ValidationIssue::BlankDraft]
        );
    }
}
