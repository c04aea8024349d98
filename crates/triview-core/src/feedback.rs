//! Wire types exchanged with the feedback service.
//! Field names mirror the service's JSON schema exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TriviewError;

/// The kind of writing being reviewed. Serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Domain {
    #[default]
    #[serde(rename = "Data Science Blog Post")]
    DataScienceBlogPost,
    #[serde(rename = "Business Email")]
    BusinessEmail,
    #[serde(rename = "Technical Report")]
    TechnicalReport,
    #[serde(rename = "General Writing")]
    GeneralWriting,
}

impl Domain {
    /// All domains in menu order.
    pub fn all() -> &'static [Domain] {
        &[
            Domain::DataScienceBlogPost,
            Domain::BusinessEmail,
            Domain::TechnicalReport,
            Domain::GeneralWriting,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::DataScienceBlogPost => "Data Science Blog Post",
            Domain::BusinessEmail => "Business Email",
            Domain::TechnicalReport => "Technical Report",
            Domain::GeneralWriting => "General Writing",
        }
    }

    /// Kebab-case name accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Domain::DataScienceBlogPost => "data-science-blog-post",
            Domain::BusinessEmail => "business-email",
            Domain::TechnicalReport => "technical-report",
            Domain::GeneralWriting => "general-writing",
        }
    }

    fn index(&self) -> usize {
        match self {
            Domain::DataScienceBlogPost => 0,
            Domain::BusinessEmail => 1,
            Domain::TechnicalReport => 2,
            Domain::GeneralWriting => 3,
        }
    }

    /// Next domain in menu order, wrapping around.
    pub fn next(&self) -> Domain {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    /// Previous domain in menu order, wrapping around.
    pub fn prev(&self) -> Domain {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = TriviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Domain::all()
            .iter()
            .copied()
            .find(|d| d.label().eq_ignore_ascii_case(needle) || d.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| TriviewError::UnknownDomain(needle.to_string()))
    }
}

/// Author preferences sent alongside the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub tone: String,
    pub length: String,
    #[serde(default)]
    pub extra_notes: String,
}

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub draft: String,
    pub domain: Domain,
    pub preferences: Preferences,
}

/// One reviewer's critique. All four fields are required by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveFeedback {
    pub strengths: String,
    pub issues: String,
    pub suggestions: String,
    pub severity: String,
}

/// Successful response body. Any perspective may be missing or null.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackResult {
    #[serde(default)]
    pub peer_feedback: Option<PerspectiveFeedback>,
    #[serde(default)]
    pub editor_feedback: Option<PerspectiveFeedback>,
    #[serde(default)]
    pub expert_feedback: Option<PerspectiveFeedback>,
    #[serde(default)]
    pub action_plan: Option<String>,
    #[serde(default)]
    pub refined_draft: Option<String>,
}

impl FeedbackResult {
    /// The record for one perspective, if the service produced it.
    pub fn perspective(&self, perspective: Perspective) -> Option<&PerspectiveFeedback> {
        match perspective {
            Perspective::SupportivePeer => self.peer_feedback.as_ref(),
            Perspective::CriticalEditor => self.editor_feedback.as_ref(),
            Perspective::DomainExpert => self.expert_feedback.as_ref(),
        }
    }
}

/// The three independent reviewer roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Perspective {
    SupportivePeer,
    CriticalEditor,
    DomainExpert,
}

impl Perspective {
    /// All perspectives in display order.
    pub fn all() -> &'static [Perspective] {
        &[
            Perspective::SupportivePeer,
            Perspective::CriticalEditor,
            Perspective::DomainExpert,
        ]
    }

    /// Card title for this perspective.
    pub fn title(&self) -> &'static str {
        match self {
            Perspective::SupportivePeer => "Supportive Peer Agent",
            Perspective::CriticalEditor => "Critical Editor Agent",
            Perspective::DomainExpert => "Domain Expert Agent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_parses_from_label_and_slug() {
        assert_eq!("General Writing".parse::<Domain>().unwrap(), Domain::GeneralWriting);
        assert_eq!("business-email".parse::<Domain>().unwrap(), Domain::BusinessEmail);
        assert_eq!(" technical report ".parse::<Domain>().unwrap(), Domain::TechnicalReport);
        assert!(matches!(
            "poetry".parse::<Domain>(),
            Err(TriviewError::UnknownDomain(name)) if name == "poetry"
        ));
    }

    #[test]
    fn domain_cycles_in_menu_order() {
        assert_eq!(Domain::GeneralWriting.next(), Domain::DataScienceBlogPost);
        assert_eq!(Domain::DataScienceBlogPost.prev(), Domain::GeneralWriting);
        assert_eq!(Domain::BusinessEmail.next(), Domain::TechnicalReport);
    }

    #[test]
    fn request_serializes_with_service_field_names() {
        let req = DraftRequest {
            draft: "Test draft".into(),
            domain: Domain::GeneralWriting,
            preferences: Preferences {
                tone: "friendly and clear".into(),
                length: "short blog post".into(),
                extra_notes: String::new(),
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "draft": "Test draft",
                "domain": "General Writing",
                "preferences": {
                    "tone": "friendly and clear",
                    "length": "short blog post",
                    "extra_notes": ""
                }
            })
        );
    }

    #[test]
    fn result_tolerates_missing_and_null_perspectives() {
        let body = json!({
            "peer_feedback": {
                "strengths": "Clear framing.",
                "issues": "None major.",
                "suggestions": "Add a figure.",
                "severity": "low"
            },
            "editor_feedback": null,
            "action_plan": "Revise intro.",
            "trace_id": "ignored"
        });
        let result: FeedbackResult = serde_json::from_value(body).unwrap();
        assert!(result.perspective(Perspective::SupportivePeer).is_some());
        assert!(result.perspective(Perspective::CriticalEditor).is_none());
        assert!(result.perspective(Perspective::DomainExpert).is_none());
        assert_eq!(result.action_plan.as_deref(), Some("Revise intro."));
        assert_eq!(result.refined_draft, None);
    }

    #[test]
    fn perspective_record_requires_all_fields() {
        let body = json!({
            "peer_feedback": { "strengths": "Good.", "issues": "Few." }
        });
        assert!(serde_json::from_value::<FeedbackResult>(body).is_err());
    }
}
