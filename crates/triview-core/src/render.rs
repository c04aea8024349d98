//! Pure projection from [`FormState`] to what the results area shows.
//!
//! Frontends draw a [`View`]; they never look at the lifecycle fields directly.

use std::fmt;

use crate::feedback::{FeedbackResult, Perspective, PerspectiveFeedback};
use crate::form::FormState;

pub const HINT: &str = "Submit your draft to see feedback from each agent, \
the combined action plan, and a refined draft.";
pub const SUBMIT_LABEL: &str = "Get multi-perspective feedback";
pub const WORKING_LABEL: &str = "Getting feedback...";
pub const ACTION_PLAN_TITLE: &str = "Combined Action Plan";
pub const REFINED_DRAFT_TITLE: &str = "Refined Draft";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub submit: SubmitButton,
    /// Error text for the error region.
    pub error: Option<String>,
    pub results: ResultsPane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPane {
    /// Nothing submitted yet, or the last submission failed.
    Hint(&'static str),
    /// A request is in flight.
    Working,
    Results {
        cards: Vec<FeedbackCard>,
        action_plan: SummaryCard,
        refined_draft: SummaryCard,
    },
}

/// One reviewer's card. Sections are in fixed order and copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackCard {
    pub perspective: Perspective,
    pub title: &'static str,
    pub sections: Vec<CardSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSection {
    pub heading: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub body: String,
}

impl View {
    /// Titles of the rendered reviewer cards, in display order.
    pub fn card_titles(&self) -> Vec<&'static str> {
        match &self.results {
            ResultsPane::Results { cards, .. } => cards.iter().map(|c| c.title).collect(),
            _ => Vec::new(),
        }
    }
}

pub fn render(state: &FormState) -> View {
    let submit = if state.is_loading() {
        SubmitButton {
            label: WORKING_LABEL,
            enabled: false,
        }
    } else {
        SubmitButton {
            label: SUBMIT_LABEL,
            enabled: true,
        }
    };

    let results = match state.result() {
        Some(result) => results_pane(result),
        None if state.is_loading() => ResultsPane::Working,
        None => ResultsPane::Hint(HINT),
    };

    View {
        submit,
        error: state.error().map(str::to_string),
        results,
    }
}

fn results_pane(result: &FeedbackResult) -> ResultsPane {
    let cards = Perspective::all()
        .iter()
        .filter_map(|p| result.perspective(*p).map(|fb| feedback_card(*p, fb)))
        .collect();

    ResultsPane::Results {
        cards,
        action_plan: SummaryCard {
            title: ACTION_PLAN_TITLE,
            body: result.action_plan.clone().unwrap_or_default(),
        },
        refined_draft: SummaryCard {
            title: REFINED_DRAFT_TITLE,
            body: result.refined_draft.clone().unwrap_or_default(),
        },
    }
}

fn feedback_card(perspective: Perspective, feedback: &PerspectiveFeedback) -> FeedbackCard {
    let section = |heading, body: &String| CardSection {
        heading,
        body: body.clone(),
    };
    FeedbackCard {
        perspective,
        title: perspective.title(),
        sections: vec![
            section("Strengths", &feedback.strengths),
            section("Issues", &feedback.issues),
            section("Suggestions", &feedback.suggestions),
            section("Severity", &feedback.severity),
        ],
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        match &self.results {
            ResultsPane::Hint(hint) => writeln!(f, "{hint}"),
            ResultsPane::Working => writeln!(f, "{WORKING_LABEL}"),
            ResultsPane::Results {
                cards,
                action_plan,
                refined_draft,
            } => {
                for card in cards {
                    writeln!(f, "== {} ==", card.title)?;
                    for section in &card.sections {
                        writeln!(f, "-- {}", section.heading)?;
                        writeln!(f, "{}", section.body)?;
                    }
                    writeln!(f)?;
                }
                for summary in [action_plan, refined_draft] {
                    writeln!(f, "== {} ==", summary.title)?;
                    writeln!(f, "{}", summary.body)?;
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}
