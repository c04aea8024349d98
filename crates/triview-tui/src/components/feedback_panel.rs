//! Results area: hint, progress, or the reviewer cards and summaries.
//!
//! Holds the last projected [`View`]; the app replaces it after every
//! action, so this component never inspects form state itself.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use std::cell::Cell;

use triview_core::render::{FeedbackCard, ResultsPane, SummaryCard, View};
use triview_core::FormState;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Rows moved by PageUp / PageDown.
const PAGE: u16 = 10;

pub struct FeedbackPanelComponent {
    view: View,
    scroll: u16,
    /// Inner width and height of the last render, for clamping the scroll
    /// against wrapped rows. Zero until first drawn.
    viewport: Cell<(u16, u16)>,
    tick: usize,
}

impl FeedbackPanelComponent {
    pub fn new() -> Self {
        Self {
            view: triview_core::render::render(&FormState::new()),
            scroll: 0,
            viewport: Cell::new((0, 0)),
            tick: 0,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Replace the projected view. Scroll resets whenever the results change.
    pub fn set_view(&mut self, view: View) {
        if view.results != self.view.results {
            self.scroll = 0;
        }
        self.view = view;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Rows the error region needs at `width` to show the whole message,
    /// capped at `max`. Zero when there is no error.
    pub fn error_height(&self, width: u16, max: u16) -> u16 {
        match self.view.error {
            Some(ref error) if width > 0 => {
                let rows = error_paragraph(error).line_count(width);
                rows.min(max as usize) as u16
            }
            _ => 0,
        }
    }

    /// Last row offset that still fills the viewport. Before the first
    /// render, falls back to one row per source line.
    fn max_scroll(&self) -> u16 {
        let (width, height) = self.viewport.get();
        if width == 0 {
            return (self.content().len() as u16).saturating_sub(1);
        }
        let rows = self.body().line_count(width);
        rows.saturating_sub(height as usize).min(u16::MAX as usize) as u16
    }

    fn body(&self) -> Paragraph<'_> {
        Paragraph::new(self.content()).wrap(Wrap { trim: false })
    }

    /// Draw the submit affordance.
    pub fn render_submit(&self, frame: &mut Frame, area: Rect) {
        let submit = self.view.submit;
        let (label, style) = if submit.enabled {
            (format!(" {} ", submit.label), Theme::button())
        } else {
            let spin = SPINNER[self.tick % SPINNER.len()];
            (format!(" {} {} ", spin, submit.label), Theme::button_disabled())
        };
        let button = Paragraph::new(Line::from(Span::styled(label, style)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Theme::border()));
        frame.render_widget(button, area);
    }

    /// Draw the error region, if there is an error.
    pub fn render_error(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref error) = self.view.error {
            frame.render_widget(error_paragraph(error), area);
        }
    }

    fn content(&self) -> Vec<Line<'_>> {
        match &self.view.results {
            ResultsPane::Hint(hint) => vec![Line::from(Span::styled(*hint, Theme::dim()))],
            ResultsPane::Working => vec![Line::from(Span::styled(
                format!(
                    "{} {}",
                    SPINNER[self.tick % SPINNER.len()],
                    self.view.submit.label
                ),
                Theme::muted(),
            ))],
            ResultsPane::Results {
                cards,
                action_plan,
                refined_draft,
            } => {
                let mut lines = Vec::new();
                for card in cards {
                    push_card(&mut lines, card);
                }
                push_summary(&mut lines, action_plan);
                push_summary(&mut lines, refined_draft);
                lines
            }
        }
    }
}

fn error_paragraph(error: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(error, Theme::error_text())).wrap(Wrap { trim: true })
}

fn push_card<'a>(lines: &mut Vec<Line<'a>>, card: &'a FeedbackCard) {
    lines.push(Line::from(Span::styled(
        format!("▍{}", card.title),
        Theme::card_title(card.perspective),
    )));
    for section in &card.sections {
        lines.push(Line::from(Span::styled(
            format!("  {}", section.heading),
            Theme::header().add_modifier(Modifier::UNDERLINED),
        )));
        push_body(lines, &section.body);
    }
    lines.push(Line::from(""));
}

fn push_summary<'a>(lines: &mut Vec<Line<'a>>, card: &'a SummaryCard) {
    lines.push(Line::from(Span::styled(format!("▍{}", card.title), Theme::title())));
    push_body(lines, &card.body);
    lines.push(Line::from(""));
}

/// Body text is shown as-is, one terminal line per source line.
fn push_body<'a>(lines: &mut Vec<Line<'a>>, body: &'a str) {
    for line in body.split('\n') {
        lines.push(Line::from(Span::styled(line, Theme::normal())));
    }
}

impl Component for FeedbackPanelComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        let max = self.max_scroll();
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            Action::ScrollDown => self.scroll = (self.scroll + 1).min(max),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::PageDown => self.scroll = self.scroll.saturating_add(PAGE).min(max),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(PAGE),
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.view.results {
            ResultsPane::Results { cards, .. } => format!(
                " Feedback ({} of 3 agents) ",
                cards.len()
            ),
            _ => " Feedback ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .title_style(Theme::muted())
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        self.viewport.set((inner.width, inner.height));
        frame.render_widget(block, area);

        let scroll = self.scroll.min(self.max_scroll());
        frame.render_widget(self.body().scroll((scroll, 0)), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::buffer_text;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use triview_core::render::render;
    use triview_core::{FeedbackResult, PerspectiveFeedback, SubmitError};

    fn feedback(tag: &str) -> PerspectiveFeedback {
        PerspectiveFeedback {
            strengths: format!("{tag} strengths"),
            issues: format!("{tag} issues"),
            suggestions: format!("{tag} suggestions"),
            severity: format!("{tag} severity"),
        }
    }

    fn draw(panel: &FeedbackPanelComponent) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                panel.render(f, area);
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn panel_for(state: &FormState) -> FeedbackPanelComponent {
        let mut panel = FeedbackPanelComponent::new();
        panel.set_view(render(state));
        panel
    }

    #[test]
    fn shows_hint_before_any_submission() {
        let screen = draw(&FeedbackPanelComponent::new());
        assert!(screen.contains("Submit your draft"));
    }

    #[test]
    fn shows_progress_instead_of_hint_while_loading() {
        let mut state = FormState::new();
        state.begin_submit();
        let screen = draw(&panel_for(&state));
        assert!(screen.contains("Getting feedback..."));
        assert!(!screen.contains("Submit your draft"));
    }

    #[test]
    fn omits_missing_editor_card() {
        let mut state = FormState::new();
        let s = state.begin_submit();
        state.settle(
            s.id,
            Ok(FeedbackResult {
                peer_feedback: Some(feedback("peer")),
                expert_feedback: Some(feedback("expert")),
                action_plan: Some("Revise intro.".into()),
                refined_draft: Some("Test draft, revised.".into()),
                ..Default::default()
            }),
        );

        let screen = draw(&panel_for(&state));
        assert!(screen.contains("Supportive Peer Agent"));
        assert!(screen.contains("Domain Expert Agent"));
        assert!(!screen.contains("Critical Editor Agent"));
        assert!(screen.contains("Combined Action Plan"));
        assert!(screen.contains("Revise intro."));
        assert!(screen.contains("Test draft, revised."));
        assert!(screen.contains("2 of 3 agents"));
    }

    #[test]
    fn error_region_only_when_failed() {
        let mut state = FormState::new();
        let s = state.begin_submit();
        state.settle(s.id, Err(SubmitError::Http(500)));
        let panel = panel_for(&state);
        assert_eq!(panel.error_height(40, 6), 1);
        assert_eq!(panel.view().error.as_deref(), Some("Backend error: 500"));

        let mut terminal = Terminal::new(TestBackend::new(40, 1)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                panel.render_error(f, area);
            })
            .unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("Backend error: 500"));

        assert_eq!(FeedbackPanelComponent::new().error_height(40, 6), 0);
    }

    #[test]
    fn long_transport_error_gets_enough_rows() {
        let message = "error sending request for url (http://localhost:8000/api/feedback): \
                       client error (Connect): tcp connect error: Connection refused (os error 111)";
        let mut state = FormState::new();
        let s = state.begin_submit();
        state.settle(s.id, Err(SubmitError::transport(message)));
        let panel = panel_for(&state);

        let height = panel.error_height(36, 10);
        assert!(height > 2, "height {height}");
        assert!(height < 10);

        let mut terminal = Terminal::new(TestBackend::new(36, height)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                panel.render_error(f, area);
            })
            .unwrap();
        let screen = buffer_text(terminal.backend().buffer());
        assert!(screen.contains("error sending"));
        assert!(screen.contains("111)"));

        // The cap wins over the message length.
        assert_eq!(panel.error_height(36, 2), 2);
    }

    #[test]
    fn scroll_is_clamped_and_resets_on_new_results() {
        let mut state = FormState::new();
        let s = state.begin_submit();
        state.settle(
            s.id,
            Ok(FeedbackResult {
                peer_feedback: Some(feedback("peer")),
                ..Default::default()
            }),
        );
        let mut panel = panel_for(&state);
        for _ in 0..500 {
            panel.handle_action(&Action::ScrollDown);
        }
        assert_eq!(panel.scroll as usize, panel.content().len() - 1);

        state.begin_submit();
        panel.set_view(render(&state));
        assert_eq!(panel.scroll, 0);
    }

    #[test]
    fn scrolling_reaches_the_end_of_wrapped_text() {
        let mut state = FormState::new();
        let s = state.begin_submit();
        state.settle(
            s.id,
            Ok(FeedbackResult {
                refined_draft: Some(format!("{}THE_END", "word ".repeat(400))),
                ..Default::default()
            }),
        );
        let mut panel = panel_for(&state);
        let draw_small = |panel: &FeedbackPanelComponent| {
            let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
            terminal
                .draw(|f| {
                    let area = f.area();
                    panel.render(f, area);
                })
                .unwrap();
            buffer_text(terminal.backend().buffer())
        };

        assert!(!draw_small(&panel).contains("THE_END"));
        for _ in 0..1000 {
            panel.handle_action(&Action::ScrollDown);
        }
        assert!(panel.scroll > 10);
        assert!(draw_small(&panel).contains("THE_END"));

        // Scrolling back up by a page leaves the end off screen again.
        panel.handle_action(&Action::PageUp);
        assert!(!draw_small(&panel).contains("THE_END"));
    }
}
