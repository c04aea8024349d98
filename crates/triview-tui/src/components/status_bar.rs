//! Status bar at the bottom of the TUI.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::{Action, InputMode};
use crate::components::Component;
use crate::theme::Theme;

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
    pub mode: InputMode,
    /// Whether a feedback request is in flight.
    pub working: bool,
}

impl StatusBarComponent {
    pub fn new() -> Self {
        Self {
            message: "Edit your draft, then press Ctrl+S for feedback.".to_string(),
            mode: InputMode::Editing,
            working: false,
        }
    }

    /// Short mode name for the pill badge.
    fn badge(&self) -> &'static str {
        match (self.working, self.mode) {
            (true, _) => "Working",
            (false, InputMode::Editing) => "Editing",
            (false, InputMode::Normal) => "Browsing",
        }
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::SetStatus(msg) => {
                self.message = msg.clone();
            }
            Action::ClearStatus => {
                self.message.clear();
            }
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;

        let hints = "q·?·ctrl+s";
        let hints_len = hints.chars().count() + 1;

        let badge = self.badge();
        let badge_len = badge.len() + 2;

        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(hints_len)
            .saturating_sub(4);

        let msg: String = if self.message.chars().count() > msg_budget {
            if msg_budget > 3 {
                let kept: String = self.message.chars().take(msg_budget - 3).collect();
                format!("{kept}...")
            } else {
                String::new()
            }
        } else {
            self.message.clone()
        };

        let used = badge_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + hints_len);

        let line = Line::from(vec![
            Span::styled(format!(" {} ", badge), Theme::muted()),
            Span::styled("  ", Theme::dim()),
            Span::styled(msg, Theme::dim()),
            Span::raw(" ".repeat(pad)),
            Span::styled(hints, Theme::key_hint()),
            Span::raw(" "),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
