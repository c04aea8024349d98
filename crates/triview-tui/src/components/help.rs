//! Help overlay with the keybinding reference.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct HelpComponent {
    pub visible: bool,
}

impl HelpComponent {
    pub fn new() -> Self {
        Self { visible: false }
    }

    fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .split(area);

        let horizontal = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .split(vertical[0]);

        horizontal[0]
    }
}

impl Component for HelpComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ToggleHelp => {
                self.visible = !self.visible;
            }
            // Any key closes help.
            _ if self.visible && action.is_user_input() => {
                self.visible = false;
            }
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog = Self::centered_rect(area, 56, 20);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Help: Keybindings ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(Theme::focused_border());

        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled("── Editing ──", Theme::header())),
            key_line("Tab / Shift+Tab", "Next / previous field"),
            key_line("Left / Right", "Move cursor, or change domain"),
            key_line("Up / Down", "Move between lines and fields"),
            key_line("Enter", "Newline in draft, else next field"),
            key_line("Ctrl+W", "Delete word"),
            key_line("Ctrl+S / Alt+Enter", "Request feedback"),
            key_line("Esc", "Stop editing"),
            Line::from(""),
            Line::from(Span::styled("── Browsing ──", Theme::header())),
            key_line("Enter / i / e", "Edit the form"),
            key_line("s", "Request feedback"),
            key_line("Up / Down / j / k", "Scroll feedback"),
            key_line("PgUp / PgDn / Space", "Page feedback"),
            key_line("?", "Toggle this help"),
            key_line("q / Ctrl+C", "Quit"),
        ];

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, dialog);
    }
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<22}", key), Theme::selected()),
        Span::styled(desc, Theme::normal()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_actions_do_not_close_help() {
        let mut help = HelpComponent::new();
        help.handle_action(&Action::ToggleHelp);
        help.handle_action(&Action::Tick);
        help.handle_action(&Action::SetStatus("Feedback received".into()));
        assert!(help.visible);
        help.handle_action(&Action::ScrollDown);
        assert!(!help.visible);
    }
}
