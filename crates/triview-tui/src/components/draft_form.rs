//! The input form: domain picker, draft text area, and preference fields.
//!
//! Features:
//! - Domain: Left/Right cycles through the fixed set of domains
//! - Draft: multi-line text area with word wrap and a scroll viewport
//! - Tone / Length / Notes: single-line fields
//! - Tab / Shift+Tab move between fields, Ctrl+S submits
//!
//! Every edit goes through `FormState::update_field`; the component only
//! owns focus and cursor position.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use triview_core::{FieldUpdate, FormState, TextField};

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

/// Which input is focused, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Domain,
    Draft,
    Tone,
    Length,
    Notes,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Domain,
        FormField::Draft,
        FormField::Tone,
        FormField::Length,
        FormField::Notes,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> FormField {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> FormField {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn text_field(self) -> Option<TextField> {
        match self {
            FormField::Domain => None,
            FormField::Draft => Some(TextField::Draft),
            FormField::Tone => Some(TextField::Tone),
            FormField::Length => Some(TextField::Length),
            FormField::Notes => Some(TextField::Notes),
        }
    }
}

pub struct DraftFormComponent {
    /// Inputs and request lifecycle.
    pub state: FormState,
    /// Whether keys are captured by the form.
    pub editing: bool,
    focused: FormField,
    /// Byte offset within the focused text field. Always on a char boundary.
    cursor: usize,
}

impl DraftFormComponent {
    pub fn new() -> Self {
        let mut this = Self {
            state: FormState::new(),
            editing: true,
            focused: FormField::Draft,
            cursor: 0,
        };
        this.cursor = this.state.text(TextField::Draft).len();
        this
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    /// Overwrite a field from outside (CLI prefill). Resets the cursor if the
    /// focused field changed underneath it.
    pub fn apply(&mut self, update: FieldUpdate) {
        let touches_focus = matches!(
            &update,
            FieldUpdate::Text(field, _) if self.focused.text_field() == Some(*field)
        );
        self.state.update_field(update);
        if touches_focus {
            self.cursor = self.focused_text().len();
        }
    }

    fn focused_text(&self) -> &str {
        self.focused
            .text_field()
            .map(|f| self.state.text(f))
            .unwrap_or("")
    }

    /// Run an edit against the focused text field and write the result back
    /// through the form state.
    fn edit_focused(&mut self, edit: impl FnOnce(&mut String, &mut usize)) {
        let Some(field) = self.focused.text_field() else {
            return;
        };
        let mut value = self.state.text(field).to_string();
        let mut cursor = self.cursor.min(value.len());
        edit(&mut value, &mut cursor);
        self.cursor = cursor;
        self.state.update_field(FieldUpdate::Text(field, value));
    }

    fn insert_str(&mut self, s: &str) {
        // Single-line fields take only the first line of a paste.
        let text = if self.focused == FormField::Draft {
            s.replace("\r\n", "\n")
        } else {
            s.lines().next().unwrap_or("").to_string()
        };
        self.edit_focused(|value, cursor| {
            value.insert_str(*cursor, &text);
            *cursor += text.len();
        });
    }

    fn delete_char(&mut self) {
        self.edit_focused(|value, cursor| {
            if let Some((prev, _)) = value[..*cursor].char_indices().next_back() {
                value.remove(prev);
                *cursor = prev;
            }
        });
    }

    /// Delete the word before the cursor (Ctrl+W).
    fn delete_word(&mut self) {
        self.edit_focused(|value, cursor| {
            let bytes = value.as_bytes();
            let mut end = *cursor;
            while end > 0 && bytes[end - 1] == b' ' {
                end -= 1;
            }
            let mut start = end;
            while start > 0 && !matches!(bytes[start - 1], b' ' | b'\n') {
                start -= 1;
            }
            value.drain(start..*cursor);
            *cursor = start;
        });
    }

    fn cursor_left(&mut self) {
        if self.focused == FormField::Domain {
            let prev = self.state.domain().prev();
            self.state.update_field(FieldUpdate::Domain(prev));
            return;
        }
        let text = self.focused_text();
        let cursor = self.cursor.min(text.len());
        if let Some((prev, _)) = text[..cursor].char_indices().next_back() {
            self.cursor = prev;
        }
    }

    fn cursor_right(&mut self) {
        if self.focused == FormField::Domain {
            let next = self.state.domain().next();
            self.state.update_field(FieldUpdate::Domain(next));
            return;
        }
        let text = self.focused_text();
        let cursor = self.cursor.min(text.len());
        if let Some(c) = text[cursor..].chars().next() {
            self.cursor = cursor + c.len_utf8();
        }
    }

    /// Move up a line in the draft, or to the previous field from the top.
    fn cursor_up(&mut self) {
        if self.focused != FormField::Draft {
            self.focus(self.focused.prev());
            return;
        }
        let text = self.state.text(TextField::Draft);
        let (line, col) = line_col(text, self.cursor);
        if line == 0 {
            self.focus(FormField::Domain);
        } else {
            self.cursor = offset_at(text, line - 1, col);
        }
    }

    /// Move down a line in the draft, or to the next field from the bottom.
    fn cursor_down(&mut self) {
        if self.focused != FormField::Draft {
            self.focus(self.focused.next());
            return;
        }
        let text = self.state.text(TextField::Draft);
        let (line, col) = line_col(text, self.cursor);
        if line + 1 >= text.split('\n').count() {
            self.focus(FormField::Tone);
        } else {
            self.cursor = offset_at(text, line + 1, col);
        }
    }

    fn focus(&mut self, field: FormField) {
        self.focused = field;
        self.cursor = self.focused_text().len();
    }

    /// Enter the submitting state and hand the request to the app.
    fn submit(&mut self) -> Option<Action> {
        let submission = self.state.begin_submit();
        Some(Action::SubmitDraft(submission))
    }

    // ── Rendering ───────────────────────────────────────────

    fn field_block(title: &str, is_focused: bool) -> Block<'_> {
        Block::default()
            .title(title)
            .title_style(if is_focused {
                Theme::key_hint()
            } else {
                Theme::muted()
            })
            .borders(Borders::ALL)
            .border_style(if is_focused {
                Theme::focused_border()
            } else {
                Theme::border()
            })
    }

    fn render_domain(&self, frame: &mut Frame, area: Rect) {
        let is_focused = self.editing && self.focused == FormField::Domain;
        let label = self.state.domain().label();
        let line = if is_focused {
            Line::from(vec![
                Span::styled("◀ ", Theme::key_hint()),
                Span::styled(label, Theme::selected()),
                Span::styled(" ▶", Theme::key_hint()),
            ])
        } else {
            Line::from(Span::styled(label, Theme::normal()))
        };
        let block = Self::field_block(" Domain ", is_focused);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    /// Render a single-line text field with cursor.
    fn render_line_field(
        &self,
        field: FormField,
        title: &str,
        placeholder: &str,
        frame: &mut Frame,
        area: Rect,
    ) {
        let is_focused = self.editing && self.focused == field;
        let text = field
            .text_field()
            .map(|f| self.state.text(f))
            .unwrap_or("");
        let block = Self::field_block(title, is_focused);

        let display = if text.is_empty() && !is_focused {
            Paragraph::new(Span::styled(placeholder, Theme::dim()))
        } else if is_focused {
            Paragraph::new(cursor_line(text, self.cursor.min(text.len())))
        } else {
            Paragraph::new(Span::styled(text, Theme::normal()))
        };

        frame.render_widget(display.block(block), area);
    }

    /// Render the multi-line draft with word wrap, cursor, and scrolling.
    fn render_draft(&self, frame: &mut Frame, area: Rect) {
        let is_focused = self.editing && self.focused == FormField::Draft;
        let text = self.state.text(TextField::Draft);
        let line_count = text.split('\n').count();
        let title = format!(
            " Draft text ({} line{}, {} chars) ",
            line_count,
            if line_count == 1 { "" } else { "s" },
            text.chars().count()
        );
        let block = Self::field_block(&title, is_focused);
        let inner = block.inner(area);
        let viewport = inner.height as usize;

        if text.is_empty() && !is_focused {
            let placeholder = Paragraph::new(Span::styled(
                "Paste or type the draft you want reviewed.",
                Theme::dim(),
            ))
            .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let cursor = is_focused.then_some(self.cursor.min(text.len()));
        let (visual, cursor_line_idx) = layout_lines(text, cursor, inner.width as usize);

        // Keep the cursor row on screen; unfocused drafts show from the top.
        let scroll = match cursor {
            Some(_) if viewport > 0 && cursor_line_idx >= viewport => cursor_line_idx + 1 - viewport,
            _ => 0,
        };

        let lines: Vec<Line> = visual
            .iter()
            .skip(scroll)
            .take(viewport)
            .map(|vl| match vl.cursor {
                Some(col) => cursor_line(vl.text, col),
                None => Line::from(Span::styled(vl.text, Theme::normal())),
            })
            .collect();

        let below = visual.len().saturating_sub(scroll + viewport);
        let block = if below > 0 {
            block.title_bottom(Line::from(Span::styled(
                format!(" [{} more below] ", below),
                Theme::dim(),
            )))
        } else {
            block
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn instructions(&self) -> Line<'static> {
        let pairs: &[(&'static str, &'static str)] = if !self.editing {
            &[("enter", " edit  "), ("s", " submit  "), ("↑↓", " scroll results")]
        } else if self.focused == FormField::Domain {
            &[("←→", " change  "), ("tab", " next  "), ("ctrl+s", " submit")]
        } else {
            &[("ctrl+s", " submit  "), ("tab", " next  "), ("esc", " browse")]
        };
        let mut spans = vec![Span::raw("  ")];
        for (key, desc) in pairs {
            spans.push(Span::styled(*key, Theme::key_hint()));
            spans.push(Span::styled(*desc, Theme::dim()));
        }
        Line::from(spans)
    }
}

impl Component for DraftFormComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::EnterEditing => {
                self.editing = true;
                None
            }
            Action::ExitEditing => {
                self.editing = false;
                None
            }
            Action::SubmitForm => self.submit(),
            _ if !self.editing => None,

            Action::CharInput(c) => {
                match self.focused {
                    FormField::Domain => {}
                    _ => {
                        let c = *c;
                        self.edit_focused(|value, cursor| {
                            value.insert(*cursor, c);
                            *cursor += c.len_utf8();
                        });
                    }
                }
                None
            }
            Action::BackspaceInput => {
                self.delete_char();
                None
            }
            Action::DeleteWord => {
                self.delete_word();
                None
            }
            Action::PasteBulk(text) => {
                if !text.is_empty() {
                    self.insert_str(text);
                }
                None
            }
            Action::NewlineInput => {
                if self.focused == FormField::Draft {
                    self.insert_str("\n");
                } else {
                    self.focus(self.focused.next());
                }
                None
            }
            Action::NextField => {
                self.focus(self.focused.next());
                None
            }
            Action::PrevField => {
                self.focus(self.focused.prev());
                None
            }
            Action::CursorLeft => {
                self.cursor_left();
                None
            }
            Action::CursorRight => {
                self.cursor_right();
                None
            }
            Action::CursorUp => {
                self.cursor_up();
                None
            }
            Action::CursorDown => {
                self.cursor_down();
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Domain
            Constraint::Min(6),    // Draft
            Constraint::Length(3), // Tone | Length
            Constraint::Length(3), // Notes
            Constraint::Length(1), // Instructions
        ])
        .split(area);

        self.render_domain(frame, chunks[0]);
        self.render_draft(frame, chunks[1]);

        let prefs = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        self.render_line_field(
            FormField::Tone,
            " Tone ",
            "friendly and clear",
            frame,
            prefs[0],
        );
        self.render_line_field(
            FormField::Length,
            " Length ",
            "short blog post",
            frame,
            prefs[1],
        );
        self.render_line_field(
            FormField::Notes,
            " Extra notes for the agents ",
            "Anything special they should know...",
            frame,
            chunks[3],
        );

        frame.render_widget(
            Paragraph::new(self.instructions()).wrap(Wrap { trim: false }),
            chunks[4],
        );
    }
}

/// A line with the character under `cursor` highlighted.
fn cursor_line(text: &str, cursor: usize) -> Line<'_> {
    let (before, after) = text.split_at(cursor);
    let (under, rest) = match after.chars().next() {
        Some(c) => after.split_at(c.len_utf8()),
        None => (" ", ""),
    };
    Line::from(vec![
        Span::styled(before, Theme::normal()),
        Span::styled(under, Theme::cursor()),
        Span::styled(rest, Theme::normal()),
    ])
}

/// Logical line index and column (in chars) of a byte offset.
fn line_col(text: &str, cursor: usize) -> (usize, usize) {
    let before = &text[..cursor.min(text.len())];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    (line, before[line_start..].chars().count())
}

/// Byte offset of `col` chars into logical line `line`, clamped to the line end.
fn offset_at(text: &str, line: usize, col: usize) -> usize {
    let line_start: usize = text.split('\n').take(line).map(|l| l.len() + 1).sum();
    let line_text = text.split('\n').nth(line).unwrap_or("");
    line_start
        + line_text
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line_text.len())
}

/// One row of the wrapped draft.
struct VisualLine<'a> {
    text: &'a str,
    /// Cursor byte offset within `text`, if the cursor sits on this row.
    cursor: Option<usize>,
}

/// Wrap every logical line and locate the cursor. Returns the rows and the
/// index of the row holding the cursor.
fn layout_lines(text: &str, cursor: Option<usize>, width: usize) -> (Vec<VisualLine<'_>>, usize) {
    let mut rows = Vec::new();
    let mut cursor_row = 0;
    let mut offset = 0;

    for logical in text.split('\n') {
        let segments = wrap_line(logical, width);
        let count = segments.len();
        for (i, segment) in segments.into_iter().enumerate() {
            let start = offset;
            let end = start + segment.len();
            // A cursor at a wrap boundary belongs to the next row.
            let here = cursor.filter(|&c| c >= start && (c < end || (c == end && i + 1 == count)));
            if here.is_some() {
                cursor_row = rows.len();
            }
            rows.push(VisualLine {
                text: segment,
                cursor: here.map(|c| c - start),
            });
            offset = end;
        }
        offset += 1;
    }

    (rows, cursor_row)
}

/// Word-wrap a single logical line to `max_width` columns. Breaks after a
/// space when one falls in the last two thirds of the row, otherwise hard
/// breaks. The segments concatenate back to `text`.
fn wrap_line(text: &str, max_width: usize) -> Vec<&str> {
    if max_width == 0 || text.chars().count() <= max_width {
        return vec![text];
    }

    let mut segments = Vec::new();
    let mut remaining = text;

    while remaining.chars().count() > max_width {
        let hard = remaining
            .char_indices()
            .nth(max_width)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let chunk = &remaining[..hard];
        let split = match chunk.rfind(' ') {
            Some(pos) if chunk[..pos].chars().count() > max_width / 3 => pos + 1,
            _ => hard,
        };
        let (segment, rest) = remaining.split_at(split);
        segments.push(segment);
        remaining = rest;
    }
    segments.push(remaining);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::buffer_text;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use triview_core::Domain;

    fn form_on(field: FormField) -> DraftFormComponent {
        let mut form = DraftFormComponent::new();
        form.focus(field);
        form
    }

    fn type_str(form: &mut DraftFormComponent, s: &str) {
        for c in s.chars() {
            form.handle_action(&Action::CharInput(c));
        }
    }

    #[test]
    fn typing_edits_only_the_focused_field() {
        let mut form = form_on(FormField::Tone);
        let before = form.state.draft_request();
        type_str(&mut form, ", upbeat");

        let after = form.state.draft_request();
        assert_eq!(after.preferences.tone, "friendly and clear, upbeat");
        assert_eq!(after.draft, before.draft);
        assert_eq!(after.preferences.length, before.preferences.length);
        assert_eq!(after.preferences.extra_notes, before.preferences.extra_notes);
    }

    #[test]
    fn backspace_and_delete_word_respect_multibyte_text() {
        let mut form = form_on(FormField::Notes);
        form.apply(FieldUpdate::Text(TextField::Notes, String::new()));
        type_str(&mut form, "café crème");
        form.handle_action(&Action::BackspaceInput);
        assert_eq!(form.state.text(TextField::Notes), "café crèm");
        form.handle_action(&Action::DeleteWord);
        assert_eq!(form.state.text(TextField::Notes), "café ");
        form.handle_action(&Action::CursorLeft);
        form.handle_action(&Action::BackspaceInput);
        assert_eq!(form.state.text(TextField::Notes), "caf ");
    }

    #[test]
    fn enter_inserts_newline_only_in_draft() {
        let mut form = form_on(FormField::Draft);
        form.apply(FieldUpdate::Text(TextField::Draft, "one".into()));
        form.handle_action(&Action::NewlineInput);
        type_str(&mut form, "two");
        assert_eq!(form.state.text(TextField::Draft), "one\ntwo");

        let mut form = form_on(FormField::Tone);
        form.handle_action(&Action::NewlineInput);
        assert_eq!(form.focused(), FormField::Length);
        assert_eq!(form.state.text(TextField::Tone), "friendly and clear");
    }

    #[test]
    fn left_right_cycle_domain() {
        let mut form = form_on(FormField::Domain);
        form.handle_action(&Action::CursorRight);
        assert_eq!(form.state.domain(), Domain::BusinessEmail);
        form.handle_action(&Action::CursorLeft);
        form.handle_action(&Action::CursorLeft);
        assert_eq!(form.state.domain(), Domain::GeneralWriting);
        // Typing on the domain picker does nothing.
        form.handle_action(&Action::CharInput('x'));
        assert_eq!(form.state.domain(), Domain::GeneralWriting);
    }

    #[test]
    fn vertical_movement_keeps_column_and_leaves_draft_at_edges() {
        let mut form = form_on(FormField::Draft);
        form.apply(FieldUpdate::Text(TextField::Draft, "abcdef\nxy\nlonger line".into()));
        // Cursor at end of last line; move up twice.
        form.handle_action(&Action::CursorUp);
        assert_eq!(line_col(form.state.text(TextField::Draft), form.cursor), (1, 2));
        form.handle_action(&Action::CursorUp);
        assert_eq!(line_col(form.state.text(TextField::Draft), form.cursor), (0, 2));
        form.handle_action(&Action::CursorUp);
        assert_eq!(form.focused(), FormField::Domain);
    }

    #[test]
    fn tab_order_wraps() {
        let mut form = form_on(FormField::Notes);
        form.handle_action(&Action::NextField);
        assert_eq!(form.focused(), FormField::Domain);
        form.handle_action(&Action::PrevField);
        assert_eq!(form.focused(), FormField::Notes);
    }

    #[test]
    fn paste_into_single_line_field_keeps_first_line() {
        let mut form = form_on(FormField::Length);
        form.apply(FieldUpdate::Text(TextField::Length, String::new()));
        form.handle_action(&Action::PasteBulk("two pages\nignored".into()));
        assert_eq!(form.state.text(TextField::Length), "two pages");
    }

    #[test]
    fn keys_are_ignored_outside_editing_mode() {
        let mut form = form_on(FormField::Tone);
        form.handle_action(&Action::ExitEditing);
        form.handle_action(&Action::CharInput('z'));
        assert_eq!(form.state.text(TextField::Tone), "friendly and clear");
    }

    #[test]
    fn submit_enters_loading_and_emits_request() {
        let mut form = DraftFormComponent::new();
        form.handle_action(&Action::ExitEditing);
        let Some(Action::SubmitDraft(submission)) = form.handle_action(&Action::SubmitForm) else {
            panic!("expected a submission");
        };
        assert!(form.state.is_loading());
        assert_eq!(submission.request, FormState::new().draft_request());
    }

    #[test]
    fn wrap_line_segments_rejoin_to_input() {
        let text = "gentle, intuitive introduction to gradient descent using an example";
        let segments = wrap_line(text, 20);
        assert!(segments.len() > 1);
        assert_eq!(segments.concat(), text);
        assert!(segments.iter().all(|s| s.chars().count() <= 20));
    }

    #[test]
    fn wrap_line_hard_breaks_long_words() {
        let segments = wrap_line("ééééééééééé", 4);
        assert_eq!(segments, vec!["éééé", "éééé", "ééé"]);
    }

    #[test]
    fn cursor_at_wrap_boundary_moves_to_next_row() {
        let (rows, idx) = layout_lines("abcd efgh", Some(5), 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(idx, 1);
        assert_eq!(rows[1].cursor, Some(0));

        let (rows, idx) = layout_lines("ab\n", Some(3), 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(idx, 1);
    }

    #[test]
    fn renders_labels_and_current_values() {
        let form = DraftFormComponent::new();
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|f| form.render(f, f.area())).unwrap();
        let screen = buffer_text(terminal.backend().buffer());
        assert!(screen.contains("Domain"));
        assert!(screen.contains("Data Science Blog Post"));
        assert!(screen.contains("friendly and clear"));
        assert!(screen.contains("short blog post"));
        assert!(screen.contains("Extra notes for the agents"));
    }
}
