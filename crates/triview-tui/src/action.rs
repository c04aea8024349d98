//! Action enum: the central message bus for the TUI.
//! All user interactions and async results flow through here.

use triview_core::{FeedbackResult, RequestId, SubmitError, Submission};

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// Clear the status message.
    ClearStatus,
    /// A tick event for animations.
    Tick,
    /// Move focus into the form and start capturing keys.
    EnterEditing,
    /// Leave the form; keys become shortcuts again.
    ExitEditing,

    // ── Text Input ───────────────────────────────────────────
    /// A character was typed (only sent when in input mode).
    CharInput(char),
    /// Backspace pressed (only sent when in input mode).
    BackspaceInput,
    /// Delete word (Ctrl+W).
    DeleteWord,
    /// Enter: newline in the draft, next field elsewhere.
    NewlineInput,
    /// Bulk paste from bracketed paste mode (terminal sends entire text at once).
    PasteBulk(String),
    NextField,
    PrevField,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,

    // ── Submission ───────────────────────────────────────────
    /// User asked for feedback (Ctrl+S in editing mode, `s` otherwise).
    SubmitForm,
    /// The form entered the submitting state; issue this request.
    SubmitDraft(Submission),
    /// A request finished, one way or the other.
    FeedbackSettled {
        id: RequestId,
        outcome: Result<FeedbackResult, SubmitError>,
    },

    // ── Results scrolling ───────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
}

impl Action {
    /// Actions that originate from a key press rather than from a timer or a
    /// background task.
    pub fn is_user_input(&self) -> bool {
        !matches!(
            self,
            Action::Tick
                | Action::SetStatus(_)
                | Action::ClearStatus
                | Action::SubmitDraft(_)
                | Action::FeedbackSettled { .. }
        )
    }
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the form instead of interpreted as global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode: keys are global shortcuts.
    Normal,
    /// Text input mode: keys go to the focused form field.
    Editing,
}
