//! Terminal event handling. Captures keyboard, paste, and resize events
//! from crossterm and dispatches them as Actions.
//!
//! The handler operates in two modes:
//! - Normal: keys are mapped to shortcuts (quit, submit, scroll results).
//! - Editing: keys are forwarded as text input to the focused form field.
//!
//! The current InputMode is shared between the App and EventHandler via
//! an Arc<AtomicU8>.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

use crate::action::{Action, InputMode};

/// Encode InputMode as u8 for atomic sharing.
const MODE_NORMAL: u8 = 0;
const MODE_EDITING: u8 = 1;

/// Shared flag the App sets so the EventHandler knows which keymap to use.
pub type InputModeFlag = Arc<AtomicU8>;

pub fn new_input_mode_flag() -> InputModeFlag {
    Arc::new(AtomicU8::new(MODE_NORMAL))
}

pub fn set_input_mode(flag: &InputModeFlag, mode: InputMode) {
    let val = match mode {
        InputMode::Normal => MODE_NORMAL,
        InputMode::Editing => MODE_EDITING,
    };
    flag.store(val, Ordering::Relaxed);
}

fn get_input_mode(flag: &InputModeFlag) -> InputMode {
    match flag.load(Ordering::Relaxed) {
        MODE_EDITING => InputMode::Editing,
        _ => InputMode::Normal,
    }
}

/// Event loop that reads terminal events and sends Actions.
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Action>,
    tick_rate: Duration,
    mode_flag: InputModeFlag,
}

impl EventHandler {
    pub fn new(
        tx: mpsc::UnboundedSender<Action>,
        tick_rate: Duration,
        mode_flag: InputModeFlag,
    ) -> Self {
        Self {
            tx,
            tick_rate,
            mode_flag,
        }
    }

    /// Run the event loop until the terminal stream closes or the app stops
    /// listening. Should be spawned in a task.
    pub async fn run(&self) {
        self.pump(EventStream::new()).await;
    }

    /// Forward terminal events as actions, interleaved with ticks. Polling the
    /// stream is cancel-safe, so a tick never swallows a pending key.
    async fn pump<S>(&self, mut events: S)
    where
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let mut interval = tokio::time::interval(self.tick_rate);

        loop {
            let action = tokio::select! {
                _ = interval.tick() => Some(Action::Tick),
                event = events.next() => match event {
                    Some(Ok(event)) => self.map_event(event),
                    Some(Err(e)) => {
                        warn!("Terminal event error: {}", e);
                        None
                    }
                    None => break,
                },
            };

            if let Some(action) = action {
                if self.tx.send(action).is_err() {
                    break;
                }
            }
        }
    }

    fn map_event(&self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                map_key(key, get_input_mode(&self.mode_flag))
            }
            Event::Paste(text) => Some(Action::PasteBulk(text)),
            Event::Resize(_, _) => Some(Action::Tick),
            _ => None,
        }
    }
}

fn map_key(key: KeyEvent, mode: InputMode) -> Option<Action> {
    // Ctrl+C always quits regardless of mode.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match mode {
        InputMode::Editing => map_key_editing(key),
        InputMode::Normal => map_key_normal(key),
    }
}

/// Key mapping when a form field is focused. Most keys become text input;
/// only a few are reserved for navigation and submission.
fn map_key_editing(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('w') => Some(Action::DeleteWord),
            KeyCode::Char('s') | KeyCode::Enter => Some(Action::SubmitForm),
            _ => None,
        };
    }

    // Alt+Enter also submits (some terminals send this instead of Ctrl+Enter).
    if key.modifiers.contains(KeyModifiers::ALT) && key.code == KeyCode::Enter {
        return Some(Action::SubmitForm);
    }

    match key.code {
        KeyCode::Esc => Some(Action::ExitEditing),
        KeyCode::Tab => Some(Action::NextField),
        KeyCode::BackTab => Some(Action::PrevField),
        KeyCode::Enter => Some(Action::NewlineInput),
        KeyCode::Up => Some(Action::CursorUp),
        KeyCode::Down => Some(Action::CursorDown),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Backspace => Some(Action::BackspaceInput),
        KeyCode::Char(c) => Some(Action::CharInput(c)),
        _ => None,
    }
}

/// Key mapping in normal mode: shortcuts and result scrolling.
fn map_key_normal(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('s') => Some(Action::SubmitForm),
        KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('e') => Some(Action::EnterEditing),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::PageDown),
        KeyCode::Esc => Some(Action::ClearStatus),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn ctrl_c_quits_in_both_modes() {
        assert!(matches!(map_key(ctrl('c'), InputMode::Editing), Some(Action::Quit)));
        assert!(matches!(map_key(ctrl('c'), InputMode::Normal), Some(Action::Quit)));
    }

    #[test]
    fn typing_q_while_editing_is_text() {
        assert!(matches!(
            map_key(key(KeyCode::Char('q')), InputMode::Editing),
            Some(Action::CharInput('q'))
        ));
        assert!(matches!(
            map_key(key(KeyCode::Char('q')), InputMode::Normal),
            Some(Action::Quit)
        ));
    }

    #[test]
    fn submit_shortcuts() {
        assert!(matches!(map_key(ctrl('s'), InputMode::Editing), Some(Action::SubmitForm)));
        assert!(matches!(
            map_key(
                KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT),
                InputMode::Editing
            ),
            Some(Action::SubmitForm)
        ));
        assert!(matches!(
            map_key(key(KeyCode::Char('s')), InputMode::Normal),
            Some(Action::SubmitForm)
        ));
    }

    #[test]
    fn escape_leaves_editing() {
        assert!(matches!(
            map_key(key(KeyCode::Esc), InputMode::Editing),
            Some(Action::ExitEditing)
        ));
        assert!(matches!(
            map_key(key(KeyCode::Enter), InputMode::Normal),
            Some(Action::EnterEditing)
        ));
    }

    #[tokio::test]
    async fn keys_survive_competing_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let flag = new_input_mode_flag();
        set_input_mode(&flag, InputMode::Editing);
        let handler = EventHandler::new(tx, Duration::from_millis(1), flag);

        // Each key arrives well after several ticks have fired.
        let keys = "abc".chars().map(|c| key(KeyCode::Char(c)));
        let events = futures::stream::unfold(keys, |mut keys| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            keys.next().map(|k| (Ok(Event::Key(k)), keys))
        });
        handler.pump(Box::pin(events)).await;

        let mut typed = String::new();
        let mut ticks = 0;
        while let Ok(action) = rx.try_recv() {
            match action {
                Action::CharInput(c) => typed.push(c),
                Action::Tick => ticks += 1,
                other => panic!("unexpected action {:?}", other),
            }
        }
        assert_eq!(typed, "abc");
        assert!(ticks > 0);
    }

    #[test]
    fn mode_flag_round_trips() {
        let flag = new_input_mode_flag();
        assert_eq!(get_input_mode(&flag), InputMode::Normal);
        set_input_mode(&flag, InputMode::Editing);
        assert_eq!(get_input_mode(&flag), InputMode::Editing);
    }
}
