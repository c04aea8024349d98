//! Main application state and render loop.

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use triview_client::FeedbackService;
use triview_core::render::render;
use triview_core::validation::validate;
use triview_core::{FieldUpdate, Settlement, Submission};

use crate::action::{Action, InputMode};
use crate::components::draft_form::DraftFormComponent;
use crate::components::feedback_panel::FeedbackPanelComponent;
use crate::components::help::HelpComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};
use crate::theme::Theme;

/// Main application state.
pub struct App {
    /// Whether the app should exit.
    should_quit: bool,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,

    // ── Feedback service ─────────────────────────────────────
    service: Arc<dyn FeedbackService>,
    /// Cancels the task of the request currently in flight.
    in_flight: Option<CancellationToken>,

    // Components
    draft_form: DraftFormComponent,
    feedback_panel: FeedbackPanelComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new(service: Arc<dyn FeedbackService>) -> Self {
        Self {
            should_quit: false,
            input_mode_flag: event::new_input_mode_flag(),
            service,
            in_flight: None,
            draft_form: DraftFormComponent::new(),
            feedback_panel: FeedbackPanelComponent::new(),
            status_bar: StatusBarComponent::new(),
            help: HelpComponent::new(),
        }
    }

    /// Pre-fill a form field from CLI args.
    pub fn prefill(&mut self, update: FieldUpdate) {
        self.draft_form.apply(update);
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Set up terminal.
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Create the action channel.
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

        // Start the event handler with the shared input mode flag.
        let event_tx = tx.clone();
        let mode_flag = self.input_mode_flag.clone();
        let event_handler = EventHandler::new(event_tx, Duration::from_millis(100), mode_flag);
        tokio::spawn(async move {
            event_handler.run().await;
        });

        // The form starts focused.
        self.sync_input_mode();

        // Main loop.
        loop {
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            if let Some(action) = rx.recv().await {
                self.handle_action(&action, &tx);

                if self.should_quit {
                    break;
                }
            }
        }

        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }

        // Restore terminal.
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn current_input_mode(&self) -> InputMode {
        if !self.help.visible && self.draft_form.editing {
            InputMode::Editing
        } else {
            InputMode::Normal
        }
    }

    /// Push the current input mode to the event handler and status bar.
    fn sync_input_mode(&mut self) {
        let mode = self.current_input_mode();
        event::set_input_mode(&self.input_mode_flag, mode);
        self.status_bar.mode = mode;
        self.status_bar.working = self.draft_form.state.is_loading();
    }

    /// Dispatch an action to all relevant components.
    fn handle_action(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Action>) {
        // An open help overlay swallows key presses.
        if self.help.visible && action.is_user_input() && !matches!(action, Action::Quit) {
            self.help.handle_action(action);
            self.sync_input_mode();
            return;
        }

        // Global actions first.
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::SubmitDraft(submission) => {
                self.spawn_feedback_request(submission.clone(), tx.clone());
            }
            Action::FeedbackSettled { id, outcome } => {
                match self.draft_form.state.settle(*id, outcome.clone()) {
                    Settlement::Applied => {
                        self.in_flight = None;
                        let status = match outcome {
                            Ok(_) => {
                                info!(request = id.0, "Feedback received");
                                "Feedback received".to_string()
                            }
                            Err(e) => {
                                warn!(request = id.0, "Feedback request failed: {}", e);
                                format!("Request failed: {}", e)
                            }
                        };
                        let _ = tx.send(Action::SetStatus(status));
                    }
                    Settlement::Stale => {
                        debug!(request = id.0, "Ignoring superseded response");
                    }
                }
            }
            _ => {}
        }

        let chained = self.draft_form.handle_action(action);
        self.feedback_panel.handle_action(action);
        self.help.handle_action(action);
        self.status_bar.handle_action(action);

        // Re-derive the results view after every transition.
        self.feedback_panel.set_view(render(&self.draft_form.state));
        self.sync_input_mode();

        if let Some(chained) = chained {
            self.handle_action(&chained, tx);
        }
    }

    /// Issue a request in the background. Any request still in flight is
    /// cancelled; if its response races in anyway, the form discards it.
    fn spawn_feedback_request(&mut self, submission: Submission, tx: mpsc::UnboundedSender<Action>) {
        let superseded = self.in_flight.take();
        if let Some(previous) = &superseded {
            debug!("Cancelling superseded feedback request");
            previous.cancel();
        }

        let issues = validate(&submission.request);
        let status = match issues.first() {
            Some(issue) => format!("{}, sending anyway", issue.message()),
            None if superseded.is_some() => "Previous request replaced. Getting feedback...".to_string(),
            None => "Getting feedback...".to_string(),
        };
        let _ = tx.send(Action::SetStatus(status));

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        let service = self.service.clone();
        let Submission { id, request } = submission;
        info!(request = id.0, domain = %request.domain, "Requesting feedback");

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(request = id.0, "Feedback request cancelled");
                }
                outcome = service.request_feedback(&request) => {
                    let _ = tx.send(Action::FeedbackSettled { id, outcome });
                }
            }
        });
    }

    /// Render the full UI.
    fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(2), // Header
            Constraint::Min(10),   // Form | results
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.render_header(frame, chunks[0]);

        let columns = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        // The error wraps to its full length, up to half the column.
        let error_rows = self
            .feedback_panel
            .error_height(columns[0].width, columns[0].height / 2);

        let left = Layout::vertical([
            Constraint::Min(10),            // Form fields
            Constraint::Length(3),          // Submit button
            Constraint::Length(error_rows), // Error
        ])
        .split(columns[0]);

        self.draft_form.render(frame, left[0]);
        self.feedback_panel.render_submit(frame, left[1]);
        self.feedback_panel.render_error(frame, left[2]);
        self.feedback_panel.render(frame, columns[1]);

        self.status_bar.render(frame, chunks[2]);

        // Overlay (rendered on top)
        self.help.render(frame, area);
    }

    fn render_header(&self, frame: &mut ratatui::Frame, area: Rect) {
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "TriView – Multi-Perspective Feedback Coach",
                Theme::title(),
            )),
            Line::from(Span::styled(
                "Get feedback from three perspectives: Supportive Peer, Critical Editor, and Domain Expert.",
                Theme::dim(),
            )),
        ]);
        frame.render_widget(header, area);
    }
}
