use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use triview_client::{FeedbackClient, FeedbackService};
use triview_core::render::render;
use triview_core::{Domain, FieldUpdate, FormState, TextField, TriviewConfig};

/// triview: multi-perspective feedback on a written draft.
///
/// Sends your draft to the feedback service and shows what a supportive peer,
/// a critical editor and a domain expert make of it, together with a combined
/// action plan and a refined draft.
#[derive(Parser, Debug)]
#[command(name = "triview", version, about)]
struct Cli {
    /// Read the initial draft from a file.
    #[arg(long)]
    draft_file: Option<PathBuf>,

    /// Writing domain, by label ("Business Email") or slug ("business-email").
    #[arg(long)]
    domain: Option<Domain>,

    /// Desired tone.
    #[arg(long)]
    tone: Option<String>,

    /// Desired length.
    #[arg(long)]
    length: Option<String>,

    /// Extra notes for the reviewers.
    #[arg(long)]
    notes: Option<String>,

    /// Base URL of the feedback service (overrides the config file).
    #[arg(long)]
    endpoint: Option<String>,

    /// Submit once without the TUI and print the feedback to stdout.
    #[arg(long)]
    print: bool,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Form updates requested on the command line, in field order.
    fn prefill(&self) -> Result<Vec<FieldUpdate>> {
        let mut updates = Vec::new();
        if let Some(domain) = self.domain {
            updates.push(FieldUpdate::Domain(domain));
        }
        if let Some(ref path) = self.draft_file {
            let draft = std::fs::read_to_string(path)
                .with_context(|| format!("reading draft from {}", path.display()))?;
            updates.push(FieldUpdate::Text(TextField::Draft, draft));
        }
        let texts = [
            (TextField::Tone, &self.tone),
            (TextField::Length, &self.length),
            (TextField::Notes, &self.notes),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                updates.push(FieldUpdate::Text(field, value.clone()));
            }
        }
        Ok(updates)
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Log to a file so the alternate screen stays clean. If the file can't
    // be opened, logs are discarded.
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("triview");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("triview.log"));

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }
}

/// Headless mode: one submission, rendered as plain text to `out`.
async fn print_once(
    service: &dyn FeedbackService,
    updates: Vec<FieldUpdate>,
    out: &mut impl Write,
) -> Result<()> {
    let mut state = FormState::new();
    for update in updates {
        state.update_field(update);
    }

    let submission = state.begin_submit();
    let outcome = service.request_feedback(&submission.request).await;
    state.settle(submission.id, outcome);

    write!(out, "{}", render(&state))?;
    out.flush()?;
    if let Some(error) = state.error() {
        anyhow::bail!("feedback request failed: {}", error);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load config.
    let mut config = TriviewConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        TriviewConfig::default()
    });
    if let Some(ref endpoint) = cli.endpoint {
        config.service.base_url = endpoint.clone();
    }

    tracing::info!("Starting triview v{}", env!("CARGO_PKG_VERSION"));

    let client = FeedbackClient::from_config(&config.service);
    tracing::info!(endpoint = client.endpoint(), "Feedback service configured");
    let service: Arc<dyn FeedbackService> = Arc::new(client);

    let updates = cli.prefill()?;

    if cli.print {
        return print_once(service.as_ref(), updates, &mut std::io::stdout()).await;
    }

    // Start the TUI.
    let mut app = triview_tui::App::new(service);
    for update in updates {
        app.prefill(update);
    }

    app.run().await?;

    tracing::info!("triview exited cleanly");
    Ok(())
}
