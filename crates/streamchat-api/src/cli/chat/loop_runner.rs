//! Main chat loop orchestration.
//!
//! Restores the stored conversation, prints the banner and replays the
//! history, then reads input while replies stream. Every message is sent on
//! its own task so the prompt stays responsive; the session turns a second
//! send during a stream into a no-op. All terminal output for the session
//! comes from the renderer task following the session's events.

use std::io::Write;
use std::sync::Arc;

use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinSet;
use tracing::{Instrument, Span, info, warn};

use streamchat_core::chat::session::{SkipReason, TurnOutcome};
use streamchat_observe::genai_attrs::{GEN_AI_RESPONSE_ID, OTEL_STATUS_CODE, chat_span};
use streamchat_types::event::SessionEvent;

use crate::cli::history::{preview, role_label};
use crate::state::{AppState, ConcreteChatSession};

use super::banner::{print_init_error, print_welcome_banner};
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let session = state.chat_session()?;

    let restored = session.restore().await;
    let view = session.view().await;

    print_welcome_banner(
        &session.config().model,
        session.provider_name(),
        view.messages.len(),
    );
    let mut replay = ChatRenderer::new(std::io::stdout(), false);
    for message in &view.messages {
        replay.print_message(message)?;
    }
    if let Err(e) = &restored {
        print_init_error(e.user_message(), &e.to_string());
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let renderer = ChatRenderer::new(writer.clone(), true);
    let render_task = tokio::spawn(render_events(session.subscribe(), renderer));

    let mut turns = JoinSet::new();
    loop {
        while let Some(result) = turns.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "chat turn task failed");
            }
        }

        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                notice(&writer, &format!("{}", style("Press Ctrl+D to exit, or keep chatting.").dim()));
                continue;
            }
            InputEvent::Message(text) if text.trim().is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Exit => break,
                ChatCommand::Clear => clear(&session, &writer).await,
                ChatCommand::History => print_history(&session, &writer).await,
                ChatCommand::Unknown(name) => notice(
                    &writer,
                    &format!(
                        "{} Unknown command: {}. Type /help for available commands.",
                        style("?").yellow().bold(),
                        style(name).dim()
                    ),
                ),
            }
            continue;
        }

        let span = chat_span(session.provider_name(), &session.config().model);
        turns.spawn(run_turn(Arc::clone(&session), text, span, writer.clone()));
    }

    if !turns.is_empty() {
        info!(pending = turns.len(), "waiting for streaming reply to finish");
    }
    while let Some(result) = turns.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "chat turn task failed");
        }
    }

    // The last session reference closes the event channel and ends the renderer.
    drop(session);
    if let Err(e) = render_task.await {
        warn!(error = %e, "renderer task failed");
    }

    chat_input.flush();
    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

/// Send one message inside its `chat` span and record how it ended.
async fn run_turn(session: Arc<ConcreteChatSession>, text: String, span: Span, writer: SharedWriter) {
    let outcome = session.send_message(&text).instrument(span.clone()).await;

    match &outcome {
        TurnOutcome::Completed { message_id } => {
            span.record(GEN_AI_RESPONSE_ID, message_id.as_str());
            span.record(OTEL_STATUS_CODE, "OK");
        }
        TurnOutcome::Failed { error } => {
            span.record(OTEL_STATUS_CODE, "ERROR");
            warn!(parent: &span, error = %error, "chat turn failed");
        }
        TurnOutcome::Skipped(SkipReason::Busy) => notice(
            &writer,
            &format!(
                "{} Still replying; wait for the current answer to finish.",
                style("!").yellow().bold()
            ),
        ),
        TurnOutcome::Skipped(SkipReason::NoHandle) => notice(
            &writer,
            &format!(
                "{} Chat is not available. Check your API key and restart.",
                style("!").red().bold()
            ),
        ),
        TurnOutcome::Skipped(SkipReason::EmptyText) => {}
    }
}

/// Follow session events until the channel closes.
pub async fn render_events<W: Write>(
    mut rx: broadcast::Receiver<SessionEvent>,
    mut renderer: ChatRenderer<W>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Err(e) = renderer.handle(&event) {
                    warn!(error = %e, "failed to render chat event");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer lagged behind session events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn clear(session: &ConcreteChatSession, writer: &SharedWriter) {
    match session.clear().await {
        Ok(true) => {}
        Ok(false) => notice(
            writer,
            &format!(
                "{} Cannot clear while a reply is streaming.",
                style("!").yellow().bold()
            ),
        ),
        Err(e) => notice(writer, &format!("  {}", style(e).dim())),
    }
}

async fn print_history(session: &ConcreteChatSession, writer: &SharedWriter) {
    let view = session.view().await;
    if view.messages.is_empty() {
        notice(writer, &format!("{}", style("No messages yet.").dim()));
        return;
    }

    let mut out = writer.clone();
    let _ = writeln!(out);
    for message in &view.messages {
        let _ = writeln!(out, "  {} {}", role_label(message), preview(&message.text, 100));
    }
    let _ = writeln!(out);
}

/// Print one line above the prompt.
fn notice(writer: &SharedWriter, line: &str) {
    let mut out = writer.clone();
    let _ = writeln!(out, "\n  {line}\n");
}
