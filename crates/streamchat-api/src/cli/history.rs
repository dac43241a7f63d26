//! `streamchat history` and `streamchat clear`.

use chrono::Local;
use console::style;

use streamchat_core::chat::persistence::CHAT_HISTORY_KEY;
use streamchat_types::chat::{ChatMessage, Sender};

use crate::state::AppState;

/// Print the stored conversation.
pub async fn show_history(state: &AppState, json: bool) -> anyhow::Result<()> {
    let messages = state.history_store().load().await.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {}", style("No stored conversation.").dim());
        println!();
        return Ok(());
    }

    println!();
    for message in &messages {
        println!("  {} {}", role_label(message), preview(&message.text, 100));
    }
    println!();
    let saved = match state.kv_store.updated_at(CHAT_HISTORY_KEY).await {
        Ok(Some(at)) => format!(", saved {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
        _ => String::new(),
    };
    println!(
        "  {}",
        style(format!("{} messages{saved}", messages.len())).dim()
    );
    println!();
    Ok(())
}

/// Delete the stored conversation.
pub async fn clear_history(state: &AppState) -> anyhow::Result<()> {
    state.history_store().clear().await?;
    println!();
    println!("  {} Stored conversation deleted.", style("*").cyan().bold());
    println!();
    Ok(())
}

/// Styled "You"/"AI" label for a message.
pub fn role_label(message: &ChatMessage) -> String {
    match message.sender {
        Sender::User => format!("{}", style("You").green().bold()),
        Sender::Ai => format!("{}", style("AI ").cyan().bold()),
    }
}

/// First line of `text`, cut to `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(max_chars).collect();
    if first_line.chars().count() > max_chars || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}
