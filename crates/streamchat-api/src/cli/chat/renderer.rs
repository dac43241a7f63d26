//! Terminal rendering of session events.
//!
//! `ChatRenderer` follows the session's event stream. While a reply streams,
//! only the new suffix of each update is printed raw; when the turn ends, a
//! reply containing markdown is printed again, rendered through `termimad`.
//! A spinner stands in for the typing indicator until the reply starts.

use std::io::{self, Write};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use termimad::MadSkin;

use streamchat_types::chat::{ChatMessage, Sender};
use streamchat_types::error::INIT_ERROR_MESSAGE;
use streamchat_types::event::SessionEvent;

/// Reply currently being streamed.
struct Streaming {
    id: String,
    text: String,
}

/// Event-driven terminal renderer.
pub struct ChatRenderer<W: Write> {
    out: W,
    skin: MadSkin,
    streaming: Option<Streaming>,
    spinner: Option<ProgressBar>,
    show_spinner: bool,
}

impl<W: Write> ChatRenderer<W> {
    /// Create a renderer writing to `out`.
    ///
    /// `show_spinner` enables the `indicatif` typing indicator on stderr.
    pub fn new(out: W, show_spinner: bool) -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);

        Self {
            out,
            skin,
            streaming: None,
            spinner: None,
            show_spinner,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render a complete markdown text for the terminal.
    pub fn render_markdown(&self, markdown: &str) -> String {
        format!("{}", self.skin.term_text(markdown))
    }

    /// Print a stored message in full (history replay, `/history`).
    pub fn print_message(&mut self, message: &ChatMessage) -> io::Result<()> {
        match message.sender {
            Sender::User => {
                writeln!(self.out, "  {} {}", style("You >").green().bold(), message.text)?;
            }
            Sender::Ai if is_error_message(message) => {
                writeln!(self.out, "  {} {}", style("!").red().bold(), style(&message.text).red())?;
            }
            Sender::Ai => {
                writeln!(self.out, "  {}", style("AI").cyan().bold())?;
                let rendered = self.render_markdown(&message.text);
                writeln!(self.out, "{}", rendered.trim_end())?;
            }
        }
        self.out.flush()
    }

    /// Apply one session event to the terminal.
    pub fn handle(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::BusyChanged { busy: true } => self.start_spinner(),
            SessionEvent::BusyChanged { busy: false } => {
                self.stop_spinner();
                self.finish_reply()?;
            }
            SessionEvent::MessageAppended { message } => self.on_appended(message)?,
            SessionEvent::MessageUpdated { id, text } => self.on_updated(id, text)?,
            SessionEvent::MessagesReplaced { messages } => {
                self.streaming = None;
                if messages.is_empty() {
                    writeln!(self.out, "\n  {}\n", style("Conversation cleared.").dim())?;
                } else {
                    for message in messages {
                        self.print_message(message)?;
                    }
                }
            }
            SessionEvent::ErrorChanged { error: Some(error) } if error == INIT_ERROR_MESSAGE => {
                writeln!(self.out, "\n  {} {}\n", style("!").red().bold(), style(error).red().bold())?;
            }
            // Stream errors are shown through the appended error message.
            SessionEvent::ErrorChanged { .. } => {}
        }
        self.out.flush()
    }

    fn on_appended(&mut self, message: &ChatMessage) -> io::Result<()> {
        match message.sender {
            // Already echoed by the input line.
            Sender::User => Ok(()),
            Sender::Ai if is_error_message(message) => {
                self.stop_spinner();
                self.end_streamed_line()?;
                writeln!(
                    self.out,
                    "\n  {} {}\n",
                    style("!").red().bold(),
                    style(&message.text).red()
                )
            }
            Sender::Ai => {
                self.stop_spinner();
                write!(self.out, "\n  {} ", style("AI").cyan().bold())?;
                write!(self.out, "{}", message.text)?;
                self.streaming = Some(Streaming {
                    id: message.id.clone(),
                    text: message.text.clone(),
                });
                Ok(())
            }
        }
    }

    fn on_updated(&mut self, id: &str, text: &str) -> io::Result<()> {
        let Some(streaming) = self.streaming.as_mut().filter(|s| s.id == id) else {
            return Ok(());
        };

        match text.strip_prefix(streaming.text.as_str()) {
            Some(suffix) => write!(self.out, "{suffix}")?,
            // Not an extension of what is on screen: print it again whole.
            None => write!(self.out, "\n  {text}")?,
        }
        streaming.text = text.to_string();
        Ok(())
    }

    /// End the streamed line and re-render the reply if it has markdown.
    fn finish_reply(&mut self) -> io::Result<()> {
        let Some(streaming) = self.streaming.take() else {
            return Ok(());
        };
        writeln!(self.out)?;

        if looks_like_markdown(&streaming.text) {
            let rendered = self.render_markdown(&streaming.text);
            writeln!(self.out, "  {}", style("---").dim())?;
            writeln!(self.out, "{}", rendered.trim_end())?;
        }
        writeln!(self.out)
    }

    fn end_streamed_line(&mut self) -> io::Result<()> {
        if self.streaming.take().is_some() {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn start_spinner(&mut self) {
        if !self.show_spinner || self.spinner.is_some() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// The fixed error message appended when a turn fails.
fn is_error_message(message: &ChatMessage) -> bool {
    message.sender == Sender::Ai && message.id.starts_with("error-")
}

/// Whether re-rendering `text` as markdown would change how it looks.
pub fn looks_like_markdown(text: &str) -> bool {
    const INLINE: [&str; 4] = ["**", "`", "](", "__"];
    if INLINE.iter().any(|m| text.contains(m)) {
        return true;
    }
    text.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with('#')
            || line.starts_with("- ")
            || line.starts_with("* ")
            || line.starts_with("> ")
            || line.starts_with('|')
            || line
                .split_once(". ")
                .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}
