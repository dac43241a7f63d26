//! Welcome and error banners for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the model and how many messages were restored from the stored
/// conversation, with a hint about slash commands.
pub fn print_welcome_banner(model: &str, provider: &str, restored: usize) {
    println!();
    println!("  {} {}", style("*").cyan().bold(), style("Gemini AI Chat").cyan().bold());
    println!("  {}", style("Streaming replies, saved between runs").dim());
    println!();
    println!(
        "  {}  {} {}",
        style("Model:").bold(),
        style(model).dim(),
        style(format!("({provider})")).dim()
    );
    if restored > 0 {
        println!(
            "  {}  {}",
            style("History:").bold(),
            style(format!("{restored} messages restored")).dim()
        );
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

/// Print the persistent initialization error in red.
pub fn print_init_error(message: &str, detail: &str) {
    println!();
    println!("  {} {}", style("!").red().bold(), style(message).red().bold());
    println!("  {}", style(detail).dim());
    println!();
}
