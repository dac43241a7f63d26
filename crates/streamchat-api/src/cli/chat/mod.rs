//! Interactive CLI chat for streamchat.
//!
//! Streams Gemini replies into the terminal with a typing spinner, markdown
//! re-rendering, slash commands and a persisted history that is restored on
//! start. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
