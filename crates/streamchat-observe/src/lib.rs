//! Observability for streamchat: subscriber setup and GenAI span attributes.

pub mod genai_attrs;
pub mod tracing_setup;
