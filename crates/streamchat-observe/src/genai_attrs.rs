//! OpenTelemetry GenAI Semantic Convention attributes for chat turns.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat gemini-2.5-flash"`),
//! applied through the `otel.name` field that `tracing-opentelemetry` reads.
//! The constants are usable with [`tracing::Span::record`] on spans created by
//! [`chat_span`].

use tracing::field::Empty;

// --- Required attributes ---

/// The name of the operation being performed.
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "gemini").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

/// The model ID requested (e.g., "gemini-2.5-flash").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// Identifier of the reply message the turn produced.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

/// Span status read by `tracing-opentelemetry` ("OK" or "ERROR").
pub const OTEL_STATUS_CODE: &str = "otel.status_code";

// --- Operation name values ---

/// Standard chat operation.
pub const OP_CHAT: &str = "chat";

// --- Provider name values ---

/// Google Gemini provider identifier.
pub const PROVIDER_GEMINI: &str = "gemini";

/// Span name following the `"{operation} {model}"` convention.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}

/// Span around one chat turn.
///
/// [`GEN_AI_RESPONSE_ID`] and [`OTEL_STATUS_CODE`] start empty and are recorded
/// once the outcome is known.
pub fn chat_span(provider: &str, model: &str) -> tracing::Span {
    tracing::info_span!(
        "chat",
        otel.name = %span_name(OP_CHAT, model),
        gen_ai.operation.name = OP_CHAT,
        gen_ai.provider.name = %provider,
        gen_ai.request.model = %model,
        gen_ai.response.id = Empty,
        otel.status_code = Empty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_name() {
        assert_eq!(span_name(OP_CHAT, "gemini-2.5-flash"), "chat gemini-2.5-flash");
    }

    #[test]
    fn test_chat_span_declares_recordable_fields() {
        let subscriber = tracing_subscriber::registry();
        tracing::subscriber::with_default(subscriber, || {
            let span = chat_span(PROVIDER_GEMINI, "gemini-2.5-flash");
            let metadata = span.metadata().expect("span should be enabled under the registry");
            let fields = metadata.fields();
            for name in [
                GEN_AI_OPERATION_NAME,
                GEN_AI_PROVIDER_NAME,
                GEN_AI_REQUEST_MODEL,
                GEN_AI_RESPONSE_ID,
                OTEL_STATUS_CODE,
            ] {
                assert!(fields.field(name).is_some(), "missing field {name}");
            }
        });
    }
}
