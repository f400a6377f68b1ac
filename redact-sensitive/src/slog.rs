//! Adapters for emitting redacted context through `slog`.
//!
//! This module exists to connect [`Redactor`] with `slog` by providing a
//! `slog::Value` implementation that serializes the redacted context as
//! structured JSON via `slog`'s nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation is derived from
//!   [`Redactor::redact`], never from the original context.
//! - Avoiding fallible logging APIs: redaction and serialization failures
//!   are represented as placeholder strings rather than propagated as
//!   errors — and the unredacted context is never the fallback.
//!
//! It does not configure `slog`, own the log record, or touch any of its
//! other fields (message, level, channel, timestamp).

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::redaction::Redactor;
use crate::value::ContextValue;

/// A `slog::Value` that emits an owned redacted context as structured JSON.
///
/// The payload is stored as a `serde_json::Value` and emitted via `slog`'s
/// nested-value support.
pub struct RedactedContext {
    value: JsonValue,
}

impl RedactedContext {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }
}

impl SlogValue for RedactedContext {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

impl Redactor {
    /// Redacts `context` and returns a `slog::Value` that serializes it as
    /// structured JSON.
    ///
    /// This never fails: if redaction or JSON conversion fails, the
    /// returned value stores a placeholder string naming the failure in
    /// place of the context. The original (unredacted) context is never
    /// emitted.
    ///
    /// ## Example
    /// ```ignore
    /// info!(logger, "payment accepted"; "context" => redactor.log_context(context));
    /// ```
    pub fn log_context(&self, context: ContextValue) -> RedactedContext {
        let value = match self.redact(context) {
            Ok(redacted) => serde_json::to_value(&redacted).unwrap_or_else(|_| {
                JsonValue::String("Failed to serialize redacted context".to_owned())
            }),
            Err(err) => JsonValue::String(format!("Failed to redact context: {err}")),
        };
        RedactedContext::new(value)
    }
}
