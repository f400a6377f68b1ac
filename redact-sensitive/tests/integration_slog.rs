//! Integration tests for the slog module.
//!
//! These tests verify that:
//! - `log_context()` produces correctly redacted JSON values
//! - The `slog::Value` implementation works with slog's serialization API
//! - The raw context never reaches the serializer, redacted or not

#![cfg(feature = "slog")]

use std::{cell::RefCell, collections::HashMap, fmt::Arguments};

use redact_sensitive::{ContextValue, Opaque, Redactor, SensitiveKeys};
use serde_json::{json, Value as JsonValue};
use slog::KV;

// A test serializer that captures serialized key-value pairs
struct CapturingSerializer {
    captured: RefCell<HashMap<String, JsonValue>>,
}

impl CapturingSerializer {
    fn new() -> Self {
        Self {
            captured: RefCell::new(HashMap::new()),
        }
    }

    fn get(&self, key: &str) -> Option<JsonValue> {
        self.captured.borrow().get(key).cloned()
    }
}

impl slog::Serializer for CapturingSerializer {
    fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), JsonValue::String(val.to_string()));
        Ok(())
    }

    fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
        let json = serde_json::to_value(val.as_serde()).unwrap_or(JsonValue::Null);
        self.captured.borrow_mut().insert(key.into(), json);
        Ok(())
    }
}

/// Helper function to serialize a slog::Value into any Serializer.
fn serialize_to_capture<V: slog::Value, S: slog::Serializer>(
    value: &V,
    key: &'static str,
    serializer: &mut S,
) {
    static RS: slog::RecordStatic<'static> = slog::record_static!(slog::Level::Info, "");
    let args = format_args!("");
    let record = slog::Record::new(&RS, &args, slog::b!());
    value.serialize(&record, key, serializer).unwrap();
}

fn context<const N: usize>(entries: [(&str, ContextValue); N]) -> ContextValue {
    entries.into_iter().collect()
}

#[test]
fn test_log_context_emits_redacted_json() {
    let redactor = Redactor::new(SensitiveKeys::new().keep("api_key", 4));
    let context = context([
        ("api_key", "mysupersecretapikey".into()),
        ("user", "alice".into()),
    ]);

    let value = redactor.log_context(context);

    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(&value, "context", &mut serializer);

    let json = serializer.get("context").expect("context was emitted");
    assert_eq!(
        json,
        json!({"api_key": "mysu***************", "user": "alice"})
    );
}

#[test]
fn test_log_context_keeps_structure_of_nested_payloads() {
    let redactor = Redactor::new(SensitiveKeys::new().keep("password", 0));
    let context = context([(
        "auth",
        context([("password", "hunter2".into()), ("user", "alice".into())]),
    )]);

    let value = redactor.log_context(context);

    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(&value, "context", &mut serializer);

    let json = serializer.get("context").expect("context was emitted");
    assert_eq!(
        json,
        json!({"auth": {"password": "*******", "user": "alice"}})
    );
}

#[test]
fn test_log_context_failure_emits_placeholder_not_payload() {
    let redactor = Redactor::new(SensitiveKeys::new().keep("password", 0));
    let context = context([
        ("password", "hunter2".into()),
        ("handle", Opaque::new(7_u32).into()),
    ]);

    let value = redactor.log_context(context);

    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(&value, "context", &mut serializer);

    let json = serializer.get("context").expect("placeholder was emitted");
    let message = json.as_str().expect("placeholder is a string");
    assert!(message.contains("Failed to redact context"));
    assert!(!message.contains("hunter2"));
}

#[test]
fn test_raw_context_never_reaches_the_serializer() {
    use std::sync::atomic::{AtomicBool, Ordering};

    static SAW_SECRET: AtomicBool = AtomicBool::new(false);

    struct SecretDetector;

    impl slog::Serializer for SecretDetector {
        fn emit_arguments(&mut self, _key: slog::Key, val: &Arguments<'_>) -> slog::Result {
            if val.to_string().contains("the_actual_secret") {
                SAW_SECRET.store(true, Ordering::SeqCst);
            }
            Ok(())
        }

        fn emit_serde(&mut self, _key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
            let json = serde_json::to_string(val.as_serde()).unwrap_or_default();
            if json.contains("the_actual_secret") {
                SAW_SECRET.store(true, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    let redactor = Redactor::new(SensitiveKeys::new().keep("secret", 0));
    let value = redactor.log_context(context([("secret", "the_actual_secret".into())]));

    let mut detector = SecretDetector;
    serialize_to_capture(&value, "context", &mut detector);

    assert!(
        !SAW_SECRET.load(Ordering::SeqCst),
        "Secret value leaked to slog serializer!"
    );
}

#[test]
fn test_log_context_through_a_logger() {
    use slog::{info, o, Drain, Logger};

    let serializer_output = std::sync::Arc::new(std::sync::Mutex::new(Vec::<String>::new()));

    struct VecDrain {
        output: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Drain for VecDrain {
        type Ok = ();
        type Err = slog::Never;

        fn log(
            &self,
            record: &slog::Record<'_>,
            values: &slog::OwnedKVList,
        ) -> Result<Self::Ok, Self::Err> {
            let mut serializer = LineSerializer(format!("{}", record.msg()));
            record.kv().serialize(record, &mut serializer).ok();
            values.serialize(record, &mut serializer).ok();
            self.output.lock().expect("drain lock").push(serializer.0);
            Ok(())
        }
    }

    struct LineSerializer(String);

    impl slog::Serializer for LineSerializer {
        fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
            self.0.push_str(&format!(" {key}={val}"));
            Ok(())
        }

        fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
            let json = serde_json::to_string(val.as_serde()).unwrap_or_default();
            self.0.push_str(&format!(" {key}={json}"));
            Ok(())
        }
    }

    let redactor = Redactor::new(SensitiveKeys::new().keep("test_key", 4));
    let logger = Logger::root(
        VecDrain {
            output: std::sync::Arc::clone(&serializer_output),
        },
        o!(),
    );

    info!(logger, "Testing";
        "context" => redactor.log_context(context([("test_key", "test_value".into())])));

    let lines = serializer_output.lock().expect("output lock");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Testing"));
    assert!(lines[0].contains("test******"));
    assert!(!lines[0].contains("test_value"));
}
