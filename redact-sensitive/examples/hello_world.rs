//! Mask an API key before its context line is emitted.
//!
//! Run with: `cargo run --example hello_world --features serde`

use redact_sensitive::{Redactor, SensitiveKeys};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let redactor = Redactor::new(SensitiveKeys::new().keep("api_key", 4));

    let context = json!({"api_key": "mysupersecretapikey"});
    let redacted = redactor.redact(context.into())?;

    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
