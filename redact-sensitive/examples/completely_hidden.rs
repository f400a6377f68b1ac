//! A keep length of zero masks the whole value.
//!
//! Run with: `cargo run --example completely_hidden --features serde`

use redact_sensitive::{Redactor, SensitiveKeys};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let redactor = Redactor::new(SensitiveKeys::new().keep("you_know_nothing", 0));

    let context = json!({"you_know_nothing": "John Snow"});
    let redacted = redactor.redact(context.into())?;

    // {"you_know_nothing": "*********"}
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
