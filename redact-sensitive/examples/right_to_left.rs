//! Negative keep lengths anchor the visible characters at the end of the
//! value, the usual shape for card numbers.
//!
//! Run with: `cargo run --example right_to_left --features serde`

use redact_sensitive::{Redactor, SensitiveKeys};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let redactor = Redactor::new(SensitiveKeys::new().keep("credit_card", -4));

    let context = json!({"credit_card": "4111111145551142"});
    let redacted = redactor.redact(context.into())?;

    // {"credit_card": "************1142"}
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
