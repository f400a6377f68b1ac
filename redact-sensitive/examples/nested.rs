//! Nested specifications: narrow the search level by level, mixing maps
//! and fixed-field records.
//!
//! Run with: `cargo run --example nested --features serde`

use redact_sensitive::{ContextValue, Record, Redactor, SensitiveKeys};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let keys = SensitiveKeys::new().nested(
        "nested",
        SensitiveKeys::new().nested(
            "arr",
            SensitiveKeys::new()
                .keep("value", 3)
                .nested("or_obj", SensitiveKeys::new().keep("secret", -3)),
        ),
    );
    let redactor = Redactor::new(keys);

    let or_obj = Record::new([("secret", "donttellanyone")]);
    let arr: ContextValue = [
        ("value", ContextValue::from("abcdfg")),
        ("or_obj", or_obj.into()),
    ]
    .into_iter()
    .collect();
    let context: ContextValue = [("nested", ContextValue::from_iter([("arr", arr)]))]
        .into_iter()
        .collect();

    let redacted = redactor.redact(context)?;

    // {"nested":{"arr":{"or_obj":{"secret":"***********one"},"value":"abc***"}}}
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
