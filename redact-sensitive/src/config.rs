//! Declarative settings for building a [`Redactor`].
//!
//! Everything [`RedactorConfig`] holds can also be set through the builder
//! methods on [`Redactor`] and [`crate::MaskFormat`]; this type exists so the
//! whole surface can come out of a deserialized settings file in one piece.

use serde::Deserialize;

use crate::redaction::{
    MaskFormat, RedactError, Redactor, SensitiveKeys, DEFAULT_REPLACEMENT, TEMPLATE_PLACEHOLDER,
};

/// Deserializable construction surface for a [`Redactor`].
///
/// Field defaults match the builder defaults: `*` replacement, a
/// bare-placeholder template, no length limit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RedactorConfig {
    /// Keys that should trigger redaction.
    pub sensitive_keys: SensitiveKeys,
    /// The replacement character.
    pub replacement: char,
    /// Template the masked segment is rendered through.
    pub template: String,
    /// Maximum length of masked output.
    ///
    /// Carried as a signed integer so a negative value arriving from a
    /// settings file is rejected with [`RedactError::InvalidSpec`] instead
    /// of wrapping around.
    pub length_limit: Option<i64>,
}

impl Default for RedactorConfig {
    fn default() -> Self {
        Self {
            sensitive_keys: SensitiveKeys::new(),
            replacement: DEFAULT_REPLACEMENT,
            template: TEMPLATE_PLACEHOLDER.to_owned(),
            length_limit: None,
        }
    }
}

impl Redactor {
    /// Builds a redactor from deserialized settings.
    ///
    /// # Errors
    ///
    /// [`RedactError::InvalidSpec`] if `length_limit` is negative.
    pub fn from_config(config: RedactorConfig) -> Result<Self, RedactError> {
        let length_limit = config
            .length_limit
            .map(|limit| {
                usize::try_from(limit).map_err(|_| RedactError::InvalidSpec {
                    reason: format!("length limit must not be negative (got {limit})"),
                })
            })
            .transpose()?;

        let mut format = MaskFormat::new()
            .with_replacement(config.replacement)
            .with_template(config.template);
        if let Some(limit) = length_limit {
            format = format.with_length_limit(limit);
        }
        Ok(Redactor::new(config.sensitive_keys).with_format(format))
    }
}
