//! The masking function applied to matched scalar leaves.
//!
//! Masking is a pure string transformation. It does not traverse structures
//! or decide what is sensitive; the traversal engine hands it a value and a
//! signed visible length, and it computes the replacement string.

use std::borrow::Cow;

/// The default replacement character.
pub const DEFAULT_REPLACEMENT: char = '*';

/// Placeholder the template substitutes the masked segment into.
pub const TEMPLATE_PLACEHOLDER: &str = "{}";

/// How masked output is rendered: replacement character, surrounding
/// template, and an optional cap on the output length.
///
/// The format is independent of *how much* of a value stays visible; that is
/// the per-key `keep` count carried by the specification tree. A single
/// `MaskFormat` is shared by every key a [`crate::Redactor`] masks.
///
/// All operations work on Unicode scalar values, never bytes.
#[derive(Clone, Debug)]
pub struct MaskFormat {
    /// Symbol repeated over the hidden segment.
    replacement: char,
    /// Template the hidden segment is rendered through.
    template: Cow<'static, str>,
    /// Maximum length of the masked output.
    length_limit: Option<usize>,
}

impl MaskFormat {
    /// Constructs the default format: `*` replacement, bare-placeholder
    /// template, no length limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replacement: DEFAULT_REPLACEMENT,
            template: Cow::Borrowed(TEMPLATE_PLACEHOLDER),
            length_limit: None,
        }
    }

    /// Uses a specific replacement character.
    #[must_use]
    pub fn with_replacement(mut self, replacement: char) -> Self {
        self.replacement = replacement;
        self
    }

    /// Renders the hidden segment through `template`.
    ///
    /// The first `{}` in the template is replaced by the masked characters.
    /// A template without a placeholder discards the masked characters and
    /// substitutes its literal text, e.g. `"..."` turns `"foobar123"` with
    /// one visible character into `"f..."`.
    #[must_use]
    pub fn with_template<T>(mut self, template: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.template = template.into();
        self
    }

    /// Caps the masked output at `length_limit` characters.
    ///
    /// Truncation drops mask characters before visible ones: output is kept
    /// from the front when the visible segment is the prefix, from the back
    /// when it is the suffix.
    #[must_use]
    pub fn with_length_limit(mut self, length_limit: usize) -> Self {
        self.length_limit = Some(length_limit);
        self
    }

    /// Masks `value`, keeping `keep` characters visible.
    ///
    /// The sign of `keep` selects the visible side: positive keeps the
    /// leading characters and masks the rest, negative keeps the trailing
    /// characters, zero masks everything. Empty values and values no longer
    /// than `|keep|` are returned unchanged.
    #[must_use]
    pub fn apply_to(&self, value: &str, keep: i64) -> String {
        let chars: Vec<char> = value.chars().collect();
        let total = chars.len();
        if total == 0 {
            return String::new();
        }

        let visible = usize::try_from(keep.unsigned_abs())
            .unwrap_or(usize::MAX)
            .min(total);
        let hidden = total - visible;
        // The whole value fits inside the visible window: nothing to hide.
        if hidden == 0 {
            return value.to_owned();
        }

        let masked: String = std::iter::repeat(self.replacement).take(hidden).collect();
        let rendered = self.template.replacen(TEMPLATE_PLACEHOLDER, &masked, 1);

        // The hidden region is the suffix for non-negative keeps, the prefix
        // for negative ones.
        let offset = if keep >= 0 { visible } else { 0 };
        let mut output = String::with_capacity(total + rendered.len());
        output.extend(&chars[..offset]);
        output.push_str(&rendered);
        output.extend(&chars[offset + hidden..]);

        match self.length_limit {
            Some(limit) => Self::truncate(output, limit, keep >= 0),
            None => output,
        }
    }

    fn truncate(output: String, limit: usize, keep_front: bool) -> String {
        let chars: Vec<char> = output.chars().collect();
        if chars.len() <= limit {
            return output;
        }
        if keep_front {
            chars[..limit].iter().collect()
        } else {
            chars[chars.len() - limit..].iter().collect()
        }
    }
}

impl Default for MaskFormat {
    fn default() -> Self {
        Self::new()
    }
}
