//! Key-directed redaction for structured log context payloads.
//!
//! This crate separates:
//! - **Specification**: which keys are sensitive, and how much stays visible.
//! - **Masking**: how a matched value is rewritten.
//!
//! A [`Redactor`] walks an arbitrary context tree and masks the scalar
//! values found under sensitive keys before the tree reaches any output
//! sink.
//!
//! Key rules:
//! - A positive keep length leaves a visible prefix, a negative one a
//!   visible suffix, zero masks the whole value.
//! - A key listed at one level with a nested [`SensitiveKeys`] narrows the
//!   search below it.
//! - A key *not* matched at the current level is still searched at depth:
//!   containers under unmatched keys are walked with the same specification
//!   (wildcard fallback), so `"password"` is caught wherever it nests.
//! - Null values are never masked and never descended into.
//!
//! What this crate does:
//! - defines the [`ContextValue`] tree and the [`SensitiveKeys`] specification
//! - masks matched scalars through a configurable [`MaskFormat`]
//! - provides integrations behind feature flags (e.g. `slog`, `serde`)
//!
//! What it does not do:
//! - perform I/O or logging (it sits *inside* logging pipelines)
//! - encrypt or hash anything — masking is display-time hygiene, not a
//!   security control for data at rest
//! - scan free-text messages; only structured keys are inspected

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
#[cfg(feature = "serde")]
mod config;
mod redaction;
#[cfg(feature = "slog")]
pub mod slog;
mod value;

// Re-exports
#[cfg(feature = "serde")]
pub use config::RedactorConfig;
pub use redaction::{
    Directive, MaskFormat, RedactError, Redactor, SensitiveKeys, SpecKey, DEFAULT_REPLACEMENT,
    TEMPLATE_PLACEHOLDER,
};
pub use value::{ContextValue, Opaque, Record, Scalar};
