//! Locale-scoped content owned by nodes.
//!
//! Translations are exact-match per locale with a default-locale
//! fallback; meta entries are key/value pairs that apply to one locale or
//! to all of them.

pub mod entity;
pub mod resolver;

pub use entity::{Meta, MetaInput, NewTranslation, NodeContent, Translation};
pub use resolver::{
    apply_meta, apply_translation, current_meta, default_meta, keywords, resolve_meta,
    resolve_or_create_meta, resolve_translation, validate_locale, validate_translation,
};
