// Locale-scoped attribute resolution
//
// Pure functions over a loaded `NodeContent`. The locale is always an
// argument; read paths never mutate, and the create-on-write paths are
// separate functions.

use super::entity::{Meta, MetaInput, NewTranslation, NodeContent, Translation};
use crate::domain::{DomainError, DomainResult};

/// Exact match on `locale`; with `with_default`, falls back to the node's default locale.
pub fn resolve_translation<'a>(
    content: &'a NodeContent,
    locale: &str,
    with_default: bool,
) -> Option<&'a Translation> {
    find_translation(content, locale).or_else(|| {
        if !with_default {
            return None;
        }
        content
            .node
            .default_locale
            .as_deref()
            .and_then(|default| find_translation(content, default))
    })
}

fn find_translation<'a>(content: &'a NodeContent, locale: &str) -> Option<&'a Translation> {
    content.translations.iter().find(|t| t.locale == locale)
}

/// Keywords of the translation resolved with default fallback, empty when none
pub fn keywords<'a>(content: &'a NodeContent, locale: &str) -> &'a [String] {
    resolve_translation(content, locale, true)
        .map(|t| t.keywords.as_slice())
        .unwrap_or(&[])
}

/// First meta entry for exactly `locale`, else the node's default meta.
pub fn resolve_meta<'a>(content: &'a NodeContent, locale: &str) -> Option<&'a Meta> {
    content
        .meta
        .iter()
        .find(|m| m.locale.as_deref() == Some(locale))
        .or_else(|| default_meta(content))
}

/// The entry designated as the node's default meta, if it still exists
pub fn default_meta(content: &NodeContent) -> Option<&Meta> {
    let id = content.node.default_meta_id?;
    content.meta.iter().find(|m| m.id == id)
}

/// First meta entry for exactly `locale`, created (empty key and value) when missing.
pub fn resolve_or_create_meta<'a>(content: &'a mut NodeContent, locale: &str) -> &'a mut Meta {
    let position = content
        .meta
        .iter()
        .position(|m| m.locale.as_deref() == Some(locale));

    let index = match position {
        Some(index) => index,
        None => {
            let node_id = content.node.id;
            content.meta.push(Meta::new(
                node_id,
                Some(locale.to_string()),
                String::new(),
                String::new(),
            ));
            content.meta.len() - 1
        }
    };
    &mut content.meta[index]
}

/// Entries without a locale or with exactly `locale`, in stored order
pub fn current_meta<'a>(content: &'a NodeContent, locale: &str) -> Vec<&'a Meta> {
    content.meta.iter().filter(|m| m.applies_to(locale)).collect()
}

/// Create or update the translation for `new.locale`.
///
/// The first translation written to a node without a default locale
/// makes its locale the default.
pub fn apply_translation<'a>(
    content: &'a mut NodeContent,
    new: NewTranslation,
) -> DomainResult<&'a Translation> {
    validate_translation(&new)?;

    if content.node.default_locale.is_none() {
        content.node.default_locale = Some(new.locale.clone());
    }

    let index = match content.translations.iter().position(|t| t.locale == new.locale) {
        Some(index) => {
            let existing = &mut content.translations[index];
            existing.title = new.title;
            existing.description = new.description;
            existing.keywords = new.keywords;
            index
        }
        None => {
            content.translations.push(Translation {
                node_id: content.node.id,
                locale: new.locale,
                title: new.title,
                description: new.description,
                keywords: new.keywords,
            });
            content.translations.len() - 1
        }
    };
    Ok(&content.translations[index])
}

/// Upsert meta entries. An entry with an id updates the node's own entry of that id;
/// ids the node does not own are `NotFound`. Returns the touched ids in input order.
pub fn apply_meta(content: &mut NodeContent, entries: Vec<MetaInput>) -> DomainResult<Vec<uuid::Uuid>> {
    let mut touched = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.key.trim().is_empty() {
            return Err(DomainError::Validation(
                "Meta key cannot be empty".to_string(),
            ));
        }
        if let Some(locale) = &entry.locale {
            validate_locale(locale)?;
        }

        match entry.id {
            Some(id) => {
                let node_id = content.node.id;
                let meta = content.meta.iter_mut().find(|m| m.id == id).ok_or_else(|| {
                    DomainError::NotFound(format!("Meta {} of node {}", id, node_id))
                })?;
                meta.locale = entry.locale;
                meta.key = entry.key;
                meta.value = entry.value;
                touched.push(meta.id);
            }
            None => {
                let meta = Meta::new(content.node.id, entry.locale, entry.key, entry.value);
                touched.push(meta.id);
                content.meta.push(meta);
            }
        }
    }
    Ok(touched)
}

pub fn validate_translation(new: &NewTranslation) -> DomainResult<()> {
    validate_locale(&new.locale)?;
    if new.title.trim().is_empty() {
        return Err(DomainError::Validation(format!(
            "Translation title for locale '{}' cannot be empty",
            new.locale
        )));
    }
    Ok(())
}

/// Locale codes are short, non-empty tokens such as `en`, `de`, `de_at`, `pt-BR`
pub fn validate_locale(locale: &str) -> DomainResult<()> {
    let valid = !locale.is_empty()
        && locale.len() <= 16
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(DomainError::Validation(format!(
            "Invalid locale code '{}'",
            locale
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{Node, NodeKind};

    fn content() -> NodeContent {
        let mut node = Node::new(NodeKind::Category, None);
        node.lft = 1;
        node.rgt = 2;
        NodeContent::new(node)
    }

    #[test]
    fn test_first_translation_sets_default_locale() {
        let mut c = content();
        apply_translation(&mut c, NewTranslation::new("de", "Titel").with_description("Beschreibung")).unwrap();
        assert_eq!(c.node.default_locale.as_deref(), Some("de"));

        apply_translation(&mut c, NewTranslation::new("en", "Title").with_description("Description")).unwrap();
        assert_eq!(c.node.default_locale.as_deref(), Some("de"));

        let fallback = resolve_translation(&c, "fr", true).unwrap();
        assert_eq!(fallback.title, "Titel");
        assert_eq!(fallback.description.as_deref(), Some("Beschreibung"));
        assert!(resolve_translation(&c, "fr", false).is_none());
    }

    #[test]
    fn test_update_in_place() {
        let mut c = content();
        apply_translation(&mut c, NewTranslation::new("en", "Old")).unwrap();
        apply_translation(&mut c, NewTranslation::new("en", "New").with_keywords(["a", "b"])).unwrap();

        assert_eq!(c.translations.len(), 1);
        assert_eq!(c.translations[0].title, "New");
        assert_eq!(keywords(&c, "en").to_vec(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_no_translations_resolves_to_none() {
        let c = content();
        assert!(resolve_translation(&c, "en", true).is_none());
        assert!(keywords(&c, "en").is_empty());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut c = content();
        assert!(apply_translation(&mut c, NewTranslation::new("en", "  ")).is_err());
        assert!(apply_translation(&mut c, NewTranslation::new("e n", "Title")).is_err());
        assert!(c.node.default_locale.is_none());
    }

    #[test]
    fn test_resolve_meta_falls_back_to_default_meta() {
        let mut c = content();
        let ids = apply_meta(
            &mut c,
            vec![
                MetaInput { id: None, locale: None, key: "color".into(), value: "red".into() },
                MetaInput { id: None, locale: Some("en".into()), key: "alt".into(), value: "Sky".into() },
            ],
        )
        .unwrap();

        assert_eq!(resolve_meta(&c, "en").unwrap().value, "Sky");
        assert!(resolve_meta(&c, "de").is_none());

        c.node.default_meta_id = Some(ids[0]);
        assert_eq!(resolve_meta(&c, "de").unwrap().key, "color");
    }

    #[test]
    fn test_resolve_meta_is_idempotent_and_pure() {
        let mut c = content();
        apply_meta(
            &mut c,
            vec![MetaInput { id: None, locale: Some("en".into()), key: "k".into(), value: "v".into() }],
        )
        .unwrap();
        let before = c.clone();

        let first = resolve_meta(&c, "de").cloned();
        let second = resolve_meta(&c, "de").cloned();
        assert_eq!(first, second);
        assert_eq!(c, before);
    }

    #[test]
    fn test_resolve_or_create_meta() {
        let mut c = content();
        let created_id = resolve_or_create_meta(&mut c, "fr").id;
        assert_eq!(c.meta.len(), 1);
        assert_eq!(c.meta[0].locale.as_deref(), Some("fr"));

        let again = resolve_or_create_meta(&mut c, "fr").id;
        assert_eq!(created_id, again);
        assert_eq!(c.meta.len(), 1);
    }

    #[test]
    fn test_current_meta_includes_unlocalized() {
        let mut c = content();
        apply_meta(
            &mut c,
            vec![
                MetaInput { id: None, locale: None, key: "a".into(), value: "1".into() },
                MetaInput { id: None, locale: Some("de".into()), key: "b".into(), value: "2".into() },
                MetaInput { id: None, locale: Some("en".into()), key: "c".into(), value: "3".into() },
            ],
        )
        .unwrap();

        let keys: Vec<&str> = current_meta(&c, "en").iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_apply_meta_updates_by_id() {
        let mut c = content();
        let ids = apply_meta(
            &mut c,
            vec![MetaInput { id: None, locale: None, key: "k".into(), value: "1".into() }],
        )
        .unwrap();

        apply_meta(
            &mut c,
            vec![MetaInput { id: Some(ids[0]), locale: Some("en".into()), key: "k".into(), value: "2".into() }],
        )
        .unwrap();

        assert_eq!(c.meta.len(), 1);
        assert_eq!(c.meta[0].value, "2");
        assert_eq!(c.meta[0].locale.as_deref(), Some("en"));
    }

    #[test]
    fn test_apply_meta_rejects_foreign_id() {
        let mut c = content();
        let foreign = uuid::Uuid::new_v4();

        let result = apply_meta(
            &mut c,
            vec![MetaInput { id: Some(foreign), locale: None, key: "k".into(), value: "v".into() }],
        );

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(c.meta.is_empty());
    }

    #[test]
    fn test_input_errors_are_validation() {
        let mut c = content();
        assert!(matches!(
            apply_translation(&mut c, NewTranslation::new("en", "  ")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(validate_locale("e n"), Err(DomainError::Validation(_))));
    }
}
