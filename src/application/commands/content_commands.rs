// src/application/commands/content_commands.rs
//
// Content Command Handlers
//
// RULES:
// - Accept DTOs
// - Call services
// - Return DTOs
// - Never contain business logic

use crate::application::dto::*;
use crate::application::error_handling::CommandResult;
use crate::application::state::AppState;
use crate::domain::{MetaInput, NewTranslation};
use crate::services::SetContentRequest;

use super::{parse_id, parse_optional_id};

/// Create or replace the translation for one locale
pub fn set_content(state: &AppState, dto: SetContentDto) -> CommandResult<TranslationDto> {
    let mut translation = NewTranslation::new(dto.locale, dto.title).with_keywords(dto.keywords);
    translation.description = dto.description;

    let request = SetContentRequest {
        node_id: parse_id(&dto.node_id, "node")?,
        translation,
        actor: None,
    };
    let written = state.tree_service.set_content(request)?;
    Ok(TranslationDto::from(written))
}

/// Upsert one meta entry; returns the node's meta in stored order
pub fn set_meta(state: &AppState, dto: SetMetaDto) -> CommandResult<Vec<MetaDto>> {
    let node_id = parse_id(&dto.node_id, "node")?;
    let input = MetaInput {
        id: parse_optional_id(dto.id.as_deref(), "meta")?,
        locale: dto.locale,
        key: dto.key,
        value: dto.value,
    };

    let meta = state.tree_service.set_meta(node_id, vec![input.clone()], None)?;
    if dto.make_default {
        let target = meta
            .iter()
            .rev()
            .find(|m| input.id.map_or(m.key == input.key && m.locale == input.locale, |id| m.id == id))
            .map(|m| m.id);
        state.tree_service.set_default_meta(node_id, target, None)?;
    }
    Ok(meta.into_iter().map(MetaDto::from).collect())
}

pub fn remove_meta(state: &AppState, node_id: &str, meta_id: &str) -> CommandResult<()> {
    let node_id = parse_id(node_id, "node")?;
    let meta_id = parse_id(meta_id, "meta")?;
    state.tree_service.remove_meta(node_id, meta_id, None)?;
    Ok(())
}

/// Translation for `locale`, falling back to the node's default locale
pub fn get_translation(
    state: &AppState,
    node_id: &str,
    locale: &str,
) -> CommandResult<Option<TranslationDto>> {
    let id = parse_id(node_id, "node")?;
    let translation = state.tree_service.resolve_translation(id, locale, true)?;
    Ok(translation.map(TranslationDto::from))
}

/// Full per-locale view of a node
pub fn get_view(state: &AppState, node_id: &str, locale: &str) -> CommandResult<NodeViewDto> {
    let id = parse_id(node_id, "node")?;
    let view = state.aggregate_service.view(id, locale)?;
    Ok(NodeViewDto::from(view))
}

pub fn get_breadcrumb(
    state: &AppState,
    node_id: &str,
    locale: &str,
) -> CommandResult<Vec<BreadcrumbDto>> {
    let id = parse_id(node_id, "node")?;
    let crumbs = state.aggregate_service.build_breadcrumb(id, locale)?;
    Ok(crumbs.into_iter().map(BreadcrumbDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::create_node;
    use crate::config::StoreConfig;

    #[test]
    fn test_meta_default_designation() {
        let dir = tempfile::tempdir().unwrap();
        let state =
            AppState::initialize(&StoreConfig::with_database(dir.path().join("canopy.db"))).unwrap();
        let node = create_node(
            &state,
            CreateNodeDto {
                kind: "category".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let meta = set_meta(
            &state,
            SetMetaDto {
                node_id: node.id.clone(),
                id: None,
                locale: None,
                key: "robots".to_string(),
                value: "noindex".to_string(),
                make_default: true,
            },
        )
        .unwrap();
        assert_eq!(meta.len(), 1);

        let view = get_view(&state, &node.id, "en").unwrap();
        assert_eq!(view.node.default_meta_id, Some(meta[0].id.clone()));
        assert_eq!(view.meta.len(), 1);
        assert!(get_translation(&state, &node.id, "en").unwrap().is_none());
    }
}
